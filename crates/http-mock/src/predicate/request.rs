//! Request matchers: the tagged predicate kinds evaluated against a recorded request.

use super::script::Expression;
use super::string_matcher::{StringMatch, StringOperator};
use crate::error::ValidationError;
use crate::recording::RecordedRequest;
use serde::{Deserialize, Serialize};

/// Wire form of a matcher: `{"kind": "...", ...parameters}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatcherSpec {
    pub kind: String,

    /// Field name for `header`, `query` and `form` matchers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Rhai expression for `custom` matchers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    #[serde(flatten)]
    pub operator: StringOperator,
}

impl MatcherSpec {
    pub fn new(kind: &str, operator: StringOperator) -> Self {
        Self {
            kind: kind.to_string(),
            operator,
            ..Default::default()
        }
    }

    pub fn named(kind: &str, name: &str, operator: StringOperator) -> Self {
        Self {
            kind: kind.to_string(),
            name: Some(name.to_string()),
            operator,
            ..Default::default()
        }
    }

    pub fn custom(expression: &str) -> Self {
        Self {
            kind: "custom".to_string(),
            expression: Some(expression.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
enum MatcherKind {
    Method(StringMatch),
    Path(StringMatch),
    /// Header name is stored lowercase
    Header(String, StringMatch),
    Query(String, StringMatch),
    Form(String, StringMatch),
    Body(StringMatch),
    Custom(Expression),
}

/// A validated, compiled matcher. Serializes back to its [`MatcherSpec`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "MatcherSpec", into = "MatcherSpec")]
pub struct Matcher {
    spec: MatcherSpec,
    kind: MatcherKind,
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Matcher {
    pub fn compile(spec: MatcherSpec) -> Result<Self, ValidationError> {
        match spec.kind.as_str() {
            "method" | "path" | "body" => reject_unused(&spec, false, true)?,
            "header" | "query" | "form" => reject_unused(&spec, true, true)?,
            "custom" => reject_unused(&spec, false, false)?,
            _ => {}
        }

        let kind = match spec.kind.as_str() {
            // Methods compare case-insensitively unless told otherwise
            "method" => MatcherKind::Method(StringMatch::compile(&spec.operator, false)?),
            "path" => MatcherKind::Path(StringMatch::compile(&spec.operator, true)?),
            "body" => MatcherKind::Body(StringMatch::compile(&spec.operator, true)?),
            "header" => MatcherKind::Header(
                required_name(&spec)?.to_ascii_lowercase(),
                StringMatch::compile(&spec.operator, true)?,
            ),
            "query" => MatcherKind::Query(
                required_name(&spec)?.to_string(),
                StringMatch::compile(&spec.operator, true)?,
            ),
            "form" => MatcherKind::Form(
                required_name(&spec)?.to_string(),
                StringMatch::compile(&spec.operator, true)?,
            ),
            "custom" => {
                let source = spec
                    .expression
                    .as_deref()
                    .ok_or_else(|| ValidationError::new("expression", "required for custom matcher"))?;
                MatcherKind::Custom(
                    Expression::compile(source).map_err(|e| ValidationError::new("expression", e))?,
                )
            }
            "" => return Err(ValidationError::new("kind", "missing matcher kind")),
            other => {
                return Err(ValidationError::new(
                    "kind",
                    format!(
                        "unknown matcher kind \"{other}\" (expected method, path, header, query, form, body or custom)"
                    ),
                ))
            }
        };
        Ok(Self { spec, kind })
    }

    pub fn spec(&self) -> &MatcherSpec {
        &self.spec
    }

    /// Evaluate against a request. Pure: same request, same answer.
    pub fn evaluate(&self, request: &RecordedRequest) -> bool {
        match &self.kind {
            MatcherKind::Method(m) => m.matches(Some(&request.method)),
            MatcherKind::Path(m) => m.matches(Some(&request.path)),
            MatcherKind::Header(name, m) => {
                m.matches(request.headers.get(name).map(String::as_str))
            }
            MatcherKind::Query(name, m) => {
                m.matches(request.query_params.get(name).map(String::as_str))
            }
            MatcherKind::Form(name, m) => m.matches(request.form.get(name).map(String::as_str)),
            MatcherKind::Body(m) => m.matches(Some(&request.body.to_text())),
            MatcherKind::Custom(expr) => expr.eval_request(request),
        }
    }
}

fn required_name(spec: &MatcherSpec) -> Result<&str, ValidationError> {
    match spec.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ValidationError::new(
            "name",
            format!("required for {} matcher", spec.kind),
        )),
    }
}

/// Parameters the kind does not read are errors, not silently ignored.
fn reject_unused(
    spec: &MatcherSpec,
    takes_name: bool,
    takes_operator: bool,
) -> Result<(), ValidationError> {
    let not_allowed = |field: &str| {
        Err(ValidationError::new(
            field,
            format!("not allowed for {} matcher", spec.kind),
        ))
    };

    if !takes_name && spec.name.is_some() {
        return not_allowed("name");
    }
    if takes_operator && spec.expression.is_some() {
        return not_allowed("expression");
    }
    if !takes_operator {
        if let Some(&key) = spec.operator.present_keys().first() {
            return not_allowed(key);
        }
        if spec.operator.case_sensitive.is_some() {
            return not_allowed("caseSensitive");
        }
    }
    Ok(())
}

impl TryFrom<MatcherSpec> for Matcher {
    type Error = ValidationError;

    fn try_from(spec: MatcherSpec) -> Result<Self, Self::Error> {
        Matcher::compile(spec)
    }
}

impl From<Matcher> for MatcherSpec {
    fn from(matcher: Matcher) -> Self {
        matcher.spec
    }
}
