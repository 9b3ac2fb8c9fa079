//! Limiters: predicates over an expectation's run count.

use super::script::Expression;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Wire form of a limiter: `{"kind": "maxRuns", "value": 3}` or
/// `{"kind": "custom", "expression": "runs < 2"}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimiterSpec {
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl LimiterSpec {
    pub fn max_runs(value: u64) -> Self {
        Self {
            kind: "maxRuns".to_string(),
            value: Some(value),
            expression: None,
        }
    }
}

#[derive(Debug, Clone)]
enum LimiterKind {
    /// Accepts while `runs < n`
    MaxRuns(u64),
    Custom(Expression),
}

/// A validated limiter. Serializes back to its [`LimiterSpec`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "LimiterSpec", into = "LimiterSpec")]
pub struct Limiter {
    spec: LimiterSpec,
    kind: LimiterKind,
}

impl PartialEq for Limiter {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Limiter {
    pub fn compile(spec: LimiterSpec) -> Result<Self, ValidationError> {
        match spec.kind.as_str() {
            "maxRuns" if spec.expression.is_some() => {
                return Err(ValidationError::new("expression", "not allowed for maxRuns limiter"))
            }
            "custom" if spec.value.is_some() => {
                return Err(ValidationError::new("value", "not allowed for custom limiter"))
            }
            _ => {}
        }

        let kind = match spec.kind.as_str() {
            "maxRuns" => LimiterKind::MaxRuns(
                spec.value
                    .ok_or_else(|| ValidationError::new("value", "required for maxRuns limiter"))?,
            ),
            "custom" => {
                let source = spec.expression.as_deref().ok_or_else(|| {
                    ValidationError::new("expression", "required for custom limiter")
                })?;
                LimiterKind::Custom(
                    Expression::compile(source).map_err(|e| ValidationError::new("expression", e))?,
                )
            }
            "" => return Err(ValidationError::new("kind", "missing limiter kind")),
            other => {
                return Err(ValidationError::new(
                    "kind",
                    format!("unknown limiter kind \"{other}\" (expected maxRuns or custom)"),
                ))
            }
        };
        Ok(Self { spec, kind })
    }

    pub fn spec(&self) -> &LimiterSpec {
        &self.spec
    }

    /// Whether an expectation that has already applied `runs` times may apply again.
    pub fn allows(&self, runs: u64) -> bool {
        match &self.kind {
            LimiterKind::MaxRuns(max) => runs < *max,
            LimiterKind::Custom(expr) => expr.eval_runs(runs),
        }
    }
}

impl TryFrom<LimiterSpec> for Limiter {
    type Error = ValidationError;

    fn try_from(spec: LimiterSpec) -> Result<Self, Self::Error> {
        Limiter::compile(spec)
    }
}

impl From<Limiter> for LimiterSpec {
    fn from(limiter: Limiter) -> Self {
        limiter.spec
    }
}
