//! Custom matcher and limiter expressions.
//!
//! Expressions are Rhai expressions (no statements) that must evaluate to a
//! boolean. Request matchers see a `request` map with `method`, `path`,
//! `query`, `params`, `headers`, `form` and `body`; limiters see `runs`.

use crate::recording::RecordedRequest;
use rhai::{Dynamic, Engine, Map, Scope, AST};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Upper bound on operations per evaluation.
const MAX_OPERATIONS: u64 = 50_000;

static ENGINE: OnceLock<Engine> = OnceLock::new();

fn engine() -> &'static Engine {
    ENGINE.get_or_init(|| {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        engine.set_max_expr_depths(64, 32);
        engine
    })
}

/// A compiled boolean expression.
#[derive(Clone)]
pub struct Expression {
    source: String,
    ast: Arc<AST>,
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .finish()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Expression {
    pub fn compile(source: &str) -> Result<Self, String> {
        if source.trim().is_empty() {
            return Err("expression must not be empty".to_string());
        }
        let ast = engine()
            .compile_expression(source)
            .map_err(|e| format!("failed to compile expression: {e}"))?;
        Ok(Self {
            source: source.to_string(),
            ast: Arc::new(ast),
        })
    }

    /// Evaluate against a request. Runtime errors and non-boolean results count as a miss.
    pub fn eval_request(&self, request: &RecordedRequest) -> bool {
        let mut scope = Scope::new();
        scope.push("request", request_map(request));
        self.eval_bool(&mut scope)
    }

    /// Evaluate against an expectation's run count.
    pub fn eval_runs(&self, runs: u64) -> bool {
        let mut scope = Scope::new();
        scope.push("runs", i64::try_from(runs).unwrap_or(i64::MAX));
        self.eval_bool(&mut scope)
    }

    fn eval_bool(&self, scope: &mut Scope<'_>) -> bool {
        match engine().eval_ast_with_scope::<Dynamic>(scope, self.ast.as_ref()) {
            Ok(result) => match result.as_bool() {
                Ok(b) => b,
                Err(type_name) => {
                    warn!(
                        expression = %self.source,
                        "Expression returned {} instead of bool",
                        type_name
                    );
                    false
                }
            },
            Err(e) => {
                warn!(expression = %self.source, "Expression evaluation failed: {}", e);
                false
            }
        }
    }
}

fn string_map(values: &BTreeMap<String, String>) -> Map {
    values
        .iter()
        .map(|(k, v)| (k.as_str().into(), Dynamic::from(v.clone())))
        .collect()
}

fn request_map(request: &RecordedRequest) -> Map {
    let mut map = Map::new();
    map.insert("method".into(), Dynamic::from(request.method.clone()));
    map.insert("path".into(), Dynamic::from(request.path.clone()));
    map.insert("query".into(), Dynamic::from(request.query.clone()));
    map.insert(
        "params".into(),
        Dynamic::from(string_map(&request.query_params)),
    );
    map.insert("headers".into(), Dynamic::from(string_map(&request.headers)));
    map.insert("form".into(), Dynamic::from(string_map(&request.form)));
    map.insert("body".into(), Dynamic::from(request.body.to_text()));
    map
}
