use serde_json::Value;

use crate::error::GradebookError;
use crate::grade;

use super::error::{err, gradebook_err};
use super::types::{AppState, Request};
use crate::manager::RecordManager;

pub fn required_str(req: &Request, key: &str) -> Result<String, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

/// Scores arrive as JSON numbers or as the raw text of a form field.
pub fn required_score(req: &Request, key: &str) -> Result<f64, Value> {
    let parsed = match req.params.get(key) {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => grade::check_score(v),
            None => Err(GradebookError::InvalidScore("score must be a number".into())),
        },
        Some(Value::String(s)) => grade::parse_score(s),
        _ => return Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    };
    parsed.map_err(|e| gradebook_err(&req.id, &e))
}

/// Record methods need a logged-in teacher and an open workspace.
pub fn require_manager<'a>(state: &'a AppState, req: &Request) -> Result<&'a RecordManager, Value> {
    if !state.session.is_authenticated() {
        return Err(err(&req.id, "unauthenticated", "log in first", None));
    }
    state
        .manager
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}
