use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{gradebook_err, ok};
use crate::ipc::helpers::{require_manager, required_score, required_str};
use crate::ipc::types::{AppState, Request};
use crate::manager::RecordManager;
use crate::store::StudentRecord;

fn listing(
    state: &AppState,
    req: &Request,
    list: fn(&RecordManager) -> Result<Vec<StudentRecord>>,
) -> serde_json::Value {
    let manager = match require_manager(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    match list(manager) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn create_params(req: &Request) -> std::result::Result<(String, String, String, f64), serde_json::Value> {
    Ok((
        required_str(req, "identifier")?,
        required_str(req, "lastNames")?,
        required_str(req, "firstName")?,
        required_score(req, "score")?,
    ))
}

fn handle_create(state: &AppState, req: &Request) -> serde_json::Value {
    let manager = match require_manager(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let (identifier, last_names, first_name, score) = match create_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match manager.add_student(&identifier, &last_names, &first_name, score) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn handle_delete(state: &AppState, req: &Request) -> serde_json::Value {
    let manager = match require_manager(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let identifier = match required_str(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match manager.remove_student(&identifier) {
        Ok(removed) => ok(&req.id, json!({ "removed": removed })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn handle_score(state: &AppState, req: &Request) -> serde_json::Value {
    let manager = match require_manager(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let identifier = match required_str(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match manager.get_score(&identifier) {
        Ok((score, category)) => ok(&req.id, json!({ "score": score, "category": category })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

fn handle_update_score(state: &AppState, req: &Request) -> serde_json::Value {
    let manager = match require_manager(state, req) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let identifier = match required_str(req, "identifier") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let score = match required_score(req, "score") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match manager.update_score(&identifier, score) {
        Ok((score, category)) => ok(&req.id, json!({ "score": score, "category": category })),
        Err(e) => gradebook_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(listing(state, req, RecordManager::list_students)),
        "students.create" => Some(handle_create(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        "students.score" => Some(handle_score(state, req)),
        "students.updateScore" => Some(handle_update_score(state, req)),
        "students.failing" => Some(listing(state, req, RecordManager::list_failing)),
        "students.passing" => Some(listing(state, req, RecordManager::list_passing)),
        "students.honors" => Some(listing(state, req, RecordManager::list_honors_candidates)),
        _ => None,
    }
}
