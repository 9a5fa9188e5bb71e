use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use serde_json::json;
use tracing::info;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.current" => Some(handle_current(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        "roster.list" => Some(handle_roster_list(state, req)),
        "rubric.get" => Some(handle_rubric_get(req)),
        _ => None,
    }
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let username = match req.params.get("username").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing username", None),
    };
    let password = match req.params.get("password").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing password", None),
    };

    let Some(teacher) = roster::authenticate(&username, &password) else {
        return err(
            &req.id,
            "invalid_credentials",
            "username or password incorrect",
            None,
        );
    };

    if let Err(e) = repo.login(teacher.clone()) {
        return err(&req.id, "local_write_failed", e.to_string(), None);
    }
    info!(username = %teacher.username, room = %teacher.room, "teacher logged in");
    ok(&req.id, json!({ "teacher": teacher }))
}

fn handle_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(&req.id, json!({ "teacher": repo.session() }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = repo.logout() {
        return err(&req.id, "local_write_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "loggedOut": true }))
}

fn handle_roster_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Explicit room wins; otherwise the session teacher's room.
    let room = match req.params.get("room").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => {
            let session_room = state
                .repo
                .as_ref()
                .and_then(|r| r.session())
                .map(|t| t.room.clone());
            match session_room {
                Some(v) => v,
                None => {
                    return err(
                        &req.id,
                        "no_session",
                        "log in or pass params.room",
                        None,
                    )
                }
            }
        }
    };
    ok(
        &req.id,
        json!({
            "room": room,
            "students": roster::students_in_room(&room),
        }),
    )
}

fn handle_rubric_get(req: &Request) -> serde_json::Value {
    let indicators = roster::indicators();
    let question_count = roster::question_ids().len();
    ok(
        &req.id,
        json!({
            "indicators": indicators,
            "questionCount": question_count,
        }),
    )
}
