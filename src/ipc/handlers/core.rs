use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::remote::RemoteStore;
use crate::repo::Repository;
use crate::store::SnapshotStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "remote.configure" => Some(handle_remote_configure(state, req)),
        _ => None,
    }
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "remoteConfigured": state.repo.as_ref().map(|r| r.remote_configured()).unwrap_or(false),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let remote = match req.params.get("remoteUrl").and_then(|v| v.as_str()) {
        Some(url) if !url.trim().is_empty() => Some(RemoteStore::new(url.trim())),
        _ => RemoteStore::from_env(),
    };
    let remote_configured = remote.is_some();

    match SnapshotStore::open(&path) {
        Ok(store) => {
            info!(workspace = %path.display(), remote_configured, "workspace opened");
            state.repo = Some(Repository::open(store, remote));
            state.workspace = Some(path.clone());
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "remoteConfigured": remote_configured,
                }),
            )
        }
        Err(e) => err(&req.id, "store_open_failed", format!("{e:?}"), None),
    }
}

/// Point the session at a different endpoint (or clear it with an empty
/// url). The in-memory collection and session are untouched.
fn handle_remote_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let remote = match req.params.get("remoteUrl").and_then(|v| v.as_str()) {
        Some(url) if !url.trim().is_empty() => Some(RemoteStore::new(url.trim())),
        _ => None,
    };
    let remote_configured = remote.is_some();
    repo.set_remote(remote);
    ok(&req.id, json!({ "remoteConfigured": remote_configured }))
}
