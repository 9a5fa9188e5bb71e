use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_lifeskillsd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn lifeskillsd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn complete_scores(value: u8) -> serde_json::Value {
    let mut scores = serde_json::Map::new();
    for q in 1..=30u32 {
        scores.insert(q.to_string(), json!(value));
    }
    serde_json::Value::Object(scores)
}

#[test]
fn bundle_carries_session_and_collection_to_a_new_workspace() {
    let source_ws = temp_dir("lifeskills-backup-src");
    let target_ws = temp_dir("lifeskills-backup-dst");
    let bundle = source_ws.join("class.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": source_ws.to_string_lossy() }),
    );
    request(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "teacherm2a", "password": "teacherm2a" }),
    );
    let saved = request(
        &mut stdin,
        &mut reader,
        "3",
        "assessments.save",
        json!({
            "assessment": {
                "studentId": 9,
                "scores": complete_scores(2),
                "comments": { "strength": "Curious", "development": "" }
            }
        }),
    );
    assert_eq!(saved.get("ok").and_then(|v| v.as_bool()), Some(true));

    let exported = request(
        &mut stdin,
        &mut reader,
        "4",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        exported["result"]["bundleFormat"].as_str(),
        Some("lifeskills-workspace-v1")
    );
    assert!(bundle.is_file());

    let imported = request(
        &mut stdin,
        &mut reader,
        "5",
        "backup.import",
        json!({
            "inPath": bundle.to_string_lossy(),
            "workspacePath": target_ws.to_string_lossy(),
        }),
    );
    assert_eq!(imported.get("ok").and_then(|v| v.as_bool()), Some(true));

    // The daemon now runs over the restored workspace: session and
    // collection come from the bundle.
    let current = request(&mut stdin, &mut reader, "6", "session.current", json!({}));
    assert_eq!(
        current["result"]["teacher"]["username"].as_str(),
        Some("teacherm2a")
    );

    let init = request(&mut stdin, &mut reader, "7", "assessments.init", json!({}));
    assert_eq!(init["result"]["source"].as_str(), Some("local"));
    assert_eq!(
        init["result"]["assessments"]["9"]["scores"]["24"].as_u64(),
        Some(2)
    );

    let summary = request(
        &mut stdin,
        &mut reader,
        "8",
        "assessments.summary",
        json!({}),
    );
    assert_eq!(summary["result"]["counts"]["assessed"].as_u64(), Some(1));
    assert_eq!(summary["result"]["room"].as_str(), Some("m2a"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn import_rejects_foreign_bundles() {
    let workspace = temp_dir("lifeskills-backup-reject");
    let not_a_bundle = workspace.join("random.zip");
    std::fs::write(&not_a_bundle, b"not a zip archive").expect("write file");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "backup.import",
        json!({ "inPath": not_a_bundle.to_string_lossy() }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(resp["error"]["code"].as_str(), Some("io_failed"));

    drop(stdin);
    let _ = child.wait();
}
