use serde_json::json;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
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

fn request_ok(
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
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected ok for {}: {}",
        method,
        value
    );
    value["result"].clone()
}

fn complete_scores(value: u8) -> serde_json::Value {
    let mut scores = serde_json::Map::new();
    for q in 1..=30u32 {
        scores.insert(q.to_string(), json!(value));
    }
    serde_json::Value::Object(scores)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_http_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();
    Some((head, body))
}

/// Minimal spreadsheet-endpoint stand-in: answers `?action=getAll` with the
/// given body and records every `?action=save` POST body.
fn spawn_remote_stub(get_all_body: String) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let posts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = posts.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let Some((head, body)) = read_http_request(&mut stream) else {
                continue;
            };
            let first_line = head.lines().next().unwrap_or("");
            let response_body = if first_line.starts_with("POST") {
                recorded.lock().expect("posts lock").push(body);
                "{\"ok\":true}".to_string()
            } else {
                get_all_body.clone()
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response_body.len(),
                response_body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (format!("http://{}", addr), posts)
}

/// A listener that is bound and immediately dropped leaves a port that
/// refuses connections: the "remote is down" case.
fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{}", addr)
}

// Save A with the remote down (local_only), then the remote recovers and B
// saves with sync (synced); the local collection holds both.
#[test]
fn save_outcomes_follow_remote_availability() {
    let workspace = temp_dir("lifeskills-sync-outcomes");
    let (stub_url, posts) = spawn_remote_stub("{}".to_string());

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({
            "path": workspace.to_string_lossy(),
            "remoteUrl": unreachable_url(),
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "teacherm1a", "password": "teacherm1a" }),
    );

    let init = request_ok(&mut stdin, &mut reader, "3", "assessments.init", json!({}));
    assert_eq!(init["source"].as_str(), Some("local"));
    assert_eq!(init["offlineNotice"].as_bool(), Some(true));

    // Student A: all zeros, remote down.
    let saved_a = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "assessments.save",
        json!({
            "assessment": {
                "studentId": 1,
                "scores": complete_scores(0),
                "comments": { "strength": "", "development": "" }
            }
        }),
    );
    assert_eq!(saved_a["outcome"].as_str(), Some("local_only"));
    assert_eq!(saved_a["summary"]["total"].as_u64(), Some(0));
    assert_eq!(saved_a["summary"]["percent"].as_f64(), Some(0.0));

    // Remote recovers.
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "remote.configure",
        json!({ "remoteUrl": stub_url }),
    );

    // Student B: all threes, remote up.
    let saved_b = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "assessments.save",
        json!({
            "assessment": {
                "studentId": 2,
                "scores": complete_scores(3),
                "comments": { "strength": "Excellent", "development": "" }
            }
        }),
    );
    assert_eq!(saved_b["outcome"].as_str(), Some("synced"));
    assert_eq!(saved_b["summary"]["total"].as_u64(), Some(90));
    assert_eq!(saved_b["summary"]["percent"].as_f64(), Some(100.0));

    // Only B's save reached the endpoint, carrying the student identity.
    let recorded = posts.lock().expect("posts lock").clone();
    assert_eq!(recorded.len(), 1);
    let payload: serde_json::Value =
        serde_json::from_str(&recorded[0]).expect("parse posted payload");
    assert_eq!(payload["student"]["id"].as_i64(), Some(2));
    assert_eq!(payload["student"]["firstName"].as_str(), Some("Benjawan"));
    assert_eq!(payload["assessment"]["scores"]["15"].as_u64(), Some(3));
    assert_eq!(
        payload["assessment"]["teacherName"].as_str(),
        Some("Mrs. Siriporn Chanthra")
    );

    // Local collection is the authority and holds both records.
    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "assessments.summary",
        json!({}),
    );
    assert_eq!(summary["counts"]["assessed"].as_u64(), Some(2));

    drop(stdin);
    let _ = child.wait();
}
