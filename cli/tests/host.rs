use calcpanel_cli::host::{run, Host};
use calcpanel_core::api::{MemoryStore, PanelConfig, RecoveryConfig, RecoveryStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn host(answer: Option<&str>) -> (Host, Arc<RecoveryStore>) {
    let recovery = Arc::new(RecoveryStore::new(
        Arc::new(MemoryStore::new()),
        &RecoveryConfig::default(),
    ));
    let host = Host::new(
        PanelConfig::default(),
        recovery.clone(),
        answer.map(str::to_string),
    );
    (host, recovery)
}

async fn drive(host: &mut Host, script: &str) -> Vec<Value> {
    let mut out = Vec::new();
    run(host, script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn replies(lines: &[Value]) -> Vec<&Value> {
    lines.iter().filter(|l| l["type"] != "event").collect()
}

fn events(lines: &[Value]) -> Vec<&str> {
    lines
        .iter()
        .filter(|l| l["type"] == "event")
        .filter_map(|l| l["event"].as_str())
        .collect()
}

#[tokio::test]
async fn test_close_with_unsaved_work_records_entry() {
    let (mut host, recovery) = host(Some("Later"));
    let script = r#"
# one calculator, edited and closed
{"op":"open","variant":"offline","name":"a"}
{"op":"edit","handle":"a","content":{"expr":"1+1"}}
{"op":"close","handle":"a"}
{"op":"list"}
"#;
    let lines = drive(&mut host, script).await;

    let replies = replies(&lines);
    assert_eq!(replies.len(), 4);
    assert_eq!(replies[0]["result"]["title"], "Calculator");
    assert_eq!(replies[1]["result"]["state"], "dirty");
    assert!(replies[2]["result"]["recorded"].is_object());
    assert_eq!(replies[2]["result"]["reopened"], Value::Null);
    assert_eq!(replies[3]["result"]["entries"][0]["variant"], "offline");

    assert!(events(&lines).contains(&"snapshot_recorded"));
    let stored = recovery.list_entries(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content.as_value(), &json!({"expr": "1+1"}));
}

#[tokio::test]
async fn test_reopen_answer_recovers_immediately() {
    let (mut host, recovery) = host(None);
    let script = r#"
{"op":"open","variant":"online","name":"a"}
{"op":"edit","handle":"a","content":{"expr":"x^2"}}
{"op":"close","handle":"a","answer":"Reopen"}
{"op":"status"}
"#;
    let lines = drive(&mut host, script).await;
    let replies = replies(&lines);

    assert!(replies[2]["result"]["reopened"].is_string());
    let sessions = replies[3]["result"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["state"], "clean");
    assert!(events(&lines).contains(&"entry_recovered"));
    // The recovered session was clean when the host shut down.
    assert!(recovery.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_shutdown_records_dirty_sessions() {
    let (mut host, recovery) = host(None);
    let script = r#"
{"op":"open","variant":"offline","name":"a"}
{"op":"open","variant":"offline","name":"b"}
{"op":"edit","handle":"b","content":{"n":2}}
"#;
    let lines = drive(&mut host, script).await;

    let closed = events(&lines)
        .into_iter()
        .filter(|e| *e == "session_closed")
        .count();
    assert_eq!(closed, 2);
    assert_eq!(recovery.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_bad_lines_report_errors_and_continue() {
    let (mut host, _recovery) = host(None);
    let script = r#"
not json
{"op":"focus","handle":"missing"}
{"op":"open","variant":"nope"}
{"op":"status"}
"#;
    let lines = drive(&mut host, script).await;
    let replies = replies(&lines);

    assert_eq!(replies[0]["type"], "error");
    assert_eq!(replies[0]["op"], "parse");
    assert_eq!(replies[1]["type"], "error");
    assert_eq!(replies[1]["op"], "focus");
    assert_eq!(replies[2]["type"], "error");
    assert_eq!(replies[3]["type"], "reply");
    assert_eq!(replies[3]["result"]["active"], Value::Null);
}

#[tokio::test]
async fn test_export_without_active_session() {
    let (mut host, _recovery) = host(None);
    let lines = drive(&mut host, "{\"op\":\"export\",\"path\":\"/tmp/unused.json\"}\n").await;
    let replies = replies(&lines);
    assert_eq!(replies[0]["result"]["outcome"], "no_active_session");
}

#[tokio::test]
async fn test_import_marks_session_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("work.json");
    std::fs::write(&path, r#"{"expr":"2*3"}"#).unwrap();

    let (mut host, recovery) = host(None);
    let script = format!(
        "{}\n{}\n{}\n",
        r#"{"op":"open","variant":"offline","name":"a"}"#,
        json!({"op": "import", "path": path}),
        r#"{"op":"status"}"#,
    );
    let lines = drive(&mut host, &script).await;
    let replies = replies(&lines);

    assert_eq!(replies[1]["result"]["outcome"], "completed");
    assert_eq!(replies[2]["result"]["sessions"][0]["state"], "clean");
    assert!(events(&lines).contains(&"imported"));
    assert!(recovery.is_empty().await.unwrap());
}
