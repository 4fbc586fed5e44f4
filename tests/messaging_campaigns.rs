use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_coachd");
    let mut child = Command::new(exe)
        .arg("--instant")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn coachd");
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

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn enhance_applies_the_requested_tone() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "messaging.enhance",
        json!({ "text": "  exam   tomorrow ", "tone": "Urgent" }),
    );
    assert_eq!(r["text"], "URGENT: Exam tomorrow. Please respond promptly.");
    assert_eq!(r["fallback"], false);

    // Default tone is Professional.
    let r = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "messaging.enhance",
        json!({ "text": "fees due friday" }),
    );
    assert_eq!(
        r["text"],
        "Dear Student, Fees due friday. Regards, IIB Career Institute."
    );

    let bad = request(
        &mut stdin,
        &mut reader,
        "3",
        "messaging.enhance",
        json!({ "text": "hello", "tone": "Sarcastic" }),
    );
    assert_eq!(bad["error"]["code"], "bad_params");

    let empty = request(&mut stdin, &mut reader, "4", "messaging.enhance", json!({ "text": " " }));
    assert_eq!(empty["error"]["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn broadcast_records_a_sent_campaign_for_the_whole_roster() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "messaging.broadcast",
        json!({ "name": "NEET 2024 Registration Alert", "message": "registrations close friday" }),
    );
    let campaign = &r["campaign"];
    assert_eq!(campaign["name"], "NEET 2024 Registration Alert");
    assert_eq!(campaign["status"], "Sent");
    assert_eq!(campaign["totalMessages"], 5);
    assert_eq!(campaign["delivered"], 5);
    assert_eq!(campaign["failed"], 0);
    assert_eq!(campaign["templateId"], "waba_verified_v1");

    let stages = r["stages"].as_array().expect("stages");
    assert_eq!(stages.len(), 5);
    assert_eq!(stages[0]["label"], "Authenticating Meta Handshake...");
    assert_eq!(stages[1]["label"], "Connecting to WHATSAPP Node...");
    assert_eq!(stages[4]["label"], "Transmission Successful.");
    assert_eq!(stages[4]["percent"], 100);

    // Newest first on the campaign log, ahead of the seeded campaign.
    let listing = request_ok(&mut stdin, &mut reader, "2", "campaigns.list", json!({}));
    let campaigns = listing["campaigns"].as_array().expect("campaigns");
    assert_eq!(campaigns.len(), 2);
    assert_eq!(campaigns[0]["name"], "NEET 2024 Registration Alert");
    assert_eq!(campaigns[1]["id"], "c1");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn broadcast_defaults_name_and_requires_a_message() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "messaging.broadcast",
        json!({ "message": "hello", "asOf": "2024-06-01" }),
    );
    assert_eq!(r["campaign"]["name"], "Broadcast 2024-06-01");

    let bad = request(&mut stdin, &mut reader, "2", "messaging.broadcast", json!({}));
    assert_eq!(bad["error"]["code"], "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn connecting_instagram_switches_broadcast_templates() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let status = request_ok(&mut stdin, &mut reader, "1", "meta.status", json!({}));
    assert_eq!(status["connected"], false);

    let connected = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "meta.connect",
        json!({ "platform": "instagram", "token": "EAAG-test", "id": "ig_user_42" }),
    );
    assert_eq!(connected["connected"], true);
    assert_eq!(connected["platform"], "instagram");

    let status = request_ok(&mut stdin, &mut reader, "3", "meta.status", json!({}));
    assert_eq!(status["platform"], "instagram");

    let r = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "messaging.broadcast",
        json!({ "message": "ig broadcast" }),
    );
    assert_eq!(r["campaign"]["templateId"], "ig_verified_v1");
    assert_eq!(r["stages"][1]["label"], "Connecting to INSTAGRAM Node...");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn stats_overview_aggregates_campaign_history() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    // Seeded: one campaign, 4500 messages, 4482 delivered, 18 failed.
    let stats = request_ok(&mut stdin, &mut reader, "1", "stats.overview", json!({}));
    assert_eq!(stats["totalStudents"], 5);
    assert_eq!(stats["campaignCount"], 1);
    assert_eq!(stats["totalSent"], 4482);
    assert_eq!(stats["failedMessages"], 18);
    assert_eq!(stats["deliveryRate"].as_f64(), Some(100.0 * 4482.0 / 4500.0));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "messaging.broadcast",
        json!({ "message": "hello" }),
    );
    let stats = request_ok(&mut stdin, &mut reader, "3", "stats.overview", json!({}));
    assert_eq!(stats["campaignCount"], 2);
    assert_eq!(stats["totalSent"], 4487);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn automation_rules_reflect_pending_accounts() {
    let (mut child, mut stdin, mut reader) = spawn_daemon();

    let rules = request_ok(&mut stdin, &mut reader, "1", "automation.rules", json!({}));
    let rows = rules["rules"].as_array().expect("rules");
    assert_eq!(rows.len(), 4);
    // 3 seeded accounts are not fully paid (2 Pending + 1 Overdue).
    assert_eq!(rows[1]["name"], "Fee Payment Reminders");
    assert_eq!(rows[1]["stats"], "3 pending accounts synced");
    assert_eq!(rows[2]["stats"], "Scanning active session");

    drop(stdin);
    let _ = child.wait();
}
