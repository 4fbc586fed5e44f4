use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::model::FeeStatus;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "students": state.roster.len(),
            "transactions": state.transactions.len(),
            "campaigns": state.campaigns.len(),
        }),
    )
}

fn handle_stats_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let delivered = state.campaigns.total_delivered();
    let failed = state.campaigns.total_failed();
    let total = state.campaigns.total_messages();
    let delivery_rate = if total > 0 {
        100.0 * delivered as f64 / total as f64
    } else {
        0.0
    };
    ok(
        &req.id,
        json!({
            "totalStudents": state.roster.len(),
            "campaignCount": state.campaigns.len(),
            "totalSent": delivered,
            "failedMessages": failed,
            "deliveryRate": delivery_rate,
        }),
    )
}

fn handle_automation_rules(state: &mut AppState, req: &Request) -> serde_json::Value {
    let pending = state
        .roster
        .all()
        .iter()
        .filter(|s| s.fee_status != FeeStatus::Paid)
        .count();
    let scan_ready = !state.roster.all().is_empty();

    ok(
        &req.id,
        json!({
            "rules": [
                {
                    "id": 1,
                    "name": "Birthday Wishes",
                    "description": "Automatically sends personalized greetings to students on their birthdays.",
                    "active": true,
                    "stats": "Sent 12 today",
                },
                {
                    "id": 2,
                    "name": "Fee Payment Reminders",
                    "description": "Sends alerts to students with pending fees 3 days before the deadline.",
                    "active": true,
                    "stats": format!("{} pending accounts synced", pending),
                },
                {
                    "id": 3,
                    "name": "Attendance Notifications",
                    "description": "Notifies parents if a student is absent from their scheduled class.",
                    "active": true,
                    "stats": if scan_ready { "Scanning active session" } else { "Ready to scan" },
                },
                {
                    "id": 4,
                    "name": "Test Result Alerts",
                    "description": "Broadcasts individual test scores immediately after they are published.",
                    "active": true,
                    "stats": "Portal sync active",
                },
            ]
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "stats.overview" => Some(handle_stats_overview(state, req)),
        "automation.rules" => Some(handle_automation_rules(state, req)),
        _ => None,
    }
}
