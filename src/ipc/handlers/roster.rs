use serde_json::json;
use uuid::Uuid;

use super::student_json;
use crate::ipc::error::ok;
use crate::ipc::helpers::{amount_or_zero, as_of, opt_date, opt_str, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::ledger;
use crate::model::Student;

fn handle_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let query = opt_str(&req.params, "query").unwrap_or_default();
    let batch = opt_str(&req.params, "batch");
    let rows: Vec<serde_json::Value> = state
        .roster
        .search(&query, batch.as_deref())
        .into_iter()
        .map(student_json)
        .collect();
    Ok(json!({ "students": rows, "count": rows.len() }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let params = &req.params;
    let name = required_str(params, "name")?;
    let phone = required_str(params, "phone")?;
    let course = opt_str(params, "course").unwrap_or_else(|| "NEET 2024".to_string());
    let batch = opt_str(params, "batch").unwrap_or_default();
    let location = opt_str(params, "location").unwrap_or_default();

    let tags: Vec<String> = match params.get("tags") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(serde_json::Value::Null) | None => vec!["New Admission".to_string()],
        Some(_) => return Err(HandlerErr::bad_params("tags must be an array of strings")),
    };

    let total_fees = amount_or_zero(params, "totalFees")?;
    let paid_fees = amount_or_zero(params, "paidFees")?;
    let scholarship = amount_or_zero(params, "scholarship")?;

    let today = as_of(params)?;
    let fee_due_date = opt_date(params, "feeDueDate")?.unwrap_or(today);
    let fee_status =
        ledger::derive_fee_status(total_fees, scholarship, paid_fees, fee_due_date, today);

    let student = Student {
        id: Uuid::new_v4().to_string(),
        name,
        phone,
        course,
        batch,
        location,
        tags,
        total_fees,
        paid_fees,
        scholarship,
        fee_due_date,
        last_payment_date: None,
        fee_status,
    };

    state.attendance.enroll(&student.id);
    let row = student_json(&student);
    state.roster.insert_front(student);
    Ok(json!({ "student": row }))
}

fn handle_batches(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "batches": state.roster.batches() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "roster.list" => handle_list(state, req),
        "roster.create" => handle_create(state, req),
        "roster.batches" => handle_batches(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
