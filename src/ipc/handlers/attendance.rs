use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{as_of, opt_str, required_bool, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::simulate;

fn sheet_counts(state: &AppState) -> serde_json::Value {
    json!({
        "presentCount": state.attendance.present_count(),
        "absentCount": state.attendance.absent_count(),
    })
}

fn handle_sheet(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let query = opt_str(&req.params, "query").unwrap_or_default();
    let batch = opt_str(&req.params, "batch");
    let rows: Vec<serde_json::Value> = state
        .roster
        .search(&query, batch.as_deref())
        .into_iter()
        .map(|s| {
            json!({
                "studentId": s.id,
                "name": s.name,
                "batch": s.batch,
                "course": s.course,
                "present": state.attendance.is_present(&s.id),
            })
        })
        .collect();
    Ok(json!({
        "rows": rows,
        "counts": sheet_counts(state),
    }))
}

fn handle_toggle(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = required_str(&req.params, "studentId")?;
    let Some(present) = state.attendance.toggle(&student_id) else {
        return Err(HandlerErr::not_found("student not found"));
    };
    Ok(json!({
        "studentId": student_id,
        "present": present,
        "counts": sheet_counts(state),
    }))
}

/// Bulk-set only the currently filtered students; everyone else keeps their
/// existing flag.
fn handle_mark_all(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let present = required_bool(&req.params, "present")?;
    let query = opt_str(&req.params, "query").unwrap_or_default();
    let batch = opt_str(&req.params, "batch");
    let ids: Vec<String> = state
        .roster
        .search(&query, batch.as_deref())
        .into_iter()
        .map(|s| s.id.clone())
        .collect();
    for id in &ids {
        state.attendance.set(id, present);
    }
    Ok(json!({
        "updated": ids.len(),
        "present": present,
        "counts": sheet_counts(state),
    }))
}

fn handle_sync(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let _ = as_of(&req.params)?;
    let absentees = state.attendance.absent_count();
    let run = state
        .pacer
        .run(&simulate::attendance_sync_stages(), &state.cancel);
    if !run.completed {
        return Err(HandlerErr::cancelled("attendance sync cancelled"));
    }
    tracing::info!(absentees, "absentee notifications synced");
    Ok(json!({ "notified": absentees, "stages": run.stages }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.sheet" => handle_sheet(state, req),
        "attendance.toggle" => handle_toggle(state, req),
        "attendance.markAll" => handle_mark_all(state, req),
        "attendance.sync" => handle_sync(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
