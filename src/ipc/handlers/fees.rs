use rust_decimal::Decimal;
use serde_json::json;

use super::student_json;
use crate::ipc::error::ok;
use crate::ipc::helpers::{
    as_of, opt_date, opt_str, opt_u64, required_decimal, required_str, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::ledger;
use crate::simulate::{self, GatewayOutcome};

const LEDGER_DEFAULT_LIMIT: usize = 50;

fn handle_summary(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!(state.roster.totals()))
}

fn handle_reconcile(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let today = as_of(&req.params)?;
    let changed = state.roster.reconcile(today);
    if changed > 0 {
        tracing::info!(changed, %today, "fee statuses reconciled");
    }
    Ok(json!({ "changed": changed, "asOf": today }))
}

fn handle_collect(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let params = &req.params;
    let student_id = required_str(params, "studentId")?;
    let amount = required_decimal(params, "amount")?;
    let method =
        opt_str(params, "method").unwrap_or_else(|| ledger::DEFAULT_PAYMENT_METHOD.to_string());
    let date = match opt_date(params, "date")? {
        Some(d) => d,
        None => as_of(params)?,
    };

    let Some(student) = state.roster.get(&student_id).cloned() else {
        return Err(HandlerErr::not_found("student not found"));
    };
    ledger::validate_payment(amount, &method)
        .map_err(|e| HandlerErr::bad_params(e.to_string()))?;

    // Simulated gateway handshake: busy until the staged run finishes, and
    // nothing is applied if the run was cancelled.
    let run = state
        .pacer
        .run(&simulate::gateway_stages(), &state.cancel);
    if !run.completed {
        return Err(HandlerErr::cancelled("payment authorization cancelled"));
    }

    match state.gateway.authorize(amount) {
        GatewayOutcome::Approved => {
            let txn_id = state.transactions.next_id();
            let receipt = ledger::apply_payment(&student, amount, &method, date, txn_id)
                .map_err(|e| HandlerErr::bad_params(e.to_string()))?;
            tracing::info!(
                student = %student.name,
                %amount,
                txn = %receipt.transaction.id,
                "payment collected"
            );
            state.roster.replace(receipt.student.clone());
            state.transactions.append(receipt.transaction.clone());

            let upi = simulate::upi_uri(&receipt.student.name, amount);
            Ok(json!({
                "student": student_json(&receipt.student),
                "transaction": receipt.transaction,
                "qr": {
                    "upiUri": upi,
                    "imageUrl": simulate::qr_image_url(&upi),
                },
                "stages": run.stages,
            }))
        }
        GatewayOutcome::Declined(reason) => {
            let txn_id = state.transactions.next_id();
            let txn = ledger::declined_payment(&student, amount, &method, date, txn_id)
                .map_err(|e| HandlerErr::bad_params(e.to_string()))?;
            tracing::warn!(student = %student.name, %amount, %reason, "payment declined");
            state.transactions.append(txn.clone());
            Ok(json!({
                "student": student_json(&student),
                "transaction": txn,
                "declineReason": reason,
                "stages": run.stages,
            }))
        }
    }
}

fn handle_payment_qr(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student_id = required_str(&req.params, "studentId")?;
    let amount = required_decimal(&req.params, "amount")?;
    if amount <= Decimal::ZERO {
        return Err(HandlerErr::bad_params("amount must be positive"));
    }
    let Some(student) = state.roster.get(&student_id) else {
        return Err(HandlerErr::not_found("student not found"));
    };
    let upi = simulate::upi_uri(&student.name, amount);
    Ok(json!({
        "payee": student.name,
        "amount": amount,
        "upiUri": upi,
        "imageUrl": simulate::qr_image_url(&upi),
    }))
}

fn handle_reminders_sync(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let _ = as_of(&req.params)?;
    let overdue = state.roster.totals().overdue_count;
    let run = state
        .pacer
        .run(&simulate::reminder_stages(), &state.cancel);
    if !run.completed {
        return Err(HandlerErr::cancelled("reminder sync cancelled"));
    }
    tracing::info!(overdue, "fee reminders synced");
    Ok(json!({ "reminded": overdue, "stages": run.stages }))
}

fn handle_ledger_list(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let limit = opt_u64(&req.params, "limit")
        .map(|v| v as usize)
        .unwrap_or(LEDGER_DEFAULT_LIMIT);
    let rows = state.transactions.newest_first(limit);
    Ok(json!({ "transactions": rows, "total": state.transactions.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "fees.summary" => handle_summary(state),
        "fees.reconcile" => handle_reconcile(state, req),
        "fees.collect" => handle_collect(state, req),
        "fees.paymentQr" => handle_payment_qr(state, req),
        "fees.remindersSync" => handle_reminders_sync(state, req),
        "ledger.list" => handle_ledger_list(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::{handle_request, AppState};
    use crate::model::{FeeStatus, TxnStatus};
    use crate::simulate::{
        AllDeliveredDispatch, InstantPacer, PaymentGateway, ToneEnhancer,
    };
    use serde_json::Value;

    fn request(state: &mut AppState, method: &str, params: Value) -> Value {
        handle_request(
            state,
            Request {
                id: "t".to_string(),
                method: method.to_string(),
                params,
            },
        )
    }

    struct DecliningGateway;

    impl PaymentGateway for DecliningGateway {
        fn authorize(&self, _amount: Decimal) -> GatewayOutcome {
            GatewayOutcome::Declined("issuer unavailable".to_string())
        }
    }

    #[test]
    fn collect_appends_one_transaction_and_updates_the_student() {
        let mut state = AppState::instant();
        let before = state.transactions.len();

        // Scenario: Ananya at 45000/90000 net, paying the exact remainder.
        let resp = request(
            &mut state,
            "fees.collect",
            json!({ "studentId": "2", "amount": 45000, "date": "2024-06-01" }),
        );
        assert_eq!(resp["ok"], true, "collect failed: {resp}");
        let result = &resp["result"];
        assert_eq!(result["student"]["feeStatus"], "Paid");
        assert_eq!(result["student"]["paidFees"].as_f64(), Some(90_000.0));
        assert_eq!(result["transaction"]["id"], "TXN-1003");
        assert_eq!(result["transaction"]["amount"].as_f64(), Some(45_000.0));
        assert_eq!(result["transaction"]["studentId"], "2");
        assert_eq!(result["transaction"]["status"], "Success");
        assert!(result["qr"]["upiUri"]
            .as_str()
            .expect("uri")
            .starts_with("upi://pay?pa="));

        assert_eq!(state.transactions.len(), before + 1);
        let stored = state.roster.get("2").expect("student");
        assert_eq!(stored.fee_status, FeeStatus::Paid);
        assert_eq!(stored.last_payment_date.map(|d| d.to_string()), Some("2024-06-01".into()));
    }

    #[test]
    fn collect_rejects_bad_amounts_without_touching_state() {
        let mut state = AppState::instant();
        for params in [
            json!({ "studentId": "2", "amount": 0 }),
            json!({ "studentId": "2", "amount": -50 }),
            json!({ "studentId": "2" }),
            json!({ "studentId": "2", "amount": "lots" }),
        ] {
            let resp = request(&mut state, "fees.collect", params);
            assert_eq!(resp["ok"], false);
            assert_eq!(resp["error"]["code"], "bad_params");
        }
        let resp = request(&mut state, "fees.collect", json!({ "studentId": "nope", "amount": 10 }));
        assert_eq!(resp["error"]["code"], "not_found");

        assert_eq!(state.transactions.len(), 2);
        assert_eq!(state.roster.get("2").expect("student").fee_status, FeeStatus::Pending);
    }

    #[test]
    fn declined_gateway_records_a_failed_transaction_only() {
        let mut state = AppState::with_strategies(
            Box::new(InstantPacer),
            Box::new(DecliningGateway),
            Box::new(AllDeliveredDispatch),
            Box::new(ToneEnhancer),
        );
        let resp = request(
            &mut state,
            "fees.collect",
            json!({ "studentId": "2", "amount": 45000, "date": "2024-06-01" }),
        );
        assert_eq!(resp["ok"], true);
        assert_eq!(resp["result"]["transaction"]["status"], "Failed");
        assert_eq!(resp["result"]["declineReason"], "issuer unavailable");
        // Student untouched, but the attempt is on the log.
        let stored = state.roster.get("2").expect("student");
        assert_eq!(stored.fee_status, FeeStatus::Pending);
        assert_eq!(stored.paid_fees, Decimal::from(45_000));
        assert_eq!(state.transactions.len(), 3);
        assert_eq!(
            state.transactions.newest_first(1)[0].status,
            TxnStatus::Failed
        );
        // Failed attempts don't count toward collected totals.
        assert_eq!(state.transactions.total_for("2"), Decimal::from(15_000));
    }

    #[test]
    fn cancelled_pacer_applies_nothing() {
        let mut state = AppState::instant();
        state.cancel.cancel();
        let resp = request(
            &mut state,
            "fees.collect",
            json!({ "studentId": "2", "amount": 100 }),
        );
        assert_eq!(resp["error"]["code"], "cancelled");
        assert_eq!(state.transactions.len(), 2);
    }

    #[test]
    fn summary_tracks_collections() {
        let mut state = AppState::instant();
        let resp = request(&mut state, "fees.summary", json!({}));
        assert_eq!(resp["result"]["totalCollected"].as_f64(), Some(245_000.0));
        assert_eq!(resp["result"]["outstanding"].as_f64(), Some(175_000.0));
        assert_eq!(resp["result"]["overdueCount"], 1);

        let _ = request(
            &mut state,
            "fees.collect",
            json!({ "studentId": "3", "amount": 100000, "date": "2024-06-01" }),
        );
        let resp = request(&mut state, "fees.summary", json!({}));
        assert_eq!(resp["result"]["totalCollected"].as_f64(), Some(345_000.0));
        assert_eq!(resp["result"]["outstanding"].as_f64(), Some(75_000.0));
        assert_eq!(resp["result"]["overdueCount"], 0);
    }

    #[test]
    fn reconcile_reports_drift() {
        let mut state = AppState::instant();
        let resp = request(&mut state, "fees.reconcile", json!({ "asOf": "2026-01-01" }));
        assert_eq!(resp["result"]["changed"], 2);
        let resp = request(&mut state, "fees.summary", json!({}));
        assert_eq!(resp["result"]["overdueCount"], 3);
    }
}
