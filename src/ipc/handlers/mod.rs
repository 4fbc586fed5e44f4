pub mod attendance;
pub mod core;
pub mod fees;
pub mod messaging;
pub mod roster;

use crate::ledger;
use crate::model::Student;
use serde_json::json;

/// Wire shape for one student row, with the derived money fields the
/// console shows next to the status chip.
pub fn student_json(s: &Student) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "phone": s.phone,
        "course": s.course,
        "batch": s.batch,
        "location": s.location,
        "tags": s.tags,
        "totalFees": s.total_fees,
        "paidFees": s.paid_fees,
        "scholarship": s.scholarship,
        "feeDueDate": s.fee_due_date,
        "lastPaymentDate": s.last_payment_date,
        "feeStatus": s.fee_status,
        "netPayable": ledger::net_payable(s.total_fees, s.scholarship),
        "balance": ledger::balance(s.total_fees, s.scholarship, s.paid_fees),
    })
}
