//! Pure fee ledger rules: status derivation and payment application.
//!
//! Nothing here touches the clock or any shared state; every function takes
//! the effective date explicitly so callers (and tests) control time.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{FeeStatus, Student, Transaction, TxnStatus};

pub const DEFAULT_PAYMENT_METHOD: &str = "UPI / QR Code";

/// Amount actually owed. May go negative when scholarship exceeds total
/// fees; not clamped, callers treat a negative value as nothing owed.
pub fn net_payable(total_fees: Decimal, scholarship: Decimal) -> Decimal {
    total_fees - scholarship
}

/// Remaining balance. Negative means overpaid.
pub fn balance(total_fees: Decimal, scholarship: Decimal, paid_fees: Decimal) -> Decimal {
    net_payable(total_fees, scholarship) - paid_fees
}

/// Authoritative fee status. First matching rule wins:
/// 1. total > 0 and paid covers net payable -> Paid (inclusive compare)
/// 2. past the due date -> Overdue
/// 3. otherwise -> Pending
pub fn derive_fee_status(
    total_fees: Decimal,
    scholarship: Decimal,
    paid_fees: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> FeeStatus {
    if total_fees > Decimal::ZERO && paid_fees >= net_payable(total_fees, scholarship) {
        FeeStatus::Paid
    } else if today > due_date {
        FeeStatus::Overdue
    } else {
        FeeStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment amount must be positive")]
    NonPositiveAmount,
    #[error("payment method must not be empty")]
    EmptyMethod,
}

pub fn validate_payment(amount: Decimal, method: &str) -> Result<(), PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }
    if method.trim().is_empty() {
        return Err(PaymentError::EmptyMethod);
    }
    Ok(())
}

/// Result of a successful payment application: the student value after the
/// payment and the transaction to append to the log.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub student: Student,
    pub transaction: Transaction,
}

/// Apply one approved payment. The input student is not mutated; the
/// returned student carries the increased `paid_fees`, the recomputed
/// status (as of the payment date) and the new `last_payment_date`.
pub fn apply_payment(
    student: &Student,
    amount: Decimal,
    method: &str,
    date: NaiveDate,
    txn_id: String,
) -> Result<Receipt, PaymentError> {
    validate_payment(amount, method)?;

    let paid_fees = student.paid_fees + amount;
    let fee_status = derive_fee_status(
        student.total_fees,
        student.scholarship,
        paid_fees,
        student.fee_due_date,
        date,
    );

    let mut updated = student.clone();
    updated.paid_fees = paid_fees;
    updated.fee_status = fee_status;
    updated.last_payment_date = Some(date);

    let transaction = Transaction {
        id: txn_id,
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        amount,
        method: method.trim().to_string(),
        date,
        status: TxnStatus::Success,
    };

    Ok(Receipt {
        student: updated,
        transaction,
    })
}

/// Record a gateway-declined attempt. The student is left untouched; only a
/// Failed transaction is produced for the log.
pub fn declined_payment(
    student: &Student,
    amount: Decimal,
    method: &str,
    date: NaiveDate,
    txn_id: String,
) -> Result<Transaction, PaymentError> {
    validate_payment(amount, method)?;
    Ok(Transaction {
        id: txn_id,
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        amount,
        method: method.trim().to_string(),
        date,
        status: TxnStatus::Failed,
    })
}
