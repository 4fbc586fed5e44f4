use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnStatus {
    Success,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Professional,
    Friendly,
    Motivational,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Whatsapp,
    Instagram,
}

impl Platform {
    /// Label interpolated into the broadcast progress stages.
    pub fn node_label(&self) -> &'static str {
        match self {
            Platform::Whatsapp => "WHATSAPP",
            Platform::Instagram => "INSTAGRAM",
        }
    }

    pub fn template_id(&self) -> &'static str {
        match self {
            Platform::Whatsapp => "waba_verified_v1",
            Platform::Instagram => "ig_verified_v1",
        }
    }
}

/// One enrolled learner. `fee_status` is a cache of
/// `ledger::derive_fee_status` and is recomputed on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub course: String,
    pub batch: String,
    pub location: String,
    pub tags: Vec<String>,
    pub total_fees: Decimal,
    pub paid_fees: Decimal,
    pub scholarship: Decimal,
    pub fee_due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
    pub fee_status: FeeStatus,
}

/// Immutable record of one payment event. The log owning these is
/// append-only; entries are never edited after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub amount: Decimal,
    pub method: String,
    pub date: NaiveDate,
    pub status: TxnStatus,
}

/// Summary of one broadcast attempt. Invariant: delivered + failed <= total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub total_messages: u64,
    pub delivered: u64,
    pub failed: u64,
    pub scheduled_at: String,
    pub template_id: String,
}
