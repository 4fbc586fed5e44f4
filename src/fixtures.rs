//! Seed data for a fresh session. The daemon keeps everything in memory, so
//! each start begins from this roster, ledger and campaign history.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{Campaign, CampaignStatus, FeeStatus, Student, Transaction, TxnStatus};

/// Transaction receipt numbers continue after the seeded TXN-1001/TXN-1002.
pub const NEXT_TXN_SEQ: u32 = 1003;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

fn rupees(v: i64) -> Decimal {
    Decimal::from(v)
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    phone: &str,
    course: &str,
    batch: &str,
    location: &str,
    tags: &[&str],
    total_fees: i64,
    paid_fees: i64,
    scholarship: i64,
    fee_due_date: NaiveDate,
    last_payment_date: NaiveDate,
    fee_status: FeeStatus,
) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        course: course.to_string(),
        batch: batch.to_string(),
        location: location.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        total_fees: rupees(total_fees),
        paid_fees: rupees(paid_fees),
        scholarship: rupees(scholarship),
        fee_due_date,
        last_payment_date: Some(last_payment_date),
        fee_status,
    }
}

pub fn seed_students() -> Vec<Student> {
    vec![
        student(
            "1",
            "Rahul Sharma",
            "+91 9876543210",
            "NEET 2024",
            "Alpha",
            "Latur",
            &["Paid", "Scholarship"],
            85_000,
            85_000,
            10_000,
            date(2023, 12, 1),
            date(2023, 11, 15),
            FeeStatus::Paid,
        ),
        student(
            "2",
            "Ananya Deshmukh",
            "+91 9876543211",
            "JEE Mains",
            "Delta",
            "Nanded",
            &["Top-Batch"],
            95_000,
            45_000,
            5_000,
            date(2025, 3, 15),
            date(2024, 1, 10),
            FeeStatus::Pending,
        ),
        student(
            "3",
            "Siddharth Patil",
            "+91 9876543212",
            "NEET 2025",
            "Omega",
            "Pune",
            &["New Admission"],
            120_000,
            20_000,
            0,
            date(2024, 2, 28),
            date(2023, 12, 5),
            FeeStatus::Overdue,
        ),
        student(
            "4",
            "Priya Kulkarni",
            "+91 7276926165",
            "MHT-CET",
            "Beta",
            "Latur",
            &["Verification Target"],
            65_000,
            65_000,
            0,
            date(2023, 11, 10),
            date(2023, 10, 30),
            FeeStatus::Paid,
        ),
        student(
            "5",
            "Amit Varma",
            "+91 8888899999",
            "NEET 2024",
            "Alpha",
            "Chhatrapati Sambhajinagar",
            &["Hostel"],
            85_000,
            30_000,
            15_000,
            date(2025, 3, 10),
            date(2024, 2, 15),
            FeeStatus::Pending,
        ),
    ]
}

pub fn seed_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            id: "TXN-1001".to_string(),
            student_id: "1".to_string(),
            student_name: "Rahul Sharma".to_string(),
            amount: rupees(25_000),
            method: "UPI".to_string(),
            date: date(2023, 11, 15),
            status: TxnStatus::Success,
        },
        Transaction {
            id: "TXN-1002".to_string(),
            student_id: "2".to_string(),
            student_name: "Ananya Deshmukh".to_string(),
            amount: rupees(15_000),
            method: "Cash".to_string(),
            date: date(2024, 1, 10),
            status: TxnStatus::Success,
        },
    ]
}

pub fn seed_campaigns() -> Vec<Campaign> {
    vec![Campaign {
        id: "c1".to_string(),
        name: "NEET 2024 Exam Prep Tips".to_string(),
        status: CampaignStatus::Sent,
        total_messages: 4_500,
        delivered: 4_482,
        failed: 18,
        scheduled_at: "2023-11-20 10:00 AM".to_string(),
        template_id: "t1".to_string(),
    }]
}
