//! Owned in-memory collections behind small transition functions. The IPC
//! handlers are callers; none of the collections are reachable any other way.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger;
use crate::model::{Campaign, FeeStatus, Student, Transaction, TxnStatus};

/// Roster of enrolled students. New enrollments are inserted at the front;
/// students are never deleted.
pub struct Roster {
    students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTotals {
    pub total_receivable: Decimal,
    pub total_collected: Decimal,
    pub total_scholarship: Decimal,
    pub outstanding: Decimal,
    pub overdue_count: usize,
}

impl Roster {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn all(&self) -> &[Student] {
        &self.students
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn insert_front(&mut self, student: Student) {
        self.students.insert(0, student);
    }

    /// Replace the student with the same id. Returns false if unknown.
    pub fn replace(&mut self, student: Student) -> bool {
        match self.students.iter_mut().find(|s| s.id == student.id) {
            Some(slot) => {
                *slot = student;
                true
            }
            None => false,
        }
    }

    /// Case-insensitive substring match of `query` over name/phone/course,
    /// optionally narrowed to one batch ("All" means no batch filter).
    /// The result preserves roster order.
    pub fn search(&self, query: &str, batch: Option<&str>) -> Vec<&Student> {
        let needle = query.trim().to_lowercase();
        let batch = batch.filter(|b| *b != "All");
        self.students
            .iter()
            .filter(|s| {
                let matches_query = needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.phone.to_lowercase().contains(&needle)
                    || s.course.to_lowercase().contains(&needle);
                let matches_batch = batch.map_or(true, |b| s.batch == b);
                matches_query && matches_batch
            })
            .collect()
    }

    /// Distinct non-empty batches in first-seen order, "All" prepended.
    pub fn batches(&self) -> Vec<String> {
        let mut out = vec!["All".to_string()];
        for s in &self.students {
            if !s.batch.is_empty() && !out[1..].iter().any(|b| b == &s.batch) {
                out.push(s.batch.clone());
            }
        }
        out
    }

    /// Aggregates over the current snapshot. Always recomputed, never cached.
    pub fn totals(&self) -> FeeTotals {
        let total_receivable: Decimal = self.students.iter().map(|s| s.total_fees).sum();
        let total_collected: Decimal = self.students.iter().map(|s| s.paid_fees).sum();
        let total_scholarship: Decimal = self.students.iter().map(|s| s.scholarship).sum();
        FeeTotals {
            total_receivable,
            total_collected,
            total_scholarship,
            outstanding: total_receivable - total_collected - total_scholarship,
            overdue_count: self
                .students
                .iter()
                .filter(|s| s.fee_status == FeeStatus::Overdue)
                .count(),
        }
    }

    /// Recompute every cached `fee_status` from the derivation rule as of
    /// the given date. Returns how many rows changed.
    pub fn reconcile(&mut self, today: NaiveDate) -> usize {
        let mut changed = 0;
        for s in &mut self.students {
            let derived = ledger::derive_fee_status(
                s.total_fees,
                s.scholarship,
                s.paid_fees,
                s.fee_due_date,
                today,
            );
            if derived != s.fee_status {
                s.fee_status = derived;
                changed += 1;
            }
        }
        changed
    }
}

/// Append-only payment log. Insertion order is the only meaningful order;
/// listing reverses it for newest-first display.
pub struct TransactionLog {
    entries: Vec<Transaction>,
    next_seq: u32,
}

impl TransactionLog {
    pub fn new(entries: Vec<Transaction>, next_seq: u32) -> Self {
        Self { entries, next_seq }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Fresh receipt number in the TXN-<digits> format.
    pub fn next_id(&mut self) -> String {
        let id = format!("TXN-{}", self.next_seq);
        self.next_seq += 1;
        id
    }

    pub fn append(&mut self, txn: Transaction) {
        self.entries.push(txn);
    }

    pub fn newest_first(&self, limit: usize) -> Vec<&Transaction> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Sum of successful payment amounts for one student.
    pub fn total_for(&self, student_id: &str) -> Decimal {
        self.entries
            .iter()
            .filter(|t| t.student_id == student_id && t.status == TxnStatus::Success)
            .map(|t| t.amount)
            .sum()
    }
}

/// Broadcast history, newest first on listing.
pub struct CampaignLog {
    entries: Vec<Campaign>,
}

impl CampaignLog {
    pub fn new(entries: Vec<Campaign>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn append(&mut self, campaign: Campaign) {
        self.entries.push(campaign);
    }

    pub fn newest_first(&self) -> Vec<&Campaign> {
        self.entries.iter().rev().collect()
    }

    pub fn total_delivered(&self) -> u64 {
        self.entries.iter().map(|c| c.delivered).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.entries.iter().map(|c| c.failed).sum()
    }

    pub fn total_messages(&self) -> u64 {
        self.entries.iter().map(|c| c.total_messages).sum()
    }
}

/// Per-session present/absent flags. Every known student id has exactly one
/// entry; everyone starts present.
pub struct AttendanceSheet {
    present: HashMap<String, bool>,
}

impl AttendanceSheet {
    pub fn for_roster(roster: &Roster) -> Self {
        Self {
            present: roster.all().iter().map(|s| (s.id.clone(), true)).collect(),
        }
    }

    /// New enrollments default to present, like the session start state.
    pub fn enroll(&mut self, student_id: &str) {
        self.present.entry(student_id.to_string()).or_insert(true);
    }

    pub fn is_present(&self, student_id: &str) -> bool {
        self.present.get(student_id).copied().unwrap_or(true)
    }

    /// Flip one entry. Returns the new flag, or None for an unknown id.
    pub fn toggle(&mut self, student_id: &str) -> Option<bool> {
        self.present.get_mut(student_id).map(|p| {
            *p = !*p;
            *p
        })
    }

    pub fn set(&mut self, student_id: &str, present: bool) -> bool {
        match self.present.get_mut(student_id) {
            Some(p) => {
                *p = present;
                true
            }
            None => false,
        }
    }

    pub fn present_count(&self) -> usize {
        self.present.values().filter(|p| **p).count()
    }

    pub fn absent_count(&self) -> usize {
        self.present.values().filter(|p| !**p).count()
    }
}
