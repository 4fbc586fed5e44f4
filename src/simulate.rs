//! Simulated collaborators: the staged-delay pacer, the payment gateway,
//! the broadcast dispatcher and the message enhancer. Everything here is a
//! pluggable strategy so the handlers stay deterministic under test and a
//! failure outcome can be injected at each boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{Platform, Tone};

/// Cooperative cancellation hook for simulated I/O. The daemon itself never
/// triggers it; it exists so callers embedding the core can abort a staged
/// run between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub percent: u8,
    pub label: String,
}

fn stage(percent: u8, label: impl Into<String>) -> Stage {
    Stage {
        percent,
        label: label.into(),
    }
}

/// Outcome of one staged run. `completed` is false only when the token was
/// cancelled mid-flight; the effect of the operation must then not apply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedRun {
    pub completed: bool,
    pub stages: Vec<Stage>,
}

/// Paces a staged simulation: enter busy, walk the stages with a delay
/// between them, report what was reached.
pub trait Pacer: Send {
    fn run(&self, stages: &[Stage], cancel: &CancelToken) -> StagedRun;
}

/// Production pacer: a fixed sleep per stage, like the timed callbacks the
/// interactive console staged its "sync" and "send" operations with.
pub struct TimedPacer {
    pub step: Duration,
}

impl Pacer for TimedPacer {
    fn run(&self, stages: &[Stage], cancel: &CancelToken) -> StagedRun {
        let mut reached = Vec::with_capacity(stages.len());
        for s in stages {
            if cancel.is_cancelled() {
                tracing::warn!(at = s.percent, "staged run cancelled");
                return StagedRun {
                    completed: false,
                    stages: reached,
                };
            }
            std::thread::sleep(self.step);
            tracing::debug!(percent = s.percent, label = %s.label, "stage");
            reached.push(s.clone());
        }
        StagedRun {
            completed: true,
            stages: reached,
        }
    }
}

/// Test pacer: no delays, same staging semantics.
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn run(&self, stages: &[Stage], cancel: &CancelToken) -> StagedRun {
        if cancel.is_cancelled() {
            return StagedRun {
                completed: false,
                stages: Vec::new(),
            };
        }
        StagedRun {
            completed: true,
            stages: stages.to_vec(),
        }
    }
}

pub fn broadcast_stages(platform: Platform) -> Vec<Stage> {
    vec![
        stage(20, "Authenticating Meta Handshake..."),
        stage(40, format!("Connecting to {} Node...", platform.node_label())),
        stage(60, "Optimizing media packets..."),
        stage(80, "Broadcasting to student network..."),
        stage(100, "Transmission Successful."),
    ]
}

pub fn handshake_stages(platform: Platform) -> Vec<Stage> {
    vec![
        stage(50, format!("Verifying {} access token...", platform.node_label())),
        stage(100, "Handshake complete."),
    ]
}

pub fn gateway_stages() -> Vec<Stage> {
    vec![
        stage(50, "Contacting payment gateway..."),
        stage(100, "Authorization complete."),
    ]
}

pub fn reminder_stages() -> Vec<Stage> {
    vec![
        stage(50, "Preparing fee reminders..."),
        stage(100, "Reminders synced."),
    ]
}

pub fn attendance_sync_stages() -> Vec<Stage> {
    vec![
        stage(50, "Scanning absentees..."),
        stage(100, "Parent notifications queued."),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Approved,
    Declined(String),
}

pub trait PaymentGateway: Send {
    fn authorize(&self, amount: Decimal) -> GatewayOutcome;
}

/// The prototype never models gateway failure: every authorization succeeds
/// after the handshake delay.
pub struct AutoApproveGateway;

impl PaymentGateway for AutoApproveGateway {
    fn authorize(&self, _amount: Decimal) -> GatewayOutcome {
        GatewayOutcome::Approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub delivered: u64,
    pub failed: u64,
}

pub trait BroadcastDispatch: Send {
    fn dispatch(&self, recipients: u64) -> DispatchOutcome;
}

/// Default dispatcher: everything delivered, nothing failed.
pub struct AllDeliveredDispatch;

impl BroadcastDispatch for AllDeliveredDispatch {
    fn dispatch(&self, recipients: u64) -> DispatchOutcome {
        DispatchOutcome {
            delivered: recipients,
            failed: 0,
        }
    }
}

/// Opaque text-transform collaborator. May fail; callers must fall back to
/// the original text and never surface the failure.
pub trait Enhancer: Send {
    fn enhance(&self, text: &str, tone: Tone) -> anyhow::Result<String>;
}

/// Deterministic local rewriter standing in for the hosted model: collapses
/// whitespace, capitalizes, punctuates and applies a tone decoration.
pub struct ToneEnhancer;

impl Enhancer for ToneEnhancer {
    fn enhance(&self, text: &str, tone: Tone) -> anyhow::Result<String> {
        let mut body = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if body.is_empty() {
            anyhow::bail!("nothing to enhance");
        }
        let mut chars = body.chars();
        if let Some(first) = chars.next() {
            body = first.to_uppercase().collect::<String>() + chars.as_str();
        }
        if !body.ends_with(['.', '!', '?']) {
            body.push('.');
        }
        Ok(match tone {
            Tone::Professional => format!("Dear Student, {body} Regards, IIB Career Institute."),
            Tone::Friendly => format!("Hi! {body} \u{1F60A}"),
            Tone::Motivational => {
                format!("{body} Keep pushing, your hard work will pay off! \u{1F4AA}")
            }
            Tone::Urgent => format!("URGENT: {body} Please respond promptly."),
        })
    }
}

pub const INSTITUTE_VPA: &str = "iibcareerinstitute@upi";

/// Standard UPI URI: upi://pay?pa=address&pn=name&am=amount&cu=INR
pub fn upi_uri(payee: &str, amount: Decimal) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR",
        INSTITUTE_VPA,
        percent_encode(payee),
        amount
    )
}

/// Wraps the URI in the hosted QR renderer the console displays.
pub fn qr_image_url(upi: &str) -> String {
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data={}&bgcolor=f8fafc&color=0f172a&margin=20",
        percent_encode(upi)
    )
}

/// RFC 3986 unreserved characters pass through; everything else is escaped.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_pacer_walks_all_stages() {
        let run = InstantPacer.run(&broadcast_stages(Platform::Whatsapp), &CancelToken::new());
        assert!(run.completed);
        assert_eq!(run.stages.len(), 5);
        assert_eq!(run.stages[0].percent, 20);
        assert_eq!(run.stages[1].label, "Connecting to WHATSAPP Node...");
        assert_eq!(run.stages[4].label, "Transmission Successful.");
    }

    #[test]
    fn cancelled_token_stops_the_run() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let timed = TimedPacer {
            step: Duration::from_millis(1),
        };
        let run = timed.run(&gateway_stages(), &cancel);
        assert!(!run.completed);
        assert!(run.stages.is_empty());

        let run = InstantPacer.run(&gateway_stages(), &cancel);
        assert!(!run.completed);
    }

    #[test]
    fn instagram_broadcast_names_the_right_node() {
        let stages = broadcast_stages(Platform::Instagram);
        assert_eq!(stages[1].label, "Connecting to INSTAGRAM Node...");
    }

    #[test]
    fn tone_enhancer_is_deterministic_per_tone() {
        let e = ToneEnhancer;
        assert_eq!(
            e.enhance("  exam   tomorrow ", Tone::Urgent).expect("enhance"),
            "URGENT: Exam tomorrow. Please respond promptly."
        );
        assert_eq!(
            e.enhance("fees due friday", Tone::Professional).expect("enhance"),
            "Dear Student, Fees due friday. Regards, IIB Career Institute."
        );
        assert!(e
            .enhance("you can do it!", Tone::Motivational)
            .expect("enhance")
            .starts_with("You can do it!"));
        assert!(e.enhance("   ", Tone::Friendly).is_err());
    }

    #[test]
    fn upi_uri_encodes_payee_and_keeps_amount_plain() {
        let uri = upi_uri("Ananya Deshmukh", Decimal::from(45_000));
        assert_eq!(
            uri,
            "upi://pay?pa=iibcareerinstitute@upi&pn=Ananya%20Deshmukh&am=45000&cu=INR"
        );
        let img = qr_image_url(&uri);
        assert!(img.starts_with("https://api.qrserver.com/v1/create-qr-code/"));
        assert!(img.contains("upi%3A%2F%2Fpay"));
    }

    #[test]
    fn default_gateway_and_dispatch_always_succeed() {
        assert_eq!(
            AutoApproveGateway.authorize(Decimal::from(1)),
            GatewayOutcome::Approved
        );
        let out = AllDeliveredDispatch.dispatch(42);
        assert_eq!(out.delivered, 42);
        assert_eq!(out.failed, 0);
    }
}
