use serde::Deserialize;

use crate::fixtures;
use crate::model::Platform;
use crate::simulate::{
    AllDeliveredDispatch, AutoApproveGateway, BroadcastDispatch, CancelToken, Enhancer, Pacer,
    PaymentGateway, ToneEnhancer,
};
use crate::store::{AttendanceSheet, CampaignLog, Roster, TransactionLog};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon owns. Single-threaded: one request mutates this at
/// a time, so the stores need no locking.
pub struct AppState {
    pub roster: Roster,
    pub transactions: TransactionLog,
    pub campaigns: CampaignLog,
    pub attendance: AttendanceSheet,
    pub connected: Option<Platform>,
    pub pacer: Box<dyn Pacer>,
    pub gateway: Box<dyn PaymentGateway>,
    pub dispatch: Box<dyn BroadcastDispatch>,
    pub enhancer: Box<dyn Enhancer>,
    pub cancel: CancelToken,
}

impl AppState {
    pub fn with_strategies(
        pacer: Box<dyn Pacer>,
        gateway: Box<dyn PaymentGateway>,
        dispatch: Box<dyn BroadcastDispatch>,
        enhancer: Box<dyn Enhancer>,
    ) -> Self {
        let roster = Roster::new(fixtures::seed_students());
        let attendance = AttendanceSheet::for_roster(&roster);
        Self {
            roster,
            transactions: TransactionLog::new(fixtures::seed_transactions(), fixtures::NEXT_TXN_SEQ),
            campaigns: CampaignLog::new(fixtures::seed_campaigns()),
            attendance,
            connected: None,
            pacer,
            gateway,
            dispatch,
            enhancer,
            cancel: CancelToken::new(),
        }
    }

    /// Production state: timed pacing, always-approve gateway, full-delivery
    /// dispatch, local tone enhancer.
    pub fn seeded(pacer: Box<dyn Pacer>) -> Self {
        Self::with_strategies(
            pacer,
            Box::new(AutoApproveGateway),
            Box::new(AllDeliveredDispatch),
            Box::new(ToneEnhancer),
        )
    }

    /// Deterministic state for in-process tests.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self::seeded(Box::new(crate::simulate::InstantPacer))
    }
}
