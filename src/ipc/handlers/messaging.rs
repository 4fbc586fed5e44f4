use chrono::Local;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{as_of, opt_bool, opt_str, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Campaign, CampaignStatus, Platform, Tone};
use crate::simulate;

fn parse_tone(params: &serde_json::Value) -> Result<Tone, HandlerErr> {
    match opt_str(params, "tone") {
        None => Ok(Tone::Professional),
        Some(raw) => serde_json::from_value(json!(raw))
            .map_err(|_| HandlerErr::bad_params(format!("unknown tone: {}", raw))),
    }
}

fn parse_platform(params: &serde_json::Value) -> Result<Option<Platform>, HandlerErr> {
    match opt_str(params, "platform") {
        None => Ok(None),
        Some(raw) => serde_json::from_value(json!(raw))
            .map(Some)
            .map_err(|_| HandlerErr::bad_params(format!("unknown platform: {}", raw))),
    }
}

/// Run the enhancer, masking any failure by keeping the original text.
fn enhance_or_fallback(state: &AppState, text: &str, tone: Tone) -> (String, bool) {
    match state.enhancer.enhance(text, tone) {
        Ok(enhanced) => (enhanced, false),
        Err(e) => {
            tracing::warn!(error = %e, "enhancement failed, keeping original text");
            (text.to_string(), true)
        }
    }
}

fn handle_enhance(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let text = required_str(&req.params, "text")?;
    let tone = parse_tone(&req.params)?;
    let (enhanced, fallback) = enhance_or_fallback(state, &text, tone);
    Ok(json!({ "text": enhanced, "tone": tone, "fallback": fallback }))
}

fn handle_broadcast(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let params = &req.params;
    let original = required_str(params, "message")?;
    let tone = parse_tone(params)?;
    let today = as_of(params)?;

    let message = if opt_bool(params, "enhance").unwrap_or(false) {
        enhance_or_fallback(state, &original, tone).0
    } else {
        original
    };

    let platform = state.connected.unwrap_or(Platform::Whatsapp);
    let run = state
        .pacer
        .run(&simulate::broadcast_stages(platform), &state.cancel);
    if !run.completed {
        return Err(HandlerErr::cancelled("broadcast cancelled"));
    }

    let total = state.roster.len() as u64;
    let outcome = state.dispatch.dispatch(total);
    let status = if outcome.delivered == 0 && total > 0 {
        CampaignStatus::Failed
    } else {
        CampaignStatus::Sent
    };
    let campaign = Campaign {
        id: format!("c-{}", Uuid::new_v4().simple()),
        name: opt_str(params, "name").unwrap_or_else(|| format!("Broadcast {}", today)),
        status,
        total_messages: total,
        delivered: outcome.delivered,
        failed: outcome.failed,
        scheduled_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        template_id: platform.template_id().to_string(),
    };
    tracing::info!(
        campaign = %campaign.name,
        delivered = campaign.delivered,
        failed = campaign.failed,
        "broadcast recorded"
    );
    state.campaigns.append(campaign.clone());

    Ok(json!({
        "campaign": campaign,
        "message": message,
        "stages": run.stages,
    }))
}

fn handle_campaigns_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "campaigns": state.campaigns.newest_first() }))
}

fn handle_meta_connect(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let params = &req.params;
    let platform = parse_platform(params)?.unwrap_or(Platform::Whatsapp);
    let _token = required_str(params, "token")?;
    let _account_id = required_str(params, "id")?;

    let run = state
        .pacer
        .run(&simulate::handshake_stages(platform), &state.cancel);
    if !run.completed {
        return Err(HandlerErr::cancelled("handshake cancelled"));
    }
    state.connected = Some(platform);
    tracing::info!(?platform, "meta account linked");
    Ok(json!({
        "connected": true,
        "platform": platform,
        "stages": run.stages,
    }))
}

fn handle_meta_status(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({
        "connected": state.connected.is_some(),
        "platform": state.connected,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "messaging.enhance" => handle_enhance(state, req),
        "messaging.broadcast" => handle_broadcast(state, req),
        "campaigns.list" => handle_campaigns_list(state),
        "meta.connect" => handle_meta_connect(state, req),
        "meta.status" => handle_meta_status(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
