// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the public and admin surfaces.
//!
//! The confirm handler is the latency-sensitive one: it awaits only
//! the status transition and spawns every side effect detached before
//! redirecting into the marketing site.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use livery_core::types::{CustomFilter, Segment};
use livery_core::{ids, CampaignStatus, LiveryError};
use livery_storage::queries::campaigns;
use livery_workflow::{campaigns as campaign_flow, confirm, intake, segments, subscribe};

use crate::server::AppState;

fn internal_error(context: &str, e: &LiveryError) -> Response {
    error!(context, error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal_error" })),
    )
        .into_response()
}

/// GET /health
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Public lead intake, POST /v1/quotes.
pub async fn post_quote(
    State(state): State<AppState>,
    Json(form): Json<intake::LeadForm>,
) -> Response {
    match intake::submit_lead(&state.db, &state.notifier, &state.confirm_base, form).await {
        Ok(quote) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": quote.id,
                "short_ref": ids::short_ref(&quote.id),
                "status": quote.status,
            })),
        )
            .into_response(),
        Err(intake::SubmissionError::Validation(fields)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "validation_failed",
                "fields": fields,
            })),
        )
            .into_response(),
        Err(intake::SubmissionError::Persistence(e)) => internal_error("submit_lead", &e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    token: Option<String>,
}

fn confirm_redirect(state: &AppState, query: &str) -> Redirect {
    let base = state.site.base_url.trim_end_matches('/');
    let path = &state.site.confirm_path;
    Redirect::to(&format!("{base}{path}?{query}"))
}

/// The tokenized confirmation link, GET /confirm?token=...
///
/// Always answers with a redirect into the marketing site; the
/// redirect is issued as soon as the status transition commits, with
/// notifications and the return-trip split spawned detached.
pub async fn get_confirm(
    State(state): State<AppState>,
    Query(params): Query<ConfirmParams>,
) -> Redirect {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return confirm_redirect(&state, "error=missing_token");
    };

    match confirm::confirm_transition(&state.db, &token).await {
        Ok(confirm::ConfirmOutcome::Confirmed(quote)) => {
            let db = state.db.clone();
            let notifier = state.notifier.clone();
            tokio::spawn(async move {
                confirm::post_confirmation(&db, &notifier, &quote).await;
            });
            confirm_redirect(&state, &format!("success=true&token={token}"))
        }
        Ok(confirm::ConfirmOutcome::AlreadyConfirmed) => {
            confirm_redirect(&state, "already_confirmed=true")
        }
        Ok(confirm::ConfirmOutcome::InvalidToken) => {
            confirm_redirect(&state, "error=invalid_token")
        }
        Ok(confirm::ConfirmOutcome::UpdateFailed) => {
            confirm_redirect(&state, "error=update_failed")
        }
        Err(e) => {
            error!(error = %e, "confirmation lookup failed");
            confirm_redirect(&state, "error=server_error")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    source: Option<String>,
}

/// Handle POST /v1/subscriptions: public subscribe.
pub async fn post_subscription(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Response {
    match subscribe::subscribe(
        &state.db,
        &state.notifier,
        &body.email,
        body.source.as_deref(),
    )
    .await
    {
        Ok(outcome) => {
            let (status, label) = match &outcome {
                subscribe::SubscribeOutcome::Created(_) => (StatusCode::CREATED, "subscribed"),
                subscribe::SubscribeOutcome::Reactivated(_) => (StatusCode::OK, "reactivated"),
                subscribe::SubscribeOutcome::AlreadyActive(_) => {
                    (StatusCode::OK, "already_subscribed")
                }
            };
            let sub = outcome.subscription();
            (
                status,
                Json(serde_json::json!({
                    "email": sub.email,
                    "discount_code": sub.discount_code,
                    "state": label,
                })),
            )
                .into_response()
        }
        Err(LiveryError::Conflict(message)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "validation_failed", "message": message })),
        )
            .into_response(),
        Err(e) => internal_error("subscribe", &e),
    }
}

/// Handle DELETE /v1/subscriptions/{email}: public unsubscribe.
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Response {
    match subscribe::unsubscribe(&state.db, &email).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "email": email.to_lowercase(), "active": false })),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not_subscribed" })),
        )
            .into_response(),
        Err(LiveryError::Conflict(message)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "validation_failed", "message": message })),
        )
            .into_response(),
        Err(e) => internal_error("unsubscribe", &e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SegmentQuery {
    #[serde(default)]
    count_only: bool,
    min_price: Option<f64>,
    max_price: Option<f64>,
    created_after: Option<String>,
    created_before: Option<String>,
}

impl SegmentQuery {
    fn custom_filter(&self) -> Option<CustomFilter> {
        let filter = CustomFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            created_after: self.created_after.clone(),
            created_before: self.created_before.clone(),
        };
        (!filter.is_empty()).then_some(filter)
    }
}

/// Resolve a named segment for admins (GET /v1/segments/{segment}).
pub async fn get_segment(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<SegmentQuery>,
) -> Response {
    let Ok(segment) = Segment::from_str(&segment) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unknown_segment" })),
        )
            .into_response();
    };

    let custom = query.custom_filter();
    match segments::resolve_segment(&state.db, segment, custom.as_ref(), query.count_only).await {
        Ok(resolution) => {
            let mut body = serde_json::json!({
                "segment": segment,
                "count": resolution.count,
            });
            if !query.count_only {
                body["contacts"] = serde_json::json!(resolution.contacts);
            }
            Json(body).into_response()
        }
        Err(e) => internal_error("resolve_segment", &e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AudienceBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
    segment_id: String,
    #[serde(default)]
    custom_filter: Option<CustomFilter>,
}

/// Create a saved audience (POST /v1/audiences).
pub async fn post_audience(
    State(state): State<AppState>,
    Json(body): Json<AudienceBody>,
) -> Response {
    let Ok(segment) = Segment::from_str(&body.segment_id) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "unknown_segment" })),
        )
            .into_response();
    };
    if body.name.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "name_required" })),
        )
            .into_response();
    }

    match livery_workflow::audiences::create_audience(
        &state.db,
        body.name.trim(),
        body.description.as_deref(),
        segment,
        body.custom_filter,
    )
    .await
    {
        Ok(audience) => (StatusCode::CREATED, Json(audience)).into_response(),
        Err(e) => internal_error("create_audience", &e),
    }
}

/// List saved audiences.
pub async fn get_audiences(State(state): State<AppState>) -> Response {
    match livery_workflow::audiences::list_audiences(&state.db).await {
        Ok(audiences) => Json(audiences).into_response(),
        Err(e) => internal_error("list_audiences", &e),
    }
}

/// Fetch one audience, refreshing its contact count on the way out.
pub async fn get_audience(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match livery_workflow::audiences::get_audience_refreshed(&state.db, &id).await {
        Ok(Some(audience)) => Json(audience).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "audience_not_found" })),
        )
            .into_response(),
        Err(e) => internal_error("get_audience", &e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CampaignBody {
    #[serde(default)]
    audience_id: Option<String>,
    subject: String,
    html_content: String,
}

/// Create a campaign via POST /v1/campaigns. New campaigns always
/// start as drafts.
pub async fn post_campaign(
    State(state): State<AppState>,
    Json(body): Json<CampaignBody>,
) -> Response {
    if body.subject.trim().is_empty() || body.html_content.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "subject_and_content_required" })),
        )
            .into_response();
    }
    match campaign_flow::create_campaign(
        &state.db,
        body.audience_id.as_deref(),
        body.subject.trim(),
        &body.html_content,
    )
    .await
    {
        Ok(campaign) => (StatusCode::CREATED, Json(campaign)).into_response(),
        Err(e) => internal_error("create_campaign", &e),
    }
}

/// List campaigns.
pub async fn get_campaigns(State(state): State<AppState>) -> Response {
    match campaigns::list(&state.db).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => internal_error("list_campaigns", &e),
    }
}

/// Fetch one campaign by id.
pub async fn get_campaign(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match campaigns::get(&state.db, &id).await {
        Ok(Some(campaign)) => Json(campaign).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "campaign_not_found" })),
        )
            .into_response(),
        Err(e) => internal_error("get_campaign", &e),
    }
}

/// Kick off a campaign send (POST /v1/campaigns/{id}/send).
///
/// The draft check answers the caller; the batch run itself is spawned
/// detached (a concurrent claim race is resolved inside the run by the
/// conditional draft→sending transition).
pub async fn post_campaign_send(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let campaign = match campaigns::get(&state.db, &id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "campaign_not_found" })),
            )
                .into_response();
        }
        Err(e) => return internal_error("get_campaign", &e),
    };
    if campaign.status != CampaignStatus::Draft {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": "conflict",
                "message": format!("campaign is {}, only a draft can be sent", campaign.status),
            })),
        )
            .into_response();
    }

    let db = state.db.clone();
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        if let Err(e) = campaign_flow::send_campaign(&db, &notifier, &id).await {
            error!(campaign_id = %id, error = %e, "campaign send run failed");
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "sending" })),
    )
        .into_response()
}
