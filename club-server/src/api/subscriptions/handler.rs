//! Subscription API Handlers

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    http::StatusCode,
};
use shared::models::{
    AssessmentCreate, BulkStatusResult, BulkStatusUpdate, DuesAssessment, MemberSubscription,
    Payment, PaymentCreate, PaymentQuery, PlanCreate, SubscriptionPlan, SubscriptionQuery,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{json_body, query_params};

// ── Plans ───────────────────────────────────────────────────────────

pub async fn list_plans(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<SubscriptionPlan>>> {
    Ok(Json(state.subscriptions.list_plans().await?))
}

pub async fn create_plan(
    State(state): State<ServerState>,
    payload: Result<Json<PlanCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SubscriptionPlan>)> {
    let plan = state.subscriptions.create_plan(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

// ── Assessments ─────────────────────────────────────────────────────

pub async fn list_assessments(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<DuesAssessment>>> {
    Ok(Json(state.subscriptions.list_assessments().await?))
}

/// POST /assessments - 记录创建者并立即物化
pub async fn create_assessment(
    State(state): State<ServerState>,
    current: CurrentUser,
    payload: Result<Json<AssessmentCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DuesAssessment>)> {
    let assessment = state
        .subscriptions
        .create_assessment(json_body(payload)?, &current.username)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

// ── Member subscriptions ────────────────────────────────────────────

/// GET /member-subscriptions?status=&period=&level=&memberId=
pub async fn list_subscriptions(
    State(state): State<ServerState>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> AppResult<Json<Vec<MemberSubscription>>> {
    let filter = query_params(query)?;
    Ok(Json(state.subscriptions.list_subscriptions(&filter).await?))
}

/// PATCH /member-subscriptions `{ids, status}`
pub async fn bulk_set_status(
    State(state): State<ServerState>,
    payload: Result<Json<BulkStatusUpdate>, JsonRejection>,
) -> AppResult<Json<BulkStatusResult>> {
    let result = state
        .subscriptions
        .bulk_set_status(json_body(payload)?)
        .await?;
    Ok(Json(result))
}

// ── Payments ────────────────────────────────────────────────────────

/// GET /payments?memberId=&planId=&from=&to=
pub async fn list_payments(
    State(state): State<ServerState>,
    query: Result<Query<PaymentQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Payment>>> {
    let filter = query_params(query)?;
    Ok(Json(state.subscriptions.list_payments(&filter).await?))
}

pub async fn record_payment(
    State(state): State<ServerState>,
    payload: Result<Json<PaymentCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = state.subscriptions.record_payment(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
