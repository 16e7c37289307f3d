//! 会费引擎
//!
//! 方案 (plan) → 摊派 (assessment) → 会员应缴 (member subscription) → 缴费 (payment)。
//!
//! # 物化
//!
//! 摊派创建后立即物化：每个目标会员一条 PENDING 记录，
//! id 为 `ms-{assessmentId}-{memberId}`，已存在则跳过，所以重复物化是幂等的。
//!
//! # 缴费匹配
//!
//! 调用方可指定 `subscriptionId` 精确结清；否则取同会员同方案最新的 PENDING 记录。
//! 缴费写入与结清是两次独立写入，没有事务。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use shared::models::{
    AssessmentCreate, BulkStatusResult, BulkStatusUpdate, DEFAULT_CURRENCY, DuesAssessment,
    Member, MemberSubscription, Payment, PaymentCreate, PaymentQuery, PlanCreate,
    SubscriptionPlan, SubscriptionQuery, SubscriptionStatus, TargetType,
};
use shared::models::BillingCycle;
use shared::util::{non_blank, now_millis, prefixed_id};

use crate::db::{MemberFilter, RepoError, Repository, Stores};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, missing_fields, parse_date_or_timestamp,
    validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct SubscriptionEngine {
    members: Arc<dyn Repository<Member>>,
    plans: Arc<dyn Repository<SubscriptionPlan>>,
    assessments: Arc<dyn Repository<DuesAssessment>>,
    subscriptions: Arc<dyn Repository<MemberSubscription>>,
    payments: Arc<dyn Repository<Payment>>,
}

impl SubscriptionEngine {
    pub fn new(stores: &Stores) -> Self {
        Self {
            members: stores.members.clone(),
            plans: stores.plans.clone(),
            assessments: stores.assessments.clone(),
            subscriptions: stores.subscriptions.clone(),
            payments: stores.payments.clone(),
        }
    }

    // ── Plans ───────────────────────────────────────────────────────

    pub async fn list_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self.plans.find_many(&()).await?)
    }

    pub async fn create_plan(&self, input: PlanCreate) -> AppResult<SubscriptionPlan> {
        let id = prefixed_id("pln");
        let amount = input.amount.unwrap_or(0.0);
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "amount must be a non-negative number",
            )
            .with_detail("field", "amount"));
        }

        let plan = SubscriptionPlan {
            name: non_blank(input.name.as_deref()).unwrap_or_else(|| "Unnamed".to_string()),
            code: non_blank(input.code.as_deref()).unwrap_or_else(|| id.to_uppercase()),
            amount,
            currency: non_blank(input.currency.as_deref())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            billing_cycle: input.billing_cycle.unwrap_or(BillingCycle::OneTime),
            active: input.active.unwrap_or(true),
            created_at: now_millis(),
            id,
        };
        validate_optional_text(&Some(plan.name.clone()), "name", MAX_NAME_LEN)?;
        validate_optional_text(&Some(plan.code.clone()), "code", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&Some(plan.currency.clone()), "currency", MAX_SHORT_TEXT_LEN)?;

        let plan = self.plans.insert(plan).await?;
        tracing::info!(plan_id = %plan.id, code = %plan.code, "Subscription plan created");
        Ok(plan)
    }

    // ── Assessments ─────────────────────────────────────────────────

    pub async fn list_assessments(&self) -> AppResult<Vec<DuesAssessment>> {
        Ok(self.assessments.find_many(&()).await?)
    }

    /// Store an assessment and materialize its obligations
    pub async fn create_assessment(
        &self,
        input: AssessmentCreate,
        created_by: &str,
    ) -> AppResult<DuesAssessment> {
        let plan_id = non_blank(input.plan_id.as_deref());
        let period = non_blank(input.period.as_deref());

        let mut missing = Vec::new();
        if plan_id.is_none() {
            missing.push("planId");
        }
        if period.is_none() {
            missing.push("period");
        }
        if input.target_type.is_none() {
            missing.push("targetType");
        }
        let (Some(plan_id), Some(period), Some(target_type)) =
            (plan_id, period, input.target_type)
        else {
            return Err(missing_fields(ErrorCode::RequiredField, &missing));
        };
        validate_optional_text(&Some(period.clone()), "period", MAX_SHORT_TEXT_LEN)?;

        let plan = self.plans.find_by_id(&plan_id).await?.ok_or_else(|| {
            AppError::invalid_request(format!("Plan {} does not exist", plan_id))
                .with_detail("planId", plan_id.as_str())
        })?;

        let (target_level, member_ids) = match target_type {
            TargetType::Level => {
                let level = input.target_level.ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::AssessmentTargetInvalid,
                        "targetLevel is required when targetType is LEVEL",
                    )
                })?;
                (Some(level), Vec::new())
            }
            TargetType::Explicit => {
                let mut seen = HashSet::new();
                let ids: Vec<String> = input
                    .member_ids
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|id| non_blank(Some(id.as_str())))
                    .filter(|id| seen.insert(id.clone()))
                    .collect();
                if ids.is_empty() {
                    return Err(AppError::with_message(
                        ErrorCode::AssessmentTargetInvalid,
                        "memberIds must not be empty when targetType is EXPLICIT",
                    ));
                }
                (None, ids)
            }
        };

        let assessment = DuesAssessment {
            id: prefixed_id("asm"),
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            period,
            target_type,
            target_level,
            member_ids,
            created_by: created_by.to_string(),
            created_at: now_millis(),
            materialized: 0,
        };
        let mut assessment = self.assessments.insert(assessment).await?;

        assessment.materialized = self.materialize_assessment(&assessment).await?;
        let assessment = self.assessments.update(assessment).await?;

        tracing::info!(
            assessment_id = %assessment.id,
            plan_id = %assessment.plan_id,
            period = %assessment.period,
            materialized = assessment.materialized,
            created_by = %created_by,
            "Assessment created"
        );
        Ok(assessment)
    }

    /// Create one PENDING obligation per target member, returning how many
    /// were created. Pairs that already have an obligation are skipped; an
    /// unknown plan makes this a no-op.
    pub async fn materialize_assessment(&self, assessment: &DuesAssessment) -> AppResult<u32> {
        let Some(plan) = self.plans.find_by_id(&assessment.plan_id).await? else {
            tracing::warn!(
                assessment_id = %assessment.id,
                plan_id = %assessment.plan_id,
                "Assessment references an unknown plan, nothing materialized"
            );
            return Ok(0);
        };

        let targets = self.resolve_targets(assessment).await?;
        let mut created = 0;
        for member in targets {
            let id = MemberSubscription::derive_id(&assessment.id, &member.id);
            if self.subscriptions.find_by_id(&id).await?.is_some() {
                continue;
            }

            let obligation = MemberSubscription {
                id,
                member_name: member.full_name(),
                member_id: member.id,
                level: member.level,
                plan_id: plan.id.clone(),
                plan_name: plan.name.clone(),
                amount: plan.amount,
                currency: plan.currency.clone(),
                period: assessment.period.clone(),
                status: SubscriptionStatus::Pending,
                assessment_id: assessment.id.clone(),
                payment_id: None,
                created_at: now_millis(),
            };
            match self.subscriptions.insert(obligation).await {
                Ok(_) => created += 1,
                // created concurrently for the same pair
                Err(RepoError::Duplicate(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(created)
    }

    async fn resolve_targets(&self, assessment: &DuesAssessment) -> AppResult<Vec<Member>> {
        match assessment.target_type {
            TargetType::Level => {
                let Some(level) = assessment.target_level else {
                    return Ok(Vec::new());
                };
                let filter = MemberFilter {
                    level: Some(level),
                    ..Default::default()
                };
                Ok(self.members.find_many(&filter).await?)
            }
            TargetType::Explicit => {
                let mut found = Vec::with_capacity(assessment.member_ids.len());
                for id in &assessment.member_ids {
                    match self.members.find_by_id(id).await? {
                        Some(member) => found.push(member),
                        None => tracing::debug!(member_id = %id, "Skipping unknown member"),
                    }
                }
                Ok(found)
            }
        }
    }

    // ── Member subscriptions ────────────────────────────────────────

    pub async fn list_subscriptions(
        &self,
        filter: &SubscriptionQuery,
    ) -> AppResult<Vec<MemberSubscription>> {
        Ok(self.subscriptions.find_many(filter).await?)
    }

    /// Set `status` on every known id; returns how many records changed
    pub async fn bulk_set_status(&self, input: BulkStatusUpdate) -> AppResult<BulkStatusResult> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = input
            .ids
            .iter()
            .filter_map(|id| non_blank(Some(id.as_str())))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if ids.is_empty() {
            return Err(AppError::new(ErrorCode::SubscriptionIdsRequired));
        }
        let status = input
            .status
            .ok_or_else(|| missing_fields(ErrorCode::RequiredField, &["status"]))?;

        let mut updated = 0;
        for id in &ids {
            let Some(mut sub) = self.subscriptions.find_by_id(id).await? else {
                continue;
            };
            if sub.status == status {
                continue;
            }
            sub.status = status;
            match self.subscriptions.update(sub).await {
                Ok(_) => updated += 1,
                Err(RepoError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(requested = ids.len(), updated, status = %status, "Bulk status update");
        Ok(BulkStatusResult {
            updated,
            at: Utc::now().to_rfc3339(),
        })
    }

    /// Mark the newest PENDING obligation of `member_id` + `plan_id` as PAID
    ///
    /// The amount is not compared with the obligation. Returns the settled
    /// obligation id, or `None` when nothing matched.
    pub async fn apply_payment(
        &self,
        member_id: &str,
        plan_id: &str,
        paid_at: NaiveDate,
        amount: f64,
        payment_id: Option<&str>,
    ) -> AppResult<Option<String>> {
        let filter = SubscriptionQuery {
            status: Some(SubscriptionStatus::Pending),
            member_id: Some(member_id.to_string()),
            plan_id: Some(plan_id.to_string()),
            ..Default::default()
        };
        let Some(newest) = self.subscriptions.find_many(&filter).await?.into_iter().next() else {
            return Ok(None);
        };

        let settled = self.settle(newest, payment_id).await?;
        tracing::info!(
            subscription_id = %settled.id,
            member_id = %member_id,
            %paid_at,
            amount,
            "Payment applied to newest pending obligation"
        );
        Ok(Some(settled.id))
    }

    async fn settle(
        &self,
        mut sub: MemberSubscription,
        payment_id: Option<&str>,
    ) -> AppResult<MemberSubscription> {
        sub.status = SubscriptionStatus::Paid;
        sub.payment_id = payment_id.map(str::to_string);
        Ok(self.subscriptions.update(sub).await?)
    }

    // ── Payments ────────────────────────────────────────────────────

    pub async fn list_payments(&self, filter: &PaymentQuery) -> AppResult<Vec<Payment>> {
        Ok(self.payments.find_many(filter).await?)
    }

    /// Record a payment, then settle an obligation with it
    ///
    /// An explicit `subscriptionId` must name a PENDING obligation of the
    /// same member and plan; otherwise the newest PENDING one is used.
    pub async fn record_payment(&self, input: PaymentCreate) -> AppResult<Payment> {
        let member_id = non_blank(input.member_id.as_deref());
        let plan_id = non_blank(input.plan_id.as_deref());
        let member = match &member_id {
            Some(id) => self.members.find_by_id(id).await?,
            None => None,
        };
        let plan = match &plan_id {
            Some(id) => self.plans.find_by_id(id).await?,
            None => None,
        };
        let (Some(member), Some(plan)) = (member, plan) else {
            return Err(AppError::new(ErrorCode::PaymentInvalidMemberOrPlan));
        };

        let amount = match input.amount {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => return Err(AppError::new(ErrorCode::PaymentInvalidAmount)),
        };
        let paid_at = match non_blank(input.paid_at.as_deref()) {
            Some(raw) => parse_date_or_timestamp(&raw)
                .ok_or_else(|| AppError::new(ErrorCode::PaymentInvalidDate))?,
            None => {
                return Err(AppError::with_message(
                    ErrorCode::PaymentInvalidDate,
                    "paidAt is required",
                ));
            }
        };
        let reference = non_blank(input.reference.as_deref());
        validate_optional_text(&reference, "reference", MAX_SHORT_TEXT_LEN)?;

        let target = match non_blank(input.subscription_id.as_deref()) {
            Some(sid) => {
                let sub = self.subscriptions.find_by_id(&sid).await?;
                match sub {
                    Some(sub)
                        if sub.status == SubscriptionStatus::Pending
                            && sub.member_id == member.id
                            && sub.plan_id == plan.id =>
                    {
                        Some(sub)
                    }
                    _ => {
                        return Err(AppError::new(ErrorCode::PaymentSubscriptionMismatch)
                            .with_detail("subscriptionId", sid));
                    }
                }
            }
            None => None,
        };

        let payment = Payment {
            id: prefixed_id("pay"),
            member_name: member.full_name(),
            member_id: member.id.clone(),
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            amount,
            currency: plan.currency.clone(),
            paid_at,
            reference,
            subscription_id: None,
            created_at: now_millis(),
        };
        let mut payment = self.payments.insert(payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            member_id = %payment.member_id,
            plan_id = %payment.plan_id,
            amount = payment.amount,
            "Payment recorded"
        );

        let settled = match target {
            Some(sub) => Some(self.settle(sub, Some(payment.id.as_str())).await?.id),
            None => {
                self.apply_payment(
                    &member.id,
                    &plan.id,
                    paid_at,
                    amount,
                    Some(payment.id.as_str()),
                )
                .await?
            }
        };

        if let Some(subscription_id) = settled {
            payment.subscription_id = Some(subscription_id);
            payment = self.payments.update(payment).await?;
        } else {
            tracing::info!(payment_id = %payment.id, "No pending obligation matched payment");
        }
        Ok(payment)
    }
}
