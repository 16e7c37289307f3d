//! Subscription plans, dues assessments and member obligations

use serde::{Deserialize, Serialize};

use super::member::MemberLevel;

/// Currency applied when a plan does not name one
pub const DEFAULT_CURRENCY: &str = "GHS";

string_enum! {
    /// Plan billing cycle
    pub enum BillingCycle {
        Monthly => "MONTHLY",
        Yearly => "YEARLY",
        OneTime => "ONE_TIME",
    }
}

string_enum! {
    /// How an assessment selects its members
    pub enum TargetType {
        /// Every member whose level equals `targetLevel`
        Level => "LEVEL",
        /// The listed `memberIds`
        Explicit => "EXPLICIT",
    }
}

string_enum! {
    /// Obligation status (any value may move to any other)
    pub enum SubscriptionStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Waived => "WAIVED",
    }
}

/// Billable product definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub code: String,
    pub amount: f64,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub active: bool,
    pub created_at: i64,
}

/// Create plan payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanCreate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub active: Option<bool>,
}

/// Instruction to levy a plan against a cohort for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuesAssessment {
    pub id: String,
    pub plan_id: String,
    /// Plan name at creation time
    pub plan_name: String,
    pub period: String,
    pub target_type: TargetType,
    pub target_level: Option<MemberLevel>,
    pub member_ids: Vec<String>,
    /// Username of the admin who created it
    pub created_by: String,
    pub created_at: i64,
    /// Obligations created by the materialization run at creation
    #[serde(default)]
    pub materialized: u32,
}

/// Create assessment payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentCreate {
    pub plan_id: Option<String>,
    pub period: Option<String>,
    pub target_type: Option<TargetType>,
    pub target_level: Option<MemberLevel>,
    pub member_ids: Option<Vec<String>>,
}

/// One member's obligation under an assessment
///
/// The id is derived as `ms-{assessmentId}-{memberId}`, which makes
/// materialization idempotent per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSubscription {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub level: Option<MemberLevel>,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
    pub currency: String,
    pub period: String,
    pub status: SubscriptionStatus,
    pub assessment_id: String,
    /// Payment that settled this obligation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: i64,
}

impl MemberSubscription {
    /// Deterministic obligation id for an (assessment, member) pair
    pub fn derive_id(assessment_id: &str, member_id: &str) -> String {
        format!("ms-{}-{}", assessment_id, member_id)
    }
}

/// Member subscription list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionQuery {
    pub status: Option<SubscriptionStatus>,
    pub period: Option<String>,
    pub level: Option<MemberLevel>,
    pub member_id: Option<String>,
    /// Used by payment matching
    #[serde(skip)]
    pub plan_id: Option<String>,
}

impl SubscriptionQuery {
    pub fn matches(&self, sub: &MemberSubscription) -> bool {
        self.status.is_none_or(|s| sub.status == s)
            && self.period.as_deref().is_none_or(|p| sub.period == p)
            && self.level.is_none_or(|l| sub.level == Some(l))
            && self.member_id.as_deref().is_none_or(|m| sub.member_id == m)
            && self.plan_id.as_deref().is_none_or(|p| sub.plan_id == p)
    }
}

/// Bulk status change payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulkStatusUpdate {
    pub ids: Vec<String>,
    pub status: Option<SubscriptionStatus>,
}

/// Bulk status change result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusResult {
    /// Records whose status actually changed
    pub updated: u32,
    /// RFC 3339 timestamp of the change
    pub at: String,
}
