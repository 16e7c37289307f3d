//! Payment Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recorded payment with member/plan snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
    /// The plan's currency
    pub currency: String,
    pub paid_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Obligation settled by this payment, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    pub created_at: i64,
}

/// Record payment payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentCreate {
    pub member_id: Option<String>,
    pub plan_id: Option<String>,
    pub amount: Option<f64>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub paid_at: Option<String>,
    pub reference: Option<String>,
    /// Settle exactly this obligation instead of auto-matching
    pub subscription_id: Option<String>,
}

/// Payment list filter; `from`/`to` are inclusive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentQuery {
    pub member_id: Option<String>,
    pub plan_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PaymentQuery {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.member_id.as_deref().is_none_or(|m| payment.member_id == m)
            && self.plan_id.as_deref().is_none_or(|p| payment.plan_id == p)
            && self.from.is_none_or(|from| payment.paid_at >= from)
            && self.to.is_none_or(|to| payment.paid_at <= to)
    }
}
