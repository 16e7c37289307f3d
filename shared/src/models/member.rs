//! Member Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::serde_helpers::double_option;

string_enum! {
    /// Self-declared gender
    pub enum Gender {
        Male => "MALE",
        Female => "FEMALE",
        Other => "OTHER",
    }
}

string_enum! {
    /// Paid membership tier
    pub enum MemberLevel {
        Gold => "GOLD",
        Silver => "SILVER",
        Bronze => "BRONZE",
        Vip => "VIP",
    }
}

string_enum! {
    /// Membership lifecycle status (any value may move to any other)
    pub enum MemberStatus {
        Prospect => "PROSPECT",
        Pending => "PENDING",
        Active => "ACTIVE",
        Suspended => "SUSPENDED",
    }
}

impl Default for MemberStatus {
    fn default() -> Self {
        Self::Prospect
    }
}

/// Member entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<MemberLevel>,
    /// Free-form grouping tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_picture_url: Option<String>,
    #[serde(default)]
    pub outstanding_balance: f64,
    pub created_at: i64,
}

impl Member {
    /// "First Last", used for search and for payment/subscription snapshots
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match against the searchable fields.
    ///
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let hit = |value: &str| value.to_lowercase().contains(needle);

        hit(&self.first_name)
            || hit(&self.last_name)
            || hit(&self.full_name())
            || self.email.as_deref().is_some_and(hit)
            || self.phone.as_deref().is_some_and(hit)
            || self.national_id.as_deref().is_some_and(hit)
            || hit(&self.id)
    }
}

/// Create member payload
///
/// Every field is optional at the wire level; which ones are required is
/// decided by the configured member schema policy on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberCreate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub national_id: Option<String>,
    pub residential_address: Option<String>,
    pub region: Option<String>,
    pub occupation: Option<String>,
    pub nationality: Option<String>,
    pub level: Option<MemberLevel>,
    pub category: Option<String>,
    pub status: Option<MemberStatus>,
    pub passport_picture_url: Option<String>,
    pub outstanding_balance: Option<f64>,
}

/// Update member payload (partial merge)
///
/// `id` and `createdAt` are not part of the payload, so such keys are
/// silently dropped. `level` and `passportPictureUrl` distinguish an absent
/// key (keep) from an explicit `null` (clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub national_id: Option<String>,
    pub residential_address: Option<String>,
    pub region: Option<String>,
    pub occupation: Option<String>,
    pub nationality: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub level: Option<Option<MemberLevel>>,
    pub category: Option<String>,
    pub status: Option<MemberStatus>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub passport_picture_url: Option<Option<String>>,
    pub outstanding_balance: Option<f64>,
}

/// Member list query (`GET /api/members?q=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberQuery {
    pub q: Option<String>,
}
