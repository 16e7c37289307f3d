//! User Model

use serde::{Deserialize, Serialize};

string_enum! {
    /// Login role. Requests without a token act as the implicit guest.
    pub enum UserRole {
        Admin => "ADMIN",
        Member => "MEMBER",
    }
}

/// User account
///
/// `password_hash` holds an argon2 PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    /// Weak reference to a member record
    pub member_id: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCreate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub member_id: Option<String>,
    /// Generated when omitted
    pub password: Option<String>,
}

/// Result of a user creation
///
/// `temporaryPassword` is only present when the server generated the
/// password, and is only ever returned here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreated {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Login payload; `username` also accepts an email address
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "login")]
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Password change payload
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordUpdate {
    #[serde(alias = "newPassword")]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: "usr_1".to_string(),
            username: "kwame".to_string(),
            email: "kwame@example.com".to_string(),
            role: UserRole::Member,
            member_id: Some("mem_1".to_string()),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: 10,
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("passwordHash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"memberId\":\"mem_1\""));
        assert!(json.contains("\"role\":\"MEMBER\""));
    }

    #[test]
    fn test_created_flattens_user() {
        let created = UserCreated {
            user: sample(),
            temporary_password: Some("Xy7-temp".to_string()),
        };
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["username"], "kwame");
        assert_eq!(json["temporaryPassword"], "Xy7-temp");
        assert!(json.get("passwordHash").is_none());

        let without = UserCreated {
            user: sample(),
            temporary_password: None,
        };
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("temporaryPassword").is_none());
    }

    #[test]
    fn test_password_update_alias() {
        let p: PasswordUpdate = serde_json::from_str(r#"{"newPassword":"secret1"}"#).unwrap();
        assert_eq!(p.password, "secret1");
    }
}
