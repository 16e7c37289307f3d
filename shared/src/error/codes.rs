//! Unified error codes for the club administration service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Member errors
//! - 4xxx: User errors
//! - 5xxx: Subscription errors
//! - 6xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as the numeric `u16` value so API clients can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token expired
    TokenExpired = 1003,
    /// Token invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Role required
    RoleRequired = 2002,
    /// Admin required
    AdminRequired = 2003,

    // ==================== 3xxx: Member ====================
    /// Member not found
    MemberNotFound = 3001,
    /// Member email already registered
    MemberEmailExists = 3002,
    /// Member national id already registered
    MemberNationalIdExists = 3003,
    /// Caller has no linked member record
    MemberNotLinked = 3004,
    /// Required member fields missing
    MemberMissingFields = 3005,

    // ==================== 4xxx: User ====================
    /// User not found
    UserNotFound = 4001,
    /// Username already exists
    UsernameExists = 4002,
    /// Password shorter than allowed
    PasswordTooShort = 4003,
    /// Password longer than allowed
    PasswordTooLong = 4004,
    /// Linked member does not exist
    UserMemberLinkInvalid = 4005,

    // ==================== 5xxx: Subscription ====================
    /// Plan not found
    PlanNotFound = 5001,
    /// Plan code already exists
    PlanCodeExists = 5002,
    /// Assessment target incomplete
    AssessmentTargetInvalid = 5003,
    /// Member subscription not found
    SubscriptionNotFound = 5004,
    /// Bulk update without ids
    SubscriptionIdsRequired = 5005,

    // ==================== 6xxx: Payment ====================
    /// Amount missing, non-finite or not positive
    PaymentInvalidAmount = 6001,
    /// Paid-at date missing or unparseable
    PaymentInvalidDate = 6002,
    /// Member or plan does not exist
    PaymentInvalidMemberOrPlan = 6003,
    /// Named subscription cannot be settled by this payment
    PaymentSubscriptionMismatch = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Member
            ErrorCode::MemberNotFound => "Member not found",
            ErrorCode::MemberEmailExists => "A member with this email already exists",
            ErrorCode::MemberNationalIdExists => "A member with this national ID already exists",
            ErrorCode::MemberNotLinked => "No member record is linked to this user",
            ErrorCode::MemberMissingFields => "Missing required fields",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",
            ErrorCode::PasswordTooLong => "Password must be at most 128 characters",
            ErrorCode::UserMemberLinkInvalid => "Linked member does not exist",

            // Subscription
            ErrorCode::PlanNotFound => "Subscription plan not found",
            ErrorCode::PlanCodeExists => "Plan code already exists",
            ErrorCode::AssessmentTargetInvalid => "Assessment target is incomplete",
            ErrorCode::SubscriptionNotFound => "Member subscription not found",
            ErrorCode::SubscriptionIdsRequired => "No ids provided",

            // Payment
            ErrorCode::PaymentInvalidAmount => "Amount must be a positive number",
            ErrorCode::PaymentInvalidDate => "paidAt must be a valid date",
            ErrorCode::PaymentInvalidMemberOrPlan => "Invalid member or plan",
            ErrorCode::PaymentSubscriptionMismatch => {
                "Subscription is not a pending obligation of this member and plan"
            }

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown numeric value to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleRequired,
            2003 => ErrorCode::AdminRequired,

            3001 => ErrorCode::MemberNotFound,
            3002 => ErrorCode::MemberEmailExists,
            3003 => ErrorCode::MemberNationalIdExists,
            3004 => ErrorCode::MemberNotLinked,
            3005 => ErrorCode::MemberMissingFields,

            4001 => ErrorCode::UserNotFound,
            4002 => ErrorCode::UsernameExists,
            4003 => ErrorCode::PasswordTooShort,
            4004 => ErrorCode::PasswordTooLong,
            4005 => ErrorCode::UserMemberLinkInvalid,

            5001 => ErrorCode::PlanNotFound,
            5002 => ErrorCode::PlanCodeExists,
            5003 => ErrorCode::AssessmentTargetInvalid,
            5004 => ErrorCode::SubscriptionNotFound,
            5005 => ErrorCode::SubscriptionIdsRequired,

            6001 => ErrorCode::PaymentInvalidAmount,
            6002 => ErrorCode::PaymentInvalidDate,
            6003 => ErrorCode::PaymentInvalidMemberOrPlan,
            6004 => ErrorCode::PaymentSubscriptionMismatch,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9003 => ErrorCode::ConfigError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::MemberEmailExists.code(), 3002);
        assert_eq!(ErrorCode::UsernameExists.code(), 4002);
        assert_eq!(ErrorCode::PlanCodeExists.code(), 5002);
        assert_eq!(ErrorCode::PaymentInvalidMemberOrPlan.code(), 6003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(3001), Ok(ErrorCode::MemberNotFound));
        assert_eq!(ErrorCode::try_from(5005), Ok(ErrorCode::SubscriptionIdsRequired));
        assert_eq!(ErrorCode::try_from(9003), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
        assert_eq!(
            InvalidErrorCode(42).to_string(),
            "invalid error code: 42"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::MemberNotFound).unwrap();
        assert_eq!(json, "3001");

        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::UsernameExists);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::PaymentInvalidAmount.to_string(), "E6001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::PaymentInvalidMemberOrPlan.message(), "Invalid member or plan");
        assert_eq!(ErrorCode::SubscriptionIdsRequired.message(), "No ids provided");
    }
}
