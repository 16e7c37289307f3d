//! 业务逻辑组件
//!
//! 三个组件都只依赖注入的 [`Stores`](crate::db::Stores)，不接触 HTTP 类型：
//!
//! - [`MemberRegistry`] - 会员登记
//! - [`SubscriptionEngine`] - 会费方案、摊派、缴费
//! - [`UserDirectory`] - 登录账户

pub mod member_registry;
pub mod subscription_engine;
pub mod user_directory;

pub use member_registry::{MemberRegistry, MemberSchema};
pub use subscription_engine::SubscriptionEngine;
pub use user_directory::UserDirectory;

use crate::db::RepoError;
use crate::utils::{AppError, ErrorCode};

/// Repository failures at the service boundary
///
/// Duplicates carry the offending field, which picks the specific conflict
/// code. Database failures become system errors (logged, generic message).
impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(field) => {
                let code = match field.as_str() {
                    "email" => ErrorCode::MemberEmailExists,
                    "nationalId" => ErrorCode::MemberNationalIdExists,
                    "username" => ErrorCode::UsernameExists,
                    "code" => ErrorCode::PlanCodeExists,
                    _ => ErrorCode::AlreadyExists,
                };
                AppError::new(code).with_detail("field", field)
            }
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_repo_error_mapping() {
        let err = AppError::from(RepoError::Duplicate("email".into()));
        assert_eq!(err.code, ErrorCode::MemberEmailExists);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err = AppError::from(RepoError::Duplicate("id".into()));
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err = AppError::from(RepoError::NotFound("Member mem_1".into()));
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);

        let err = AppError::from(RepoError::Database("connection reset".into()));
        assert!(err.is_system());
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
