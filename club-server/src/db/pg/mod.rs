//! PostgreSQL 存储 (sqlx)
//!
//! 每张表一个 repository，行结构 (`*Row`) 只在本模块内使用，
//! 枚举列以大写字符串保存，读出时再解析。

mod assessment;
mod member;
mod payment;
mod plan;
mod subscription;
mod user;

pub use assessment::PgAssessmentRepository;
pub use member::PgMemberRepository;
pub use payment::PgPaymentRepository;
pub use plan::PgPlanRepository;
pub use subscription::PgSubscriptionRepository;
pub use user::PgUserRepository;

use std::str::FromStr;

use shared::models::UnknownVariant;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{RepoError, RepoResult};

/// Newest first; `seq` (insertion order) breaks ties within the same millisecond,
/// matching the memory store.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, seq DESC";

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error()
            && db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
        {
            return RepoError::Duplicate(duplicate_field(db_err.constraint()).to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Map a unique constraint/index name to the field it guards
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("members_email_key") => "email",
        Some("members_national_id_key") => "nationalId",
        Some("users_username_key") => "username",
        Some("subscription_plans_code_key") => "code",
        Some(name) if name.ends_with("_pkey") => "id",
        _ => "unknown",
    }
}

/// Connect and apply the embedded migrations
pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| RepoError::Database(format!("Migration failed: {}", e)))?;

    tracing::info!("Database migrations applied");
    Ok(pool)
}

fn parse_column<E>(column: &str, raw: &str) -> RepoResult<E>
where
    E: FromStr<Err = UnknownVariant>,
{
    raw.parse()
        .map_err(|e: UnknownVariant| RepoError::Database(format!("column {}: {}", column, e)))
}

fn parse_optional_column<E>(column: &str, raw: Option<String>) -> RepoResult<Option<E>>
where
    E: FromStr<Err = UnknownVariant>,
{
    raw.map(|v| parse_column(column, &v)).transpose()
}

/// `%needle%` with LIKE wildcards escaped
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn ensure_affected(rows: u64, resource: &str, id: &str) -> RepoResult<()> {
    if rows == 0 {
        return Err(RepoError::NotFound(format!("{} {}", resource, id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::MemberLevel;

    #[test]
    fn test_duplicate_field_mapping() {
        assert_eq!(duplicate_field(Some("members_email_key")), "email");
        assert_eq!(duplicate_field(Some("users_username_key")), "username");
        assert_eq!(duplicate_field(Some("payments_pkey")), "id");
        assert_eq!(duplicate_field(None), "unknown");
    }

    #[test]
    fn test_parse_column() {
        let level: MemberLevel = parse_column("level", "SILVER").unwrap();
        assert_eq!(level, MemberLevel::Silver);
        assert!(parse_column::<MemberLevel>("level", "IRON").is_err());
        assert_eq!(
            parse_optional_column::<MemberLevel>("level", None).unwrap(),
            None
        );
    }

    #[test]
    fn test_newest_first_breaks_timestamp_ties() {
        assert!(NEWEST_FIRST.starts_with("ORDER BY created_at DESC"));
        assert!(NEWEST_FIRST.ends_with(", seq DESC"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ama"), "%ama%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
