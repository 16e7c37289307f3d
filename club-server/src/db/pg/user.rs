//! User Repository

use async_trait::async_trait;
use shared::models::User;
use sqlx::PgPool;

use super::{NEWEST_FIRST, ensure_affected, parse_column};
use crate::db::{Record, RepoError, RepoResult, Repository, UserFilter};

const USER_COLUMNS: &str = "id, username, email, role, member_id, password_hash, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    role: String,
    member_id: Option<String>,
    password_hash: String,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> RepoResult<Self> {
        Ok(User {
            role: parse_column("role", &row.role)?,
            id: row.id,
            username: row.username,
            email: row.email,
            member_id: row.member_id,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_many(&self, filter: &UserFilter) -> RepoResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users \
             WHERE ($1::text IS NULL OR username = $1 OR LOWER(email) = LOWER($1)) \
             {}",
            USER_COLUMNS,
            NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(filter.login.as_deref())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert(&self, u: User) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            USER_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&u.id)
            .bind(&u.username)
            .bind(&u.email)
            .bind(u.role.as_str())
            .bind(&u.member_id)
            .bind(&u.password_hash)
            .bind(u.created_at)
            .execute(&self.pool)
            .await?;
        Ok(u)
    }

    async fn update(&self, u: User) -> RepoResult<User> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, role = $4, member_id = $5, \
             password_hash = $6 WHERE id = $1",
        )
        .bind(&u.id)
        .bind(&u.username)
        .bind(&u.email)
        .bind(u.role.as_str())
        .bind(&u.member_id)
        .bind(&u.password_hash)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), User::RESOURCE, &u.id)?;
        Ok(u)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), User::RESOURCE, id)
    }
}
