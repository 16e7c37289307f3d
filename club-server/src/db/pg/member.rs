//! Member Repository

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::Member;
use sqlx::PgPool;

use super::{
    NEWEST_FIRST, ensure_affected, like_pattern, parse_column, parse_optional_column,
};
use crate::db::{MemberFilter, Record, RepoError, RepoResult, Repository};

const MEMBER_COLUMNS: &str = "id, first_name, last_name, email, phone, date_of_birth, gender, national_id, residential_address, region, occupation, nationality, level, category, status, passport_picture_url, outstanding_balance, created_at";

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    national_id: Option<String>,
    residential_address: Option<String>,
    region: Option<String>,
    occupation: Option<String>,
    nationality: Option<String>,
    level: Option<String>,
    category: Option<String>,
    status: String,
    passport_picture_url: Option<String>,
    outstanding_balance: f64,
    created_at: i64,
}

impl TryFrom<MemberRow> for Member {
    type Error = RepoError;

    fn try_from(row: MemberRow) -> RepoResult<Self> {
        Ok(Member {
            gender: parse_optional_column("gender", row.gender)?,
            level: parse_optional_column("level", row.level)?,
            status: parse_column("status", &row.status)?,
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            national_id: row.national_id,
            residential_address: row.residential_address,
            region: row.region,
            occupation: row.occupation,
            nationality: row.nationality,
            category: row.category,
            passport_picture_url: row.passport_picture_url,
            outstanding_balance: row.outstanding_balance,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Member> for PgMemberRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Member>> {
        let sql = format!("SELECT {} FROM members WHERE id = $1", MEMBER_COLUMNS);
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }

    async fn find_many(&self, filter: &MemberFilter) -> RepoResult<Vec<Member>> {
        let sql = format!(
            "SELECT {} FROM members \
             WHERE ($1::text IS NULL \
                OR LOWER(first_name) LIKE $1 \
                OR LOWER(last_name) LIKE $1 \
                OR LOWER(first_name || ' ' || last_name) LIKE $1 \
                OR LOWER(COALESCE(email, '')) LIKE $1 \
                OR LOWER(COALESCE(phone, '')) LIKE $1 \
                OR LOWER(COALESCE(national_id, '')) LIKE $1 \
                OR LOWER(id) LIKE $1) \
               AND ($2::text IS NULL OR level = $2) \
             {}",
            MEMBER_COLUMNS,
            NEWEST_FIRST
        );
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let rows = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(pattern)
            .bind(filter.level.map(|l| l.as_str()))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn insert(&self, m: Member) -> RepoResult<Member> {
        let sql = format!(
            "INSERT INTO members ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
            MEMBER_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&m.id)
            .bind(&m.first_name)
            .bind(&m.last_name)
            .bind(&m.email)
            .bind(&m.phone)
            .bind(m.date_of_birth)
            .bind(m.gender.map(|g| g.as_str()))
            .bind(&m.national_id)
            .bind(&m.residential_address)
            .bind(&m.region)
            .bind(&m.occupation)
            .bind(&m.nationality)
            .bind(m.level.map(|l| l.as_str()))
            .bind(&m.category)
            .bind(m.status.as_str())
            .bind(&m.passport_picture_url)
            .bind(m.outstanding_balance)
            .bind(m.created_at)
            .execute(&self.pool)
            .await?;
        Ok(m)
    }

    async fn update(&self, m: Member) -> RepoResult<Member> {
        let result = sqlx::query(
            "UPDATE members SET first_name = $2, last_name = $3, email = $4, phone = $5, \
             date_of_birth = $6, gender = $7, national_id = $8, residential_address = $9, \
             region = $10, occupation = $11, nationality = $12, level = $13, category = $14, \
             status = $15, passport_picture_url = $16, outstanding_balance = $17 \
             WHERE id = $1",
        )
        .bind(&m.id)
        .bind(&m.first_name)
        .bind(&m.last_name)
        .bind(&m.email)
        .bind(&m.phone)
        .bind(m.date_of_birth)
        .bind(m.gender.map(|g| g.as_str()))
        .bind(&m.national_id)
        .bind(&m.residential_address)
        .bind(&m.region)
        .bind(&m.occupation)
        .bind(&m.nationality)
        .bind(m.level.map(|l| l.as_str()))
        .bind(&m.category)
        .bind(m.status.as_str())
        .bind(&m.passport_picture_url)
        .bind(m.outstanding_balance)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), Member::RESOURCE, &m.id)?;
        Ok(m)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Member::RESOURCE, id)
    }
}
