//! Member Subscription Repository

use async_trait::async_trait;
use shared::models::{MemberSubscription, SubscriptionQuery};
use sqlx::PgPool;

use super::{NEWEST_FIRST, ensure_affected, parse_column, parse_optional_column};
use crate::db::{Record, RepoError, RepoResult, Repository};

const SUBSCRIPTION_COLUMNS: &str = "id, member_id, member_name, level, plan_id, plan_name, amount, currency, period, status, assessment_id, payment_id, created_at";

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    member_id: String,
    member_name: String,
    level: Option<String>,
    plan_id: String,
    plan_name: String,
    amount: f64,
    currency: String,
    period: String,
    status: String,
    assessment_id: String,
    payment_id: Option<String>,
    created_at: i64,
}

impl TryFrom<SubscriptionRow> for MemberSubscription {
    type Error = RepoError;

    fn try_from(row: SubscriptionRow) -> RepoResult<Self> {
        Ok(MemberSubscription {
            level: parse_optional_column("level", row.level)?,
            status: parse_column("status", &row.status)?,
            id: row.id,
            member_id: row.member_id,
            member_name: row.member_name,
            plan_id: row.plan_id,
            plan_name: row.plan_name,
            amount: row.amount,
            currency: row.currency,
            period: row.period,
            assessment_id: row.assessment_id,
            payment_id: row.payment_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<MemberSubscription> for PgSubscriptionRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<MemberSubscription>> {
        let sql = format!(
            "SELECT {} FROM member_subscriptions WHERE id = $1",
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(MemberSubscription::try_from).transpose()
    }

    async fn find_many(&self, filter: &SubscriptionQuery) -> RepoResult<Vec<MemberSubscription>> {
        let sql = format!(
            "SELECT {} FROM member_subscriptions \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::text IS NULL OR period = $2) \
               AND ($3::text IS NULL OR level = $3) \
               AND ($4::text IS NULL OR member_id = $4) \
               AND ($5::text IS NULL OR plan_id = $5) \
             {}",
            SUBSCRIPTION_COLUMNS,
            NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.period.as_deref())
            .bind(filter.level.map(|l| l.as_str()))
            .bind(filter.member_id.as_deref())
            .bind(filter.plan_id.as_deref())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(MemberSubscription::try_from).collect()
    }

    async fn insert(&self, s: MemberSubscription) -> RepoResult<MemberSubscription> {
        let sql = format!(
            "INSERT INTO member_subscriptions ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            SUBSCRIPTION_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&s.id)
            .bind(&s.member_id)
            .bind(&s.member_name)
            .bind(s.level.map(|l| l.as_str()))
            .bind(&s.plan_id)
            .bind(&s.plan_name)
            .bind(s.amount)
            .bind(&s.currency)
            .bind(&s.period)
            .bind(s.status.as_str())
            .bind(&s.assessment_id)
            .bind(&s.payment_id)
            .bind(s.created_at)
            .execute(&self.pool)
            .await?;
        Ok(s)
    }

    async fn update(&self, s: MemberSubscription) -> RepoResult<MemberSubscription> {
        let result = sqlx::query(
            "UPDATE member_subscriptions SET member_id = $2, member_name = $3, level = $4, \
             plan_id = $5, plan_name = $6, amount = $7, currency = $8, period = $9, \
             status = $10, assessment_id = $11, payment_id = $12 WHERE id = $1",
        )
        .bind(&s.id)
        .bind(&s.member_id)
        .bind(&s.member_name)
        .bind(s.level.map(|l| l.as_str()))
        .bind(&s.plan_id)
        .bind(&s.plan_name)
        .bind(s.amount)
        .bind(&s.currency)
        .bind(&s.period)
        .bind(s.status.as_str())
        .bind(&s.assessment_id)
        .bind(&s.payment_id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), MemberSubscription::RESOURCE, &s.id)?;
        Ok(s)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM member_subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), MemberSubscription::RESOURCE, id)
    }
}
