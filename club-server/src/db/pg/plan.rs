//! Subscription Plan Repository

use async_trait::async_trait;
use shared::models::SubscriptionPlan;
use sqlx::PgPool;

use super::{NEWEST_FIRST, ensure_affected, parse_column};
use crate::db::{Record, RepoError, RepoResult, Repository};

const PLAN_COLUMNS: &str = "id, name, code, amount, currency, billing_cycle, active, created_at";

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: String,
    name: String,
    code: String,
    amount: f64,
    currency: String,
    billing_cycle: String,
    active: bool,
    created_at: i64,
}

impl TryFrom<PlanRow> for SubscriptionPlan {
    type Error = RepoError;

    fn try_from(row: PlanRow) -> RepoResult<Self> {
        Ok(SubscriptionPlan {
            billing_cycle: parse_column("billing_cycle", &row.billing_cycle)?,
            id: row.id,
            name: row.name,
            code: row.code,
            amount: row.amount,
            currency: row.currency,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<SubscriptionPlan> for PgPlanRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<SubscriptionPlan>> {
        let sql = format!("SELECT {} FROM subscription_plans WHERE id = $1", PLAN_COLUMNS);
        let row = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SubscriptionPlan::try_from).transpose()
    }

    async fn find_many(&self, _filter: &()) -> RepoResult<Vec<SubscriptionPlan>> {
        let sql = format!(
            "SELECT {} FROM subscription_plans {}",
            PLAN_COLUMNS,
            NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, PlanRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(SubscriptionPlan::try_from).collect()
    }

    async fn insert(&self, p: SubscriptionPlan) -> RepoResult<SubscriptionPlan> {
        let sql = format!(
            "INSERT INTO subscription_plans ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            PLAN_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&p.id)
            .bind(&p.name)
            .bind(&p.code)
            .bind(p.amount)
            .bind(&p.currency)
            .bind(p.billing_cycle.as_str())
            .bind(p.active)
            .bind(p.created_at)
            .execute(&self.pool)
            .await?;
        Ok(p)
    }

    async fn update(&self, p: SubscriptionPlan) -> RepoResult<SubscriptionPlan> {
        let result = sqlx::query(
            "UPDATE subscription_plans SET name = $2, code = $3, amount = $4, currency = $5, \
             billing_cycle = $6, active = $7 WHERE id = $1",
        )
        .bind(&p.id)
        .bind(&p.name)
        .bind(&p.code)
        .bind(p.amount)
        .bind(&p.currency)
        .bind(p.billing_cycle.as_str())
        .bind(p.active)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), SubscriptionPlan::RESOURCE, &p.id)?;
        Ok(p)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM subscription_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), SubscriptionPlan::RESOURCE, id)
    }
}
