//! Payment Repository

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{Payment, PaymentQuery};
use sqlx::PgPool;

use super::{NEWEST_FIRST, ensure_affected};
use crate::db::{Record, RepoResult, Repository};

const PAYMENT_COLUMNS: &str = "id, member_id, member_name, plan_id, plan_name, amount, currency, paid_at, reference, subscription_id, created_at";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    member_id: String,
    member_name: String,
    plan_id: String,
    plan_name: String,
    amount: f64,
    currency: String,
    paid_at: NaiveDate,
    reference: Option<String>,
    subscription_id: Option<String>,
    created_at: i64,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            member_id: row.member_id,
            member_name: row.member_name,
            plan_id: row.plan_id,
            plan_name: row.plan_name,
            amount: row.amount,
            currency: row.currency,
            paid_at: row.paid_at,
            reference: row.reference,
            subscription_id: row.subscription_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Payment> for PgPaymentRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    async fn find_many(&self, filter: &PaymentQuery) -> RepoResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments \
             WHERE ($1::text IS NULL OR member_id = $1) \
               AND ($2::text IS NULL OR plan_id = $2) \
               AND ($3::date IS NULL OR paid_at >= $3) \
               AND ($4::date IS NULL OR paid_at <= $4) \
             {}",
            PAYMENT_COLUMNS,
            NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(filter.member_id.as_deref())
            .bind(filter.plan_id.as_deref())
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn insert(&self, p: Payment) -> RepoResult<Payment> {
        let sql = format!(
            "INSERT INTO payments ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            PAYMENT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&p.id)
            .bind(&p.member_id)
            .bind(&p.member_name)
            .bind(&p.plan_id)
            .bind(&p.plan_name)
            .bind(p.amount)
            .bind(&p.currency)
            .bind(p.paid_at)
            .bind(&p.reference)
            .bind(&p.subscription_id)
            .bind(p.created_at)
            .execute(&self.pool)
            .await?;
        Ok(p)
    }

    async fn update(&self, p: Payment) -> RepoResult<Payment> {
        let result = sqlx::query(
            "UPDATE payments SET member_id = $2, member_name = $3, plan_id = $4, plan_name = $5, \
             amount = $6, currency = $7, paid_at = $8, reference = $9, subscription_id = $10 \
             WHERE id = $1",
        )
        .bind(&p.id)
        .bind(&p.member_id)
        .bind(&p.member_name)
        .bind(&p.plan_id)
        .bind(&p.plan_name)
        .bind(p.amount)
        .bind(&p.currency)
        .bind(p.paid_at)
        .bind(&p.reference)
        .bind(&p.subscription_id)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), Payment::RESOURCE, &p.id)?;
        Ok(p)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), Payment::RESOURCE, id)
    }
}
