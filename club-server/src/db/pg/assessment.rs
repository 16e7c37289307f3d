//! Dues Assessment Repository

use async_trait::async_trait;
use shared::models::DuesAssessment;
use sqlx::PgPool;

use super::{NEWEST_FIRST, ensure_affected, parse_column, parse_optional_column};
use crate::db::{Record, RepoError, RepoResult, Repository};

const ASSESSMENT_COLUMNS: &str =
    "id, plan_id, plan_name, period, target_type, target_level, member_ids, created_by, materialized, created_at";

#[derive(sqlx::FromRow)]
struct AssessmentRow {
    id: String,
    plan_id: String,
    plan_name: String,
    period: String,
    target_type: String,
    target_level: Option<String>,
    member_ids: Vec<String>,
    created_by: String,
    materialized: i32,
    created_at: i64,
}

impl TryFrom<AssessmentRow> for DuesAssessment {
    type Error = RepoError;

    fn try_from(row: AssessmentRow) -> RepoResult<Self> {
        Ok(DuesAssessment {
            target_type: parse_column("target_type", &row.target_type)?,
            target_level: parse_optional_column("target_level", row.target_level)?,
            materialized: u32::try_from(row.materialized).unwrap_or(0),
            id: row.id,
            plan_id: row.plan_id,
            plan_name: row.plan_name,
            period: row.period,
            member_ids: row.member_ids,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgAssessmentRepository {
    pool: PgPool,
}

impl PgAssessmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<DuesAssessment> for PgAssessmentRepository {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<DuesAssessment>> {
        let sql = format!(
            "SELECT {} FROM dues_assessments WHERE id = $1",
            ASSESSMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, AssessmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DuesAssessment::try_from).transpose()
    }

    async fn find_many(&self, _filter: &()) -> RepoResult<Vec<DuesAssessment>> {
        let sql = format!(
            "SELECT {} FROM dues_assessments {}",
            ASSESSMENT_COLUMNS,
            NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, AssessmentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(DuesAssessment::try_from).collect()
    }

    async fn insert(&self, a: DuesAssessment) -> RepoResult<DuesAssessment> {
        let sql = format!(
            "INSERT INTO dues_assessments ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            ASSESSMENT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&a.id)
            .bind(&a.plan_id)
            .bind(&a.plan_name)
            .bind(&a.period)
            .bind(a.target_type.as_str())
            .bind(a.target_level.map(|l| l.as_str()))
            .bind(&a.member_ids)
            .bind(&a.created_by)
            .bind(a.materialized as i32)
            .bind(a.created_at)
            .execute(&self.pool)
            .await?;
        Ok(a)
    }

    async fn update(&self, a: DuesAssessment) -> RepoResult<DuesAssessment> {
        let result = sqlx::query(
            "UPDATE dues_assessments SET plan_id = $2, plan_name = $3, period = $4, \
             target_type = $5, target_level = $6, member_ids = $7, created_by = $8, \
             materialized = $9 WHERE id = $1",
        )
        .bind(&a.id)
        .bind(&a.plan_id)
        .bind(&a.plan_name)
        .bind(&a.period)
        .bind(a.target_type.as_str())
        .bind(a.target_level.map(|l| l.as_str()))
        .bind(&a.member_ids)
        .bind(&a.created_by)
        .bind(a.materialized as i32)
        .execute(&self.pool)
        .await?;
        ensure_affected(result.rows_affected(), DuesAssessment::RESOURCE, &a.id)?;
        Ok(a)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM dues_assessments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), DuesAssessment::RESOURCE, id)
    }
}
