//! 存储层
//!
//! 逻辑组件只依赖 [`Repository`] trait，具体后端通过 [`Stores`] 注入：
//!
//! - [`memory`] - 进程内存储 (测试 & `STORE_BACKEND=memory`)
//! - [`pg`] - PostgreSQL (sqlx)

pub mod memory;
pub mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{
    DuesAssessment, Member, MemberLevel, MemberSubscription, Payment, PaymentQuery,
    SubscriptionPlan, SubscriptionQuery, User,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated; carries the offending field name
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// A record kept by a [`Repository`]
pub trait Record: Clone + Send + Sync + 'static {
    /// Filter accepted by [`Repository::find_many`]
    type Filter: Default + Send + Sync;

    /// Resource name used in error messages
    const RESOURCE: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> i64;

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Unique keys other than the id, as `(field, normalized value)`
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Durable keyed storage for one record type
///
/// `find_many` returns records newest `created_at` first.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>>;

    async fn find_many(&self, filter: &T::Filter) -> RepoResult<Vec<T>>;

    /// Insert a new record; `Duplicate` if the id or a unique key is taken
    async fn insert(&self, record: T) -> RepoResult<T>;

    /// Replace an existing record; `NotFound` if the id is unknown
    async fn update(&self, record: T) -> RepoResult<T>;

    async fn delete(&self, id: &str) -> RepoResult<()>;
}

/// Member lookup filter
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Trimmed, lower-cased search text
    pub search: Option<String>,
    pub level: Option<MemberLevel>,
}

/// User lookup filter
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Exact username or case-insensitive email
    pub login: Option<String>,
}

impl Record for Member {
    type Filter = MemberFilter;
    const RESOURCE: &'static str = "Member";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, filter: &MemberFilter) -> bool {
        filter.search.as_deref().is_none_or(|q| self.matches_search(q))
            && filter.level.is_none_or(|l| self.level == Some(l))
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        let mut keys = Vec::new();
        if let Some(email) = &self.email {
            keys.push(("email", email.to_lowercase()));
        }
        if let Some(national_id) = &self.national_id {
            keys.push(("nationalId", national_id.clone()));
        }
        keys
    }
}

impl Record for User {
    type Filter = UserFilter;
    const RESOURCE: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        filter
            .login
            .as_deref()
            .is_none_or(|login| self.username == login || self.email.eq_ignore_ascii_case(login))
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("username", self.username.clone())]
    }
}

impl Record for SubscriptionPlan {
    type Filter = ();
    const RESOURCE: &'static str = "Subscription plan";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("code", self.code.clone())]
    }
}

impl Record for DuesAssessment {
    type Filter = ();
    const RESOURCE: &'static str = "Assessment";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }
}

impl Record for MemberSubscription {
    type Filter = SubscriptionQuery;
    const RESOURCE: &'static str = "Member subscription";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, filter: &SubscriptionQuery) -> bool {
        filter.matches(self)
    }
}

impl Record for Payment {
    type Filter = PaymentQuery;
    const RESOURCE: &'static str = "Payment";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn matches(&self, filter: &PaymentQuery) -> bool {
        filter.matches(self)
    }
}

/// The bundle of injected repositories handed to the logic components
#[derive(Clone)]
pub struct Stores {
    pub members: Arc<dyn Repository<Member>>,
    pub users: Arc<dyn Repository<User>>,
    pub plans: Arc<dyn Repository<SubscriptionPlan>>,
    pub assessments: Arc<dyn Repository<DuesAssessment>>,
    pub subscriptions: Arc<dyn Repository<MemberSubscription>>,
    pub payments: Arc<dyn Repository<Payment>>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn memory() -> Self {
        use memory::MemoryTable;

        Self {
            members: Arc::new(MemoryTable::<Member>::new()),
            users: Arc::new(MemoryTable::<User>::new()),
            plans: Arc::new(MemoryTable::<SubscriptionPlan>::new()),
            assessments: Arc::new(MemoryTable::<DuesAssessment>::new()),
            subscriptions: Arc::new(MemoryTable::<MemberSubscription>::new()),
            payments: Arc::new(MemoryTable::<Payment>::new()),
        }
    }

    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            members: Arc::new(pg::PgMemberRepository::new(pool.clone())),
            users: Arc::new(pg::PgUserRepository::new(pool.clone())),
            plans: Arc::new(pg::PgPlanRepository::new(pool.clone())),
            assessments: Arc::new(pg::PgAssessmentRepository::new(pool.clone())),
            subscriptions: Arc::new(pg::PgSubscriptionRepository::new(pool.clone())),
            payments: Arc::new(pg::PgPaymentRepository::new(pool)),
        }
    }
}
