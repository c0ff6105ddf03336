pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

pub use memory::MemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

/// Persistence for employee records.
///
/// Implementations own the email uniqueness constraint: `insert` and `update`
/// must fail with `AppError::Conflict` when the email is already taken by
/// another record, regardless of any check the caller did beforehand.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, AppError>;

    /// Records whose name contains `keyword`, ignoring case.
    async fn list(&self, keyword: &str) -> Result<Vec<Employee>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError>;

    /// Returns `None` when no record has this id.
    async fn update(&self, id: &str, changes: EmployeeChanges) -> Result<Option<Employee>, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}
