use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeChanges, EmployeeImage, NewEmployee};

const COLUMNS: &str = "id, name, email, mobile, designation, gender, courses, \
                       image_url, image_content_type, created_at, updated_at";

#[derive(sqlx::FromRow, Debug)]
struct EmployeeRow {
    id: String,
    name: String,
    email: String,
    mobile: String,
    designation: String,
    gender: String,
    courses: Vec<String>,
    image_url: String,
    image_content_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            email: row.email,
            mobile: row.mobile,
            designation: row.designation,
            gender: row.gender,
            courses: row.courses,
            image: EmployeeImage {
                url: row.image_url,
                content_type: row.image_content_type,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes `%`, `_` and `\` so the keyword matches literally in `ILIKE`.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO employees ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(&employee.id)
            .bind(&employee.name)
            .bind(&employee.email)
            .bind(&employee.mobile)
            .bind(&employee.designation)
            .bind(&employee.gender)
            .bind(&employee.courses)
            .bind(&employee.image.url)
            .bind(&employee.image.content_type)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list(&self, keyword: &str) -> Result<Vec<Employee>, AppError> {
        let mut query_builder: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new(format!("SELECT {COLUMNS} FROM employees"));

        if !keyword.is_empty() {
            query_builder.push(" WHERE name ILIKE ");
            query_builder.push_bind(like_pattern(keyword));
        }
        query_builder.push(" ORDER BY created_at ASC, id ASC");

        let rows = query_builder
            .build_query_as::<EmployeeRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM employees WHERE id = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM employees WHERE email = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn update(&self, id: &str, changes: EmployeeChanges) -> Result<Option<Employee>, AppError> {
        let (image_url, image_content_type) = match changes.image {
            Some(image) => (Some(image.url), Some(image.content_type)),
            None => (None, None),
        };
        let sql = format!(
            "UPDATE employees SET \
                name = $1, email = $2, mobile = $3, designation = $4, gender = $5, \
                courses = $6, \
                image_url = COALESCE($7, image_url), \
                image_content_type = COALESCE($8, image_content_type), \
                updated_at = $9 \
             WHERE id = $10 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(&changes.mobile)
            .bind(&changes.designation)
            .bind(&changes.gender)
            .bind(&changes.courses)
            .bind(image_url)
            .bind(image_content_type)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Employee::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
