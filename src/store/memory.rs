use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};

/// Process-local store with the same constraints as the PostgreSQL one.
/// Records are kept in creation order.
#[derive(Default)]
pub struct MemoryEmployeeStore {
    records: Mutex<Vec<Employee>>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<Employee>>, AppError> {
        self.records
            .lock()
            .map_err(|_| AppError::InternalServerError("Employee store lock poisoned".to_string()))
    }
}

fn email_taken(records: &[Employee], email: &str, except_id: Option<&str>) -> bool {
    records
        .iter()
        .any(|e| e.email == email && Some(e.id.as_str()) != except_id)
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, AppError> {
        let mut records = self.records()?;
        if records.iter().any(|e| e.id == employee.id) {
            return Err(AppError::DatabaseError(format!("duplicate id {}", employee.id)));
        }
        if email_taken(&records, &employee.email, None) {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }
        let employee = Employee::from_new(employee, Utc::now());
        records.push(employee.clone());
        Ok(employee)
    }

    async fn list(&self, keyword: &str) -> Result<Vec<Employee>, AppError> {
        Ok(self
            .records()?
            .iter()
            .filter(|e| e.name_matches(keyword))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, AppError> {
        Ok(self.records()?.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        Ok(self.records()?.iter().find(|e| e.email == email).cloned())
    }

    async fn update(&self, id: &str, changes: EmployeeChanges) -> Result<Option<Employee>, AppError> {
        let mut records = self.records()?;
        if email_taken(&records, &changes.email, Some(id)) {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }
        let Some(employee) = records.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        employee.apply(changes, Utc::now());
        Ok(Some(employee.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|e| e.id != id);
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::EmployeeImage;

    fn new_employee(id: &str, name: &str, email: &str) -> NewEmployee {
        NewEmployee {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            mobile: "9876543210".to_string(),
            designation: "Sales".to_string(),
            gender: "M".to_string(),
            courses: vec!["BCA".to_string()],
            image: EmployeeImage {
                url: format!("https://media.test/{}.png", id),
                content_type: "image/png".to_string(),
            },
        }
    }

    #[actix_web::test]
    async fn insert_enforces_unique_email() {
        let store = MemoryEmployeeStore::new();
        store.insert(new_employee("1", "Ali", "ali@x.com")).await.unwrap();

        let err = store.insert(new_employee("2", "Other", "ali@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.list("").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn update_rejects_email_of_another_record() {
        let store = MemoryEmployeeStore::new();
        store.insert(new_employee("1", "Ali", "ali@x.com")).await.unwrap();
        let bob = store.insert(new_employee("2", "Bob", "bob@x.com")).await.unwrap();

        let changes = EmployeeChanges {
            name: bob.name.clone(),
            email: "ali@x.com".to_string(),
            mobile: bob.mobile.clone(),
            designation: bob.designation.clone(),
            gender: bob.gender.clone(),
            courses: bob.courses.clone(),
            image: None,
        };
        let err = store.update("2", changes).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // keeping its own email is fine
        let own = EmployeeChanges {
            name: "Bobby".to_string(),
            email: "bob@x.com".to_string(),
            mobile: bob.mobile,
            designation: bob.designation,
            gender: bob.gender,
            courses: bob.courses,
            image: None,
        };
        let updated = store.update("2", own).await.unwrap().unwrap();
        assert_eq!(updated.name, "Bobby");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[actix_web::test]
    async fn list_keeps_creation_order_and_filters() {
        let store = MemoryEmployeeStore::new();
        store.insert(new_employee("1", "Alice", "alice@x.com")).await.unwrap();
        store.insert(new_employee("2", "Bob", "bob@x.com")).await.unwrap();
        store.insert(new_employee("3", "Khalid", "khalid@x.com")).await.unwrap();

        let all: Vec<_> = store.list("").await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(all, vec!["1", "2", "3"]);

        let ali: Vec<_> = store.list("ALI").await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ali, vec!["1", "3"]);
    }

    #[actix_web::test]
    async fn delete_reports_missing_records() {
        let store = MemoryEmployeeStore::new();
        store.insert(new_employee("1", "Ali", "ali@x.com")).await.unwrap();

        assert!(!store.delete("nope").await.unwrap());
        assert!(store.delete("1").await.unwrap());
        assert!(store.find_by_id("1").await.unwrap().is_none());
    }
}
