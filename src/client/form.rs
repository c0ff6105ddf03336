use std::path::Path;

use super::ClientError;
use crate::models::employee::Employee;
use crate::utils::validation::{is_valid_email, ALLOWED_IMAGE_TYPES, MOBILE_MAX_LEN};

pub const DESIGNATIONS: [&str; 3] = ["HR", "Manager", "Sales"];
pub const GENDERS: [&str; 2] = ["M", "F"];
pub const COURSES: [&str; 3] = ["MCA", "BCA", "BSC"];

/// Field values as the admin typed them, before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub gender: String,
    pub courses: Vec<String>,
}

impl From<&Employee> for EmployeeDraft {
    fn from(employee: &Employee) -> Self {
        EmployeeDraft {
            name: employee.name.clone(),
            email: employee.email.clone(),
            mobile: employee.mobile.clone(),
            designation: employee.designation.clone(),
            gender: employee.gender.clone(),
            courses: employee.courses.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let mime = infer::get(&bytes)
            .map(|t| t.mime_type())
            .filter(|mime| ALLOWED_IMAGE_TYPES.contains(mime))
            .ok_or_else(|| ClientError::Invalid("Only .jpg or .png files are allowed.".to_string()))?;
        Ok(Self {
            file_name: file_name.into(),
            mime,
            bytes,
        })
    }

    pub async fn read(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self::from_bytes(file_name, bytes)
    }
}

impl EmployeeDraft {
    /// Same checks the server makes, plus the fixed option lists the server
    /// leaves open. Only for early feedback.
    pub fn validate(&self, image: Option<&ImageAttachment>, require_image: bool) -> Result<(), ClientError> {
        let invalid = |msg: &str| Err(ClientError::Invalid(msg.to_string()));

        let missing = [&self.name, &self.email, &self.mobile, &self.designation, &self.gender]
            .iter()
            .any(|v| v.trim().is_empty());
        if missing || (require_image && image.is_none()) {
            return invalid("All fields are required.");
        }
        if !is_valid_email(self.email.trim()) {
            return invalid("Invalid email format.");
        }
        if !self.mobile.bytes().all(|b| b.is_ascii_digit()) {
            return invalid("Mobile number must be numeric.");
        }
        if self.mobile.len() > MOBILE_MAX_LEN {
            return invalid("Mobile number cannot exceed 10 digits.");
        }
        if !DESIGNATIONS.contains(&self.designation.as_str()) {
            return Err(ClientError::Invalid(format!(
                "Designation must be one of {}.",
                DESIGNATIONS.join(", ")
            )));
        }
        if !GENDERS.contains(&self.gender.as_str()) {
            return invalid("Gender must be M or F.");
        }
        if let Some(course) = self.courses.iter().find(|c| !COURSES.contains(&c.as_str())) {
            return Err(ClientError::Invalid(format!(
                "Unknown course '{}', expected one of {}.",
                course,
                COURSES.join(", ")
            )));
        }
        Ok(())
    }
}

/// Client-side search over an already fetched list.
pub fn filter_by_name<'a>(employees: &'a [Employee], term: &str) -> Vec<&'a Employee> {
    let term = term.trim().to_lowercase();
    employees
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&term))
        .collect()
}
