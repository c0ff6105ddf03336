use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

pub const MOBILE_MAX_LEN: usize = 10;
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(first_message)
}

/// Collapses validator output into the single message the API reports.
fn first_message(err: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = err.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    let message = fields
        .iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .next()
        .map(|(field, e)| match &e.message {
            Some(msg) => msg.to_string(),
            None => format!("{} is invalid ({})", field, e.code),
        })
        .unwrap_or_else(|| "Invalid input.".to_string());
    AppError::Validation(message)
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let domain: Vec<char> = domain.chars().collect();
    if local.is_empty() || domain.len() < 3 {
        return false;
    }
    domain[1..domain.len() - 1].contains(&'.')
}

pub fn validate_email_pattern(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format.".into());
        Err(err)
    }
}

pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.is_empty() || !mobile.bytes().all(|b| b.is_ascii_digit()) {
        let mut err = ValidationError::new("mobile");
        err.message = Some("Mobile number must be numeric.".into());
        return Err(err);
    }
    if mobile.len() > MOBILE_MAX_LEN {
        let mut err = ValidationError::new("mobile_length");
        err.message = Some("Mobile number cannot exceed 10 digits.".into());
        return Err(err);
    }
    Ok(())
}

/// Courses arrive as a JSON array encoded into a form field.
pub fn parse_courses(raw: &str) -> Result<Vec<String>, AppError> {
    let courses: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("Invalid format for f_Course".to_string()))?;
    Ok(dedup_courses(courses))
}

pub fn dedup_courses(courses: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(courses.len());
    for course in courses {
        let course = course.trim().to_string();
        if !course.is_empty() && !seen.contains(&course) {
            seen.push(course);
        }
    }
    seen
}

/// Sniffs the image type from its bytes; the declared type is not trusted.
pub fn detect_image_type(bytes: &[u8]) -> Result<infer::Type, AppError> {
    let file_type =
        infer::get(bytes).ok_or_else(|| AppError::Validation("Invalid file type".to_string()))?;
    if !ALLOWED_IMAGE_TYPES.contains(&file_type.mime_type()) {
        return Err(AppError::Validation(
            "Only JPEG and PNG files are allowed".to_string(),
        ));
    }
    Ok(file_type)
}
