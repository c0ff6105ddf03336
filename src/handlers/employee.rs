use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::AdminClaims;
use crate::services::employee::{EmployeeForm, EmployeeService, ImageFile};

const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

#[derive(Deserialize)]
pub struct EmployeeQueryParams {
    search: Option<String>,
}

fn map_multipart_error(err: actix_multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", err))
}

/// Reads the multipart body into form fields and the optional image.
/// Both the `f_`-prefixed names and plain names are accepted.
async fn read_employee_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<(EmployeeForm, Option<ImageFile>), AppError> {
    let mut form = EmployeeForm::default();
    let mut image = None;

    while let Some(mut field) = payload.try_next().await.map_err(map_multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(str::to_string);
        let is_image = matches!(name.as_str(), "f_Image" | "image");
        let limit = if is_image { max_image_bytes } else { MAX_TEXT_FIELD_BYTES };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::Validation(format!("Field '{}' is too large", name)));
            }
            bytes.extend_from_slice(&chunk);
        }

        if is_image {
            // browsers send an empty part when no file was picked
            if !bytes.is_empty() {
                image = Some(ImageFile { file_name, bytes });
            }
            continue;
        }

        let value = String::from_utf8(bytes)
            .map_err(|_| AppError::Validation(format!("Field '{}' is not valid UTF-8", name)))?;
        match name.as_str() {
            "f_Name" | "name" => form.name = Some(value),
            "f_Email" | "email" => form.email = Some(value),
            "f_Mobile" | "mobile" => form.mobile = Some(value),
            "f_Designation" | "designation" => form.designation = Some(value),
            "f_gender" | "gender" => form.gender = Some(value),
            "f_Course" | "f_Course[]" | "courses" => form.courses.push(value),
            other => log::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok((form, image))
}

pub async fn create_employee(
    _admin: AdminClaims,
    service: web::Data<EmployeeService>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (form, image) = read_employee_form(payload, service.max_image_bytes()).await?;
    let employee = service.create(form, image).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Employee created successfully",
        "employee": employee,
    })))
}

pub async fn get_employees(
    _admin: AdminClaims,
    service: web::Data<EmployeeService>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let employees = service.list(query.search.as_deref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employees": employees,
    })))
}

pub async fn get_employee(
    _admin: AdminClaims,
    service: web::Data<EmployeeService>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee = service.get(&employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employee": employee,
    })))
}

pub async fn update_employee(
    _admin: AdminClaims,
    service: web::Data<EmployeeService>,
    employee_id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (form, image) = read_employee_form(payload, service.max_image_bytes()).await?;
    let employee = service.update(&employee_id, form, image).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "employee": employee,
    })))
}

pub async fn delete_employee(
    _admin: AdminClaims,
    service: web::Data<EmployeeService>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Deleted successfully",
    })))
}
