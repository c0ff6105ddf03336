use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::media::{ImageUpload, MediaUploader};
use crate::models::employee::{Employee, EmployeeChanges, NewEmployee};
use crate::store::EmployeeStore;
use crate::utils::validation::{
    dedup_courses, detect_image_type, parse_courses, validate_email_pattern, validate_mobile,
    validate_payload,
};

/// Form fields as submitted. Absent and blank values are both `None` after
/// [`EmployeeForm::normalized`].
#[derive(Debug, Default, Clone, Validate)]
pub struct EmployeeForm {
    pub name: Option<String>,
    #[validate(custom = "validate_email_pattern")]
    pub email: Option<String>,
    #[validate(custom = "validate_mobile")]
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    /// Raw course values. A single value is a JSON array, several values are
    /// one course each.
    pub courses: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EmployeeForm {
    pub fn normalized(self) -> Self {
        EmployeeForm {
            name: clean(self.name),
            email: clean(self.email).map(|e| e.to_lowercase()),
            mobile: clean(self.mobile),
            designation: clean(self.designation),
            gender: clean(self.gender),
            courses: self.courses,
        }
    }

    fn parsed_courses(&self) -> Result<Vec<String>, AppError> {
        match self.courses.as_slice() {
            [] => Ok(Vec::new()),
            [single] if single.trim().is_empty() => Ok(Vec::new()),
            [single] => parse_courses(single),
            many => Ok(dedup_courses(many.to_vec())),
        }
    }
}

pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    uploader: Arc<dyn MediaUploader>,
    max_image_bytes: usize,
}

impl EmployeeService {
    pub fn new(
        store: Arc<dyn EmployeeStore>,
        uploader: Arc<dyn MediaUploader>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            store,
            uploader,
            max_image_bytes,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    fn check_image(&self, file: ImageFile) -> Result<ImageUpload, AppError> {
        log::debug!(
            "Received image {} ({} bytes)",
            file.file_name.as_deref().unwrap_or("<unnamed>"),
            file.bytes.len()
        );
        if file.bytes.is_empty() {
            return Err(AppError::Validation("Image file is empty".to_string()));
        }
        if file.bytes.len() > self.max_image_bytes {
            return Err(AppError::Validation(format!(
                "Image exceeds the {} byte limit",
                self.max_image_bytes
            )));
        }
        let file_type = detect_image_type(&file.bytes)?;
        Ok(ImageUpload {
            bytes: file.bytes,
            content_type: file_type.mime_type(),
            extension: file_type.extension(),
        })
    }

    pub async fn create(&self, form: EmployeeForm, image: Option<ImageFile>) -> Result<Employee, AppError> {
        let form = form.normalized();
        let (Some(name), Some(email), Some(mobile), Some(designation), Some(gender), Some(image)) = (
            form.name.clone(),
            form.email.clone(),
            form.mobile.clone(),
            form.designation.clone(),
            form.gender.clone(),
            image,
        ) else {
            return Err(AppError::Validation("All fields are required.".to_string()));
        };
        validate_payload(&form)?;
        let courses = form.parsed_courses()?;
        let upload = self.check_image(image)?;

        // advisory; the store's unique index is what actually holds
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }

        let image = self.uploader.upload(upload).await?;
        let employee = self
            .store
            .insert(NewEmployee {
                id: Uuid::new_v4().to_string(),
                name,
                email,
                mobile,
                designation,
                gender,
                courses,
                image,
            })
            .await?;

        log::info!("Created employee {} <{}>", employee.id, employee.email);
        Ok(employee)
    }

    pub async fn list(&self, keyword: Option<&str>) -> Result<Vec<Employee>, AppError> {
        self.store.list(keyword.unwrap_or_default()).await
    }

    pub async fn get(&self, id: &str) -> Result<Employee, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        form: EmployeeForm,
        image: Option<ImageFile>,
    ) -> Result<Employee, AppError> {
        let form = form.normalized();
        let Some(name) = form.name.clone() else {
            return Err(AppError::Validation("f_Name is required".to_string()));
        };
        validate_payload(&form)?;
        let courses = form.parsed_courses()?;
        let upload = image.map(|file| self.check_image(file)).transpose()?;

        let current = self.get(id).await?;
        let image = match upload {
            Some(upload) => Some(self.uploader.upload(upload).await?),
            None => None,
        };

        let changes = EmployeeChanges {
            name,
            email: form.email.unwrap_or(current.email),
            mobile: form.mobile.unwrap_or(current.mobile),
            designation: form.designation.unwrap_or(current.designation),
            gender: form.gender.unwrap_or(current.gender),
            courses,
            image,
        };

        let employee = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

        log::info!("Updated employee {}", employee.id);
        Ok(employee)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Employee not found".to_string()));
        }
        log::info!("Deleted employee {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MemoryUploader;
    use crate::store::MemoryEmployeeStore;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0];

    fn service() -> (EmployeeService, Arc<MemoryUploader>) {
        let uploader = Arc::new(MemoryUploader::new("https://media.test"));
        let service = EmployeeService::new(
            Arc::new(MemoryEmployeeStore::new()),
            uploader.clone(),
            1024,
        );
        (service, uploader)
    }

    fn jane() -> EmployeeForm {
        EmployeeForm {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@x.com".to_string()),
            mobile: Some("9876543210".to_string()),
            designation: Some("HR".to_string()),
            gender: Some("F".to_string()),
            courses: vec![r#"["MCA"]"#.to_string()],
        }
    }

    fn png() -> Option<ImageFile> {
        Some(ImageFile {
            file_name: Some("jane.png".to_string()),
            bytes: PNG.to_vec(),
        })
    }

    #[actix_web::test]
    async fn create_then_fetch_returns_submitted_fields() {
        let (service, uploader) = service();
        let created = service.create(jane(), png()).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Jane Doe");
        assert_eq!(fetched.email, "jane@x.com");
        assert_eq!(fetched.mobile, "9876543210");
        assert_eq!(fetched.designation, "HR");
        assert_eq!(fetched.gender, "F");
        assert_eq!(fetched.courses, vec!["MCA"]);
        assert_eq!(fetched.image.content_type, "image/png");
        assert_eq!(uploader.get(&fetched.image.url).as_deref(), Some(PNG));
    }

    #[actix_web::test]
    async fn email_is_lowercased_and_duplicates_conflict() {
        let (service, uploader) = service();
        let mut first = jane();
        first.email = Some("  Jane@X.com ".to_string());
        let created = service.create(first, png()).await.unwrap();
        assert_eq!(created.email, "jane@x.com");

        let mut second = jane();
        second.name = Some("Jane Two".to_string());
        second.email = Some("JANE@x.COM".to_string());
        let err = service.create(second, png()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // nothing uploaded for the rejected request, first record untouched
        assert_eq!(uploader.upload_count(), 1);
        let all = service.list(None).await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[actix_web::test]
    async fn create_requires_every_field_and_an_image() {
        let (service, _) = service();

        let err = service.create(jane(), None).await.unwrap_err();
        assert_eq!(err.message(), "All fields are required.");

        let mut blank_name = jane();
        blank_name.name = Some("   ".to_string());
        let err = service.create(blank_name, png()).await.unwrap_err();
        assert_eq!(err.message(), "All fields are required.");
    }

    #[actix_web::test]
    async fn create_rejects_bad_email_mobile_and_image() {
        let (service, uploader) = service();

        let mut bad_email = jane();
        bad_email.email = Some("jane.x.com".to_string());
        let err = service.create(bad_email, png()).await.unwrap_err();
        assert_eq!(err.message(), "Invalid email format.");

        let mut bad_mobile = jane();
        bad_mobile.mobile = Some("98765abc".to_string());
        let err = service.create(bad_mobile, png()).await.unwrap_err();
        assert_eq!(err.message(), "Mobile number must be numeric.");

        let mut long_mobile = jane();
        long_mobile.mobile = Some("987654321012".to_string());
        assert!(matches!(
            service.create(long_mobile, png()).await,
            Err(AppError::Validation(_))
        ));

        let gif = ImageFile {
            file_name: None,
            bytes: b"GIF89a\x01\x00\x01\x00".to_vec(),
        };
        let err = service.create(jane(), Some(gif)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut bytes = PNG.to_vec();
        bytes.extend_from_slice(&[0u8; 2048]);
        let huge = ImageFile {
            file_name: None,
            bytes,
        };
        assert!(matches!(
            service.create(jane(), Some(huge)).await,
            Err(AppError::Validation(_))
        ));

        assert_eq!(uploader.upload_count(), 0);
    }

    #[actix_web::test]
    async fn courses_accept_json_or_repeated_values() {
        let (service, _) = service();

        let mut repeated = jane();
        repeated.courses = vec!["BCA".to_string(), "BSC".to_string()];
        let emp = service.create(repeated, png()).await.unwrap();
        assert_eq!(emp.courses, vec!["BCA", "BSC"]);

        let mut none = jane();
        none.email = Some("none@x.com".to_string());
        none.courses = vec![];
        let emp = service.create(none, png()).await.unwrap();
        assert!(emp.courses.is_empty());

        let mut broken = jane();
        broken.email = Some("broken@x.com".to_string());
        broken.courses = vec!["[MCA".to_string()];
        let err = service.create(broken, png()).await.unwrap_err();
        assert_eq!(err.message(), "Invalid format for f_Course");
    }

    #[actix_web::test]
    async fn list_filters_by_name_case_insensitively() {
        let (service, _) = service();
        for (name, email) in [("Alice", "a@x.com"), ("Bob", "b@x.com"), ("Khalid", "k@x.com")] {
            let mut form = jane();
            form.name = Some(name.to_string());
            form.email = Some(email.to_string());
            service.create(form, png()).await.unwrap();
        }

        assert_eq!(service.list(Some("")).await.unwrap().len(), 3);
        let names: Vec<_> = service
            .list(Some("ali"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Alice", "Khalid"]);
        assert!(service.list(Some("zed")).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn list_keyword_keeps_its_spaces() {
        let (service, _) = service();
        for (name, email) in [("Alice Brown", "a@x.com"), ("Mary Alison", "m@x.com")] {
            let mut form = jane();
            form.name = Some(name.to_string());
            form.email = Some(email.to_string());
            service.create(form, png()).await.unwrap();
        }

        let names: Vec<_> = service
            .list(Some(" ali"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Mary Alison"]);
        assert_eq!(service.list(Some("ali")).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn update_without_file_keeps_image_with_file_replaces_it() {
        let (service, _) = service();
        let created = service.create(jane(), png()).await.unwrap();

        let mut form = jane();
        form.name = Some("Jane Smith".to_string());
        form.designation = Some("Manager".to_string());
        form.courses = vec![r#"["BCA","BSC"]"#.to_string()];
        let updated = service.update(&created.id, form, None).await.unwrap();
        assert_eq!(updated.name, "Jane Smith");
        assert_eq!(updated.designation, "Manager");
        assert_eq!(updated.courses, vec!["BCA", "BSC"]);
        assert_eq!(updated.image, created.image);
        assert_eq!(updated.created_at, created.created_at);

        let jpeg = ImageFile {
            file_name: Some("new.jpg".to_string()),
            bytes: JPEG.to_vec(),
        };
        let replaced = service.update(&created.id, jane(), Some(jpeg)).await.unwrap();
        assert_ne!(replaced.image.url, created.image.url);
        assert_eq!(replaced.image.content_type, "image/jpeg");
    }

    #[actix_web::test]
    async fn update_keeps_absent_fields_and_clears_absent_courses() {
        let (service, _) = service();
        let created = service.create(jane(), png()).await.unwrap();

        let form = EmployeeForm {
            name: Some("Jane".to_string()),
            ..Default::default()
        };
        let updated = service.update(&created.id, form, None).await.unwrap();
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.mobile, created.mobile);
        assert_eq!(updated.gender, created.gender);
        assert!(updated.courses.is_empty());
    }

    #[actix_web::test]
    async fn update_errors() {
        let (service, uploader) = service();
        let created = service.create(jane(), png()).await.unwrap();

        let mut nameless = jane();
        nameless.name = None;
        let err = service.update(&created.id, nameless, None).await.unwrap_err();
        assert_eq!(err.message(), "f_Name is required");

        let mut bad_courses = jane();
        bad_courses.courses = vec!["MCA".to_string()];
        let err = service.update(&created.id, bad_courses, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.update("missing", jane(), png()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // lookup happens before the upload
        assert_eq!(uploader.upload_count(), 1);

        let mut other = jane();
        other.email = Some("other@x.com".to_string());
        let other = service.create(other, png()).await.unwrap();
        let err = service.update(&other.id, jane(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn delete_unknown_id_is_not_found_and_harmless() {
        let (service, _) = service();
        let created = service.create(jane(), png()).await.unwrap();

        let err = service.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.list(None).await.unwrap().len(), 1);

        service.delete(&created.id).await.unwrap();
        assert!(service.list(None).await.unwrap().is_empty());
        assert!(matches!(service.get(&created.id).await, Err(AppError::NotFound(_))));
    }
}
