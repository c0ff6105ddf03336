use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{ImageUpload, MediaUploader};
use crate::errors::AppError;
use crate::models::employee::EmployeeImage;

/// Keeps uploads in memory and hands out URLs under `base_url`.
pub struct MemoryUploader {
    base_url: String,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryUploader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().map(|u| u.len()).unwrap_or_default()
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.uploads
            .lock()
            .ok()?
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl MediaUploader for MemoryUploader {
    async fn upload(&self, image: ImageUpload) -> Result<EmployeeImage, AppError> {
        let url = format!("{}/{}.{}", self.base_url, Uuid::new_v4(), image.extension);
        self.uploads
            .lock()
            .map_err(|_| AppError::UploadError("uploader lock poisoned".to_string()))?
            .push((url.clone(), image.bytes));
        Ok(EmployeeImage {
            url,
            content_type: image.content_type.to_string(),
        })
    }
}
