pub mod memory;
pub mod s3;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::employee::EmployeeImage;

pub use memory::MemoryUploader;
pub use s3::S3Uploader;

/// An image that already passed type and size checks.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Turns raw image bytes into a durable public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<EmployeeImage, AppError>;
}
