use async_trait::async_trait;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;
use uuid::Uuid;

use super::{ImageUpload, MediaUploader};
use crate::config::MediaConfig;
use crate::errors::AppError;
use crate::models::employee::EmployeeImage;

pub async fn create_s3_client(region: Option<String>) -> S3Client {
    let aws_config = ConfigLoader::default()
        .region(region.map(Region::new))
        .behavior_version(BehaviorVersion::latest())
        .load()
        .await;

    S3Client::new(&aws_config)
}

pub struct S3Uploader {
    client: S3Client,
    bucket: String,
    public_base_url: String,
    key_prefix: String,
}

impl S3Uploader {
    pub fn new(client: S3Client, config: &MediaConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
        }
    }

    pub async fn from_config(config: &MediaConfig) -> Self {
        let client = create_s3_client(config.region.clone()).await;
        Self::new(client, config)
    }

    fn object_key(&self, extension: &str) -> String {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        if self.key_prefix.is_empty() {
            file_name
        } else {
            format!("{}/{}", self.key_prefix, file_name)
        }
    }
}

#[async_trait]
impl MediaUploader for S3Uploader {
    async fn upload(&self, image: ImageUpload) -> Result<EmployeeImage, AppError> {
        let key = self.object_key(image.extension);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(image.content_type)
            .body(ByteStream::from(image.bytes))
            .send()
            .await
            .map_err(|err| AppError::UploadError(format!("put_object {}: {}", key, err)))?;

        log::debug!("Uploaded image to s3://{}/{}", self.bucket, key);

        Ok(EmployeeImage {
            url: format!("{}/{}", self.public_base_url, key),
            content_type: image.content_type.to_string(),
        })
    }
}
