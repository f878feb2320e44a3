use crate::config::credentials::Credentials;
use crate::domain::model::{GeneratedImage, ImageRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Synchronous key-value persistence. Each `set` replaces the whole value.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn image_count(&self) -> usize;
    fn max_prompt_length(&self) -> usize;
    fn storage_path(&self) -> &str;
    fn storage_key(&self) -> &str;
    fn keyword_seed(&self) -> Option<u64>;
}

/// Text-to-image backend. Returning fewer images than requested is allowed.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn generate_images(
        &self,
        request: &ImageRequest,
        credentials: &Credentials,
    ) -> Result<Vec<GeneratedImage>>;
}
