use crate::domain::model::RecordErrorPolicy;
use crate::utils::error::Result;
use async_trait::async_trait;
use image::{DynamicImage, RgbImage};

pub trait Storage: Send + Sync {
    /// Make sure the output root exists (recursively, no error if present).
    fn ensure_root(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_folder(&self) -> &str;
    fn font_path(&self) -> &str;
    fn font_size(&self) -> f32;
    fn qr_endpoint(&self) -> &str;
    fn timeout_secs(&self) -> u64;
    fn on_error(&self) -> RecordErrorPolicy;
}

/// Source of QR code images for a certificate identifier.
#[async_trait]
pub trait QrSource: Send + Sync {
    async fn fetch(&self, id_certificate: &str) -> Result<DynamicImage>;
}

/// Renders a display name into a signature raster.
pub trait SignatureRenderer: Send + Sync {
    fn render(&self, name: &str) -> RgbImage;
}
