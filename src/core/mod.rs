pub mod batch;
pub mod compose;
pub mod engine;
pub mod qr;
pub mod sanitize;
pub mod signature;
pub mod table;

pub use crate::domain::model::{BatchReport, CertificateRecord};
pub use crate::domain::ports::{ConfigProvider, QrSource, SignatureRenderer, Storage};
pub use crate::utils::error::Result;
