pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use config::{cli::LocalStorage, Settings};
pub use core::{batch::BatchDriver, engine::CertificateEngine};
pub use domain::model::{BatchReport, RecordErrorPolicy};
pub use utils::error::{CertError, Result};
