pub mod cli;
pub mod toml_config;

use crate::core::qr::{DEFAULT_QR_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::core::signature::DEFAULT_FONT_SIZE;
use crate::core::table::SUPPORTED_EXTENSIONS;
use crate::core::ConfigProvider;
use crate::domain::model::RecordErrorPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_range, validate_url, Validate,
};
use serde::Serialize;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_INPUT_FILE: &str = "id_certificate.xlsx";
pub const DEFAULT_OUTPUT_FOLDER: &str = "certificates";
pub const DEFAULT_FONT_PATH: &str = "arial.ttf";

/// 最終生效的設定：命令列 > 設定檔 > 預設值
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub input_file: String,
    pub output_folder: String,
    pub font_path: String,
    pub font_size: f32,
    pub qr_endpoint: String,
    pub timeout_secs: u64,
    pub on_error: RecordErrorPolicy,
    pub monitor: bool,
    pub summary: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_file: DEFAULT_INPUT_FILE.to_string(),
            output_folder: DEFAULT_OUTPUT_FOLDER.to_string(),
            font_path: DEFAULT_FONT_PATH.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            qr_endpoint: DEFAULT_QR_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            on_error: RecordErrorPolicy::Abort,
            monitor: false,
            summary: None,
        }
    }
}

impl Settings {
    pub fn apply_toml(&mut self, config: &TomlConfig) {
        if let Some(batch) = &config.batch {
            if let Some(v) = &batch.input_file {
                self.input_file = v.clone();
            }
            if let Some(v) = &batch.output_folder {
                self.output_folder = v.clone();
            }
            if let Some(v) = batch.on_error {
                self.on_error = v;
            }
            if let Some(v) = batch.monitor {
                self.monitor = v;
            }
            if batch.summary.is_some() {
                self.summary = batch.summary.clone();
            }
        }
        if let Some(signature) = &config.signature {
            if let Some(v) = &signature.font {
                self.font_path = v.clone();
            }
            if let Some(v) = signature.font_size {
                self.font_size = v;
            }
        }
        if let Some(qr) = &config.qr {
            if let Some(v) = &qr.endpoint {
                self.qr_endpoint = v.clone();
            }
            if let Some(v) = qr.timeout_secs {
                self.timeout_secs = v;
            }
        }
    }
}

impl ConfigProvider for Settings {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_folder(&self) -> &str {
        &self.output_folder
    }

    fn font_path(&self) -> &str {
        &self.font_path
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }

    fn qr_endpoint(&self) -> &str {
        &self.qr_endpoint
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn on_error(&self) -> RecordErrorPolicy {
        self.on_error
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("input_file", &self.input_file)?;
        validate_file_extension("input_file", &self.input_file, &SUPPORTED_EXTENSIONS)?;
        validate_path("output_folder", &self.output_folder)?;
        validate_path("font", &self.font_path)?;
        validate_range("font_size", self.font_size, 4.0, 128.0)?;
        validate_url("qr_endpoint", &self.qr_endpoint)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 600)?;
        if let Some(summary) = &self.summary {
            validate_path("summary", summary)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "certificate-qr")]
#[command(about = "Certificate QR code generator")]
pub struct CliArgs {
    #[arg(
        long = "input_file",
        visible_alias = "input-file",
        help = "Certificate description file with columns: id_certificate, name, department [default: id_certificate.xlsx]"
    )]
    pub input_file: Option<String>,

    #[arg(
        long = "output_folder",
        visible_alias = "output-folder",
        help = "Folder to save generated certificates [default: certificates]"
    )]
    pub output_folder: Option<String>,

    #[arg(long, help = "TrueType font used for the name [default: arial.ttf]")]
    pub font: Option<String>,

    #[arg(long, help = "Font size in pixels [default: 13]")]
    pub font_size: Option<f32>,

    #[arg(long, help = "QR code generation endpoint")]
    pub qr_endpoint: Option<String>,

    #[arg(long, help = "Timeout for each QR request in seconds [default: 30]")]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_enum, help = "What to do when a record fails [default: abort]")]
    pub on_error: Option<RecordErrorPolicy>,

    #[arg(long, help = "Write a JSON run summary to this path")]
    pub summary: Option<String>,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    pub fn into_settings(self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            settings.apply_toml(&TomlConfig::from_file(path)?);
        }

        if let Some(v) = self.input_file {
            settings.input_file = v;
        }
        if let Some(v) = self.output_folder {
            settings.output_folder = v;
        }
        if let Some(v) = self.font {
            settings.font_path = v;
        }
        if let Some(v) = self.font_size {
            settings.font_size = v;
        }
        if let Some(v) = self.qr_endpoint {
            settings.qr_endpoint = v;
        }
        if let Some(v) = self.timeout_secs {
            settings.timeout_secs = v;
        }
        if let Some(v) = self.on_error {
            settings.on_error = v;
        }
        if self.summary.is_some() {
            settings.summary = self.summary;
        }
        if self.monitor {
            settings.monitor = true;
        }

        Ok(settings)
    }
}
