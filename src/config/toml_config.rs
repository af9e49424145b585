use crate::domain::model::RecordErrorPolicy;
use crate::utils::error::{CertError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔格式，所有欄位皆為選填；未填的欄位沿用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub batch: Option<BatchSection>,
    pub signature: Option<SignatureSection>,
    pub qr: Option<QrSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSection {
    pub input_file: Option<String>,
    pub output_folder: Option<String>,
    pub on_error: Option<RecordErrorPolicy>,
    pub summary: Option<String>,
    pub monitor: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureSection {
    pub font: Option<String>,
    pub font_size: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QrSection {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CertError::ConfigError {
            message: format!("cannot read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
