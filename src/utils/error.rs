use thiserror::Error;

/// QR 端點請求失敗的分類
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("network failure: {0}")]
    Network(String),

    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("response body is not a valid image: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum CertError {
    #[error("QR fetch failed for '{id}': {source}")]
    Fetch {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Font error: {message}")]
    FontError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input table is missing required column '{column}'")]
    MissingColumnError { column: String },

    #[error("Malformed record at row {position}: {message}")]
    MalformedRecord { position: usize, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Filesystem,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CertError::Fetch { .. } | CertError::HttpClientError(_) => ErrorCategory::Network,
            CertError::FontError { .. }
            | CertError::ConfigError { .. }
            | CertError::InvalidConfigValueError { .. }
            | CertError::TomlError(_) => ErrorCategory::Configuration,
            CertError::CsvError(_)
            | CertError::SpreadsheetError(_)
            | CertError::MissingColumnError { .. }
            | CertError::MalformedRecord { .. } => ErrorCategory::Input,
            CertError::IoError(_) => ErrorCategory::Filesystem,
            CertError::ImageError(_)
            | CertError::SerializationError(_)
            | CertError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Input => match self {
                CertError::MalformedRecord { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Critical,
            },
            ErrorCategory::Filesystem => ErrorSeverity::Medium,
            ErrorCategory::Network | ErrorCategory::Processing => ErrorSeverity::High,
        }
    }

    /// 是否為單筆記錄層級的錯誤（可依策略略過）
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            CertError::Fetch { .. } | CertError::MalformedRecord { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CertError::Fetch { source, .. } => match source {
                FetchError::Timeout { .. } => {
                    "Check connectivity to the QR endpoint or raise --timeout-secs"
                }
                FetchError::Status { .. } | FetchError::Decode(_) => {
                    "Verify --qr-endpoint points to a service that returns PNG images"
                }
                FetchError::Network(_) => "Check network access to the QR endpoint",
            },
            CertError::HttpClientError(_) => "Check TLS and proxy settings of this machine",
            CertError::FontError { .. } => "Pass a valid TrueType font with --font",
            CertError::MissingColumnError { .. } => {
                "The first row must contain the headers: id_certificate, name, department"
            }
            CertError::MalformedRecord { .. } => {
                "Fix the offending row or rerun with --on-error skip"
            }
            CertError::CsvError(_) | CertError::SpreadsheetError(_) => {
                "Make sure --input_file exists and is a readable .xlsx/.xls/.ods/.csv file"
            }
            CertError::IoError(_) => "Check that the output folder is writable",
            CertError::ConfigError { .. }
            | CertError::InvalidConfigValueError { .. }
            | CertError::TomlError(_) => "Review the command line flags and the config file",
            CertError::ImageError(_)
            | CertError::SerializationError(_)
            | CertError::ProcessingError { .. } => "Rerun with --verbose to inspect the failing step",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the input table: {}", self),
            ErrorCategory::Network => format!("Could not fetch a QR code: {}", self),
            ErrorCategory::Filesystem => format!("Could not write output: {}", self),
            ErrorCategory::Processing => format!("Image generation failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertError>;
