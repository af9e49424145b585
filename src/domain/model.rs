use crate::utils::error::{CertError, Result};
use serde::{Deserialize, Serialize};

/// 表格中的單一儲存格，保留來源型別以便明確轉成字串
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(String),
    Error(String),
    Empty,
}

impl Cell {
    /// 依固定規則轉成字串；錯誤儲存格（例如 `#DIV/0!`）視為格式錯誤
    pub fn coerce(&self, position: usize, column: &str) -> Result<String> {
        match self {
            Cell::Int(v) => Ok(v.to_string()),
            Cell::Float(v) => Ok(format_float(*v)),
            Cell::Text(s) | Cell::DateTime(s) => Ok(s.clone()),
            Cell::Bool(b) => Ok(b.to_string()),
            Cell::Empty => Ok(String::new()),
            Cell::Error(e) => Err(CertError::MalformedRecord {
                position,
                message: format!("column '{}' holds an error cell ({})", column, e),
            }),
        }
    }
}

// 整數值的浮點數（Excel 常見）輸出成整數形式
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRecord {
    /// 1-based row position in the table (header excluded)
    pub position: usize,
    pub id_certificate: String,
    pub name: String,
    pub department: String,
}

/// What to do when a single record cannot be turned into an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenCertificate {
    pub position: usize,
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub position: usize,
    pub reason: String,
}

/// Two rows mapped to the same output file. `first_position` is the row that
/// first wrote it. With `case_only` the names differ only in letter case: they
/// are distinct files on case-sensitive filesystems and one file on macOS/Windows.
#[derive(Debug, Clone, Serialize)]
pub struct FilenameCollision {
    pub file: String,
    pub first_position: usize,
    pub overwritten_by: usize,
    pub case_only: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub written: Vec<WrittenCertificate>,
    pub skipped: Vec<SkippedRecord>,
    pub collisions: Vec<FilenameCollision>,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Number of distinct files left on disk by this run (case-sensitive filesystem).
    pub fn files_on_disk(&self) -> usize {
        let exact = self.collisions.iter().filter(|c| !c.case_only).count();
        self.written.len() - exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numeric_cells() {
        assert_eq!(Cell::Int(42).coerce(1, "id_certificate").unwrap(), "42");
        assert_eq!(Cell::Float(1234.0).coerce(1, "id_certificate").unwrap(), "1234");
        assert_eq!(Cell::Float(12.5).coerce(1, "id_certificate").unwrap(), "12.5");
        assert_eq!(Cell::Float(-3.0).coerce(1, "id_certificate").unwrap(), "-3");
    }

    #[test]
    fn test_coerce_text_bool_and_empty() {
        assert_eq!(
            Cell::Text("Ivan Petrov".to_string()).coerce(2, "name").unwrap(),
            "Ivan Petrov"
        );
        assert_eq!(Cell::Bool(true).coerce(2, "name").unwrap(), "true");
        assert_eq!(Cell::Empty.coerce(2, "department").unwrap(), "");
    }

    #[test]
    fn test_error_cell_is_malformed_record() {
        let err = Cell::Error("#DIV/0!".to_string())
            .coerce(7, "id_certificate")
            .unwrap_err();
        match err {
            CertError::MalformedRecord { position, message } => {
                assert_eq!(position, 7);
                assert!(message.contains("id_certificate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            on_error: RecordErrorPolicy,
        }
        let parsed: Wrapper = toml::from_str("on_error = \"skip\"").unwrap();
        assert_eq!(parsed.on_error, RecordErrorPolicy::Skip);
        assert_eq!(RecordErrorPolicy::default(), RecordErrorPolicy::Abort);
    }
}
