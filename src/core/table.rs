use crate::domain::model::{Cell, CertificateRecord};
use crate::utils::error::{CertError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 3] = ["id_certificate", "name", "department"];
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(v) => Cell::Int(*v),
            Data::Float(v) => Cell::Float(*v),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Error(e) => Cell::Error(e.to_string()),
            Data::Empty => Cell::Empty,
            // Excel 以序號儲存日期，轉回日曆時間
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) if dt.is_datetime() => {
                    Cell::DateTime(value.format("%Y-%m-%d %H:%M:%S").to_string())
                }
                _ => Cell::DateTime(dt.to_string()),
            },
            other => Cell::DateTime(other.to_string()),
        }
    }
}

/// 載入後的輸入表格：標頭已定位，資料列依原始順序保存
#[derive(Debug, Clone)]
pub struct RecordTable {
    columns: [usize; 3],
    rows: Vec<Vec<Cell>>,
}

impl RecordTable {
    /// 依副檔名選擇讀取方式（試算表或 CSV），第一列為標頭
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CertError::ConfigError {
                message: format!("input file '{}' not found", path.display()),
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        tracing::debug!("Reading input table {} ({})", path.display(), extension);

        if extension == "csv" {
            Self::load_csv(path)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Self::load_spreadsheet(path)
        } else {
            Err(CertError::ConfigError {
                message: format!(
                    "unsupported input format '{}', expected one of: {}",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            })
        }
    }

    fn load_spreadsheet(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CertError::ConfigError {
                message: format!("workbook '{}' has no worksheets", path.display()),
            })??;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();
        let data: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Self::from_rows(header, data)
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut data: Vec<Vec<Cell>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            data.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Self::from_rows(header, data)
    }

    /// Locates the required columns in `header`; extra columns are ignored.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns = [0usize; 3];
        for (slot, required) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h.trim() == required)
                .ok_or_else(|| CertError::MissingColumnError {
                    column: required.to_string(),
                })?;
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extracts the record at `index` (0-based); short rows read as empty cells.
    pub fn record(&self, index: usize) -> Result<CertificateRecord> {
        let position = index + 1;
        let row = self.rows.get(index).ok_or_else(|| CertError::ProcessingError {
            message: format!("row {} is out of range ({} rows)", position, self.rows.len()),
        })?;

        let field = |slot: usize| -> Result<String> {
            row.get(self.columns[slot])
                .unwrap_or(&Cell::Empty)
                .coerce(position, REQUIRED_COLUMNS[slot])
        };

        Ok(CertificateRecord {
            position,
            id_certificate: field(0)?,
            name: field(1)?,
            department: field(2)?,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Result<CertificateRecord>> + '_ {
        (0..self.rows.len()).map(move |index| self.record(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_columns_located_in_any_order() {
        let table = RecordTable::from_rows(
            header(&["department", "extra", "name", "id_certificate"]),
            vec![vec![
                Cell::Text("QA".to_string()),
                Cell::Text("ignored".to_string()),
                Cell::Text("Jane".to_string()),
                Cell::Float(1001.0),
            ]],
        )
        .unwrap();

        let record = table.record(0).unwrap();
        assert_eq!(record.position, 1);
        assert_eq!(record.id_certificate, "1001");
        assert_eq!(record.name, "Jane");
        assert_eq!(record.department, "QA");
    }

    #[test]
    fn test_date_cells_use_calendar_form() {
        let midnight = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            Cell::from(&midnight).coerce(1, "name").unwrap(),
            "2024-01-01 00:00:00"
        );

        let noon = Data::DateTime(ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            Cell::from(&noon).coerce(1, "department").unwrap(),
            "2024-01-01 12:00:00"
        );

        let iso = Data::DateTimeIso("2024-01-01T08:30:00".to_string());
        assert_eq!(
            Cell::from(&iso).coerce(1, "id_certificate").unwrap(),
            "2024-01-01T08:30:00"
        );
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = RecordTable::from_rows(header(&["id_certificate", "name"]), vec![]).unwrap_err();
        match err {
            CertError::MissingColumnError { column } => assert_eq!(column, "department"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let table = RecordTable::from_rows(
            header(&["id_certificate", "name", "department"]),
            vec![vec![Cell::Int(7), Cell::Text("Solo".to_string())]],
        )
        .unwrap();

        let record = table.record(0).unwrap();
        assert_eq!(record.department, "");
    }

    #[test]
    fn test_error_cell_fails_only_its_row() {
        let table = RecordTable::from_rows(
            header(&["id_certificate", "name", "department"]),
            vec![
                vec![
                    Cell::Error("#REF!".to_string()),
                    Cell::Text("Broken".to_string()),
                    Cell::Text("Ops".to_string()),
                ],
                vec![
                    Cell::Int(2),
                    Cell::Text("Fine".to_string()),
                    Cell::Text("Ops".to_string()),
                ],
            ],
        )
        .unwrap();

        let records: Vec<_> = table.records().collect();
        assert!(matches!(
            records[0],
            Err(CertError::MalformedRecord { position: 1, .. })
        ));
        assert_eq!(records[1].as_ref().unwrap().name, "Fine");
    }

    #[test]
    fn test_load_csv_preserves_row_order() {
        let file = csv_file(
            "id_certificate,name,department,notes\n\
             A-1,Alice,Sales,x\n\
             A-2,Bob,,y\n\
             A-3,Carol,R&D,z\n",
        );

        let table = RecordTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 3);

        let names: Vec<String> = table.records().map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(table.record(1).unwrap().department, "");
    }

    #[test]
    fn test_load_csv_header_only_is_empty() {
        let file = csv_file("id_certificate,name,department\n");
        let table = RecordTable::load(file.path()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = RecordTable::load("/no/such/id_certificate.xlsx").unwrap_err();
        assert!(matches!(err, CertError::ConfigError { .. }));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"id_certificate,name,department\n").unwrap();

        let err = RecordTable::load(file.path()).unwrap_err();
        assert!(matches!(err, CertError::ConfigError { .. }));
    }

    #[test]
    fn test_load_corrupt_spreadsheet() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a zip archive").unwrap();

        let err = RecordTable::load(file.path()).unwrap_err();
        assert!(matches!(err, CertError::SpreadsheetError(_)));
    }
}
