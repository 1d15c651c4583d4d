use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenewalsReportError {
    #[error("Schema error in sheet '{sheet}': missing required column(s) {}", .missing.join(", "))]
    Schema { sheet: String, missing: Vec<String> },

    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Spreadsheet export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RenewalsReportError {
    /// True when the input was structurally unusable, as opposed to merely empty.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::SheetNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, RenewalsReportError>;
