use crate::config::ReportVariant;
use crate::dates::from_excel_serial;
use crate::error::{RenewalsReportError, Result};
use crate::schema::{self, CellValue, ContactRecord};
use calamine::{Data, Reader, Xlsx};
use log::{debug, info};
use std::io::Cursor;

/// Header row plus data rows of one worksheet, cells kept as read.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(sheet_name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    /// Reads `sheet_name` from an `.xlsx` byte stream. The first row is the header.
    pub fn from_xlsx_bytes(bytes: &[u8], sheet_name: &str) -> Result<Self> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| RenewalsReportError::Workbook(e.to_string()))?;

        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(RenewalsReportError::SheetNotFound(sheet_name.to_string()));
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| RenewalsReportError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|c| cell_from_data(c).as_text()).collect())
            .unwrap_or_default();

        let rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        debug!(
            "Read sheet '{}': {} columns, {} data rows",
            sheet_name,
            headers.len(),
            rows.len()
        );

        Ok(Self::new(sheet_name, headers, rows))
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == column)
    }

    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    /// Extracts the consumed columns. Fails as a whole if any required column is absent.
    pub fn contact_records(&self, variant: ReportVariant) -> Result<Vec<ContactRecord>> {
        let missing = self.missing_columns(variant.required_columns());
        if !missing.is_empty() {
            return Err(RenewalsReportError::Schema {
                sheet: self.sheet_name.clone(),
                missing,
            });
        }

        let index = |column: &str| self.column_index(column);
        let columns = ColumnMap {
            name: index(schema::NAME),
            licence: index(schema::LICENCE),
            expected_renewal: index(schema::EXPECTED_RENEWAL),
            expected_revenue: index(schema::EXPECTED_REVENUE),
            renewal_date: index(schema::RENEWAL_DATE),
            licence_change: index(schema::LICENCE_CHANGE).filter(|_| variant == ReportVariant::WithAttributes),
            renewal_status: index(schema::RENEWAL_STATUS).filter(|_| variant == ReportVariant::WithAttributes),
            updated: index(schema::UPDATED).filter(|_| variant == ReportVariant::WithAttributes),
        };

        // Interior blank rows stay; they surface as missing-date exceptions.
        let used = self
            .rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1);
        let trailing = self.rows.len() - used;

        let mut records = Vec::with_capacity(used);

        for row in &self.rows[..used] {
            let cell = |col: Option<usize>| {
                col.and_then(|c| row.get(c))
                    .cloned()
                    .unwrap_or(CellValue::Empty)
            };

            let record = ContactRecord {
                name: cell(columns.name).as_text(),
                licence: cell(columns.licence).as_text(),
                expected_renewal: cell(columns.expected_renewal),
                expected_revenue: cell(columns.expected_revenue).as_f64(),
                renewal_date: cell(columns.renewal_date),
                licence_change: cell(columns.licence_change),
                renewal_status: cell(columns.renewal_status),
                updated: cell(columns.updated),
            };

            records.push(record);
        }

        info!(
            "Extracted {} contact records from sheet '{}' ({} trailing blank rows trimmed)",
            records.len(),
            self.sheet_name,
            trailing
        );

        Ok(records)
    }
}

struct ColumnMap {
    name: Option<usize>,
    licence: Option<usize>,
    expected_renewal: Option<usize>,
    expected_revenue: Option<usize>,
    renewal_date: Option<usize>,
    licence_change: Option<usize>,
    renewal_status: Option<usize>,
    updated: Option<usize>,
}

pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            from_excel_serial(serial)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
