use crate::config::ReportConfig;
use crate::dates::to_excel_serial;
use crate::error::Result;
use crate::exceptions::ExceptionTable;
use crate::merge::MergedReportTable;
use crate::pivot::PivotTable;
use crate::schema::{self, CellValue};
use log::debug;
use rust_xlsxwriter::{Format, Workbook};

/// A derived table flattened into a header row and cell rows.
pub trait ReportTable {
    fn headers(&self) -> Vec<String>;
    fn cell_rows(&self) -> Vec<Vec<CellValue>>;
}

impl ReportTable for PivotTable {
    fn headers(&self) -> Vec<String> {
        [schema::NAME, schema::LICENCE]
            .iter()
            .map(|h| h.to_string())
            .chain(self.buckets.iter().map(|b| b.to_string()))
            .collect()
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                [
                    CellValue::from(row.name.as_str()),
                    CellValue::from(row.licence.as_str()),
                ]
                .into_iter()
                .chain(row.values.iter().map(|v| CellValue::Number(*v)))
                .collect()
            })
            .collect()
    }
}

impl ReportTable for MergedReportTable {
    fn headers(&self) -> Vec<String> {
        [
            schema::NAME,
            schema::LICENCE_CHANGE,
            schema::RENEWAL_STATUS,
            schema::UPDATED,
            schema::LICENCE,
        ]
        .iter()
        .map(|h| h.to_string())
        .chain(self.buckets.iter().map(|b| b.to_string()))
        .collect()
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                let attrs = row.attributes.clone().unwrap_or_default();
                [
                    CellValue::from(row.name.as_str()),
                    attrs.licence_change,
                    attrs.renewal_status,
                    attrs.updated,
                    CellValue::from(row.licence.as_str()),
                ]
                .into_iter()
                .chain(row.values.iter().map(|v| CellValue::Number(*v)))
                .collect()
            })
            .collect()
    }
}

impl ReportTable for ExceptionTable {
    fn headers(&self) -> Vec<String> {
        [
            schema::NAME,
            schema::LICENCE,
            schema::EXPECTED_RENEWAL,
            schema::RENEWAL_DATE,
            schema::MISSING_EXPECTED_DATE,
            schema::LATE_RENEWAL,
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        let date = |d: Option<chrono::NaiveDate>| d.map(CellValue::Date).unwrap_or_default();

        self.rows
            .iter()
            .map(|row| {
                vec![
                    CellValue::from(row.name.as_str()),
                    CellValue::from(row.licence.as_str()),
                    date(row.expected_renewal),
                    date(row.renewal_date),
                    CellValue::Bool(row.missing_expected_date),
                    CellValue::Bool(row.late_renewal),
                ]
            })
            .collect()
    }
}

/// Turns a derived table into a downloadable spreadsheet.
pub trait ExportSink {
    fn export(&self, table: &dyn ReportTable) -> Result<Vec<u8>>;
}

/// Single-sheet `.xlsx` writer; optionally prefixes the 0-based row index.
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    pub sheet_name: String,
    pub include_index: bool,
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl XlsxExporter {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            sheet_name: config.export_sheet_name.clone(),
            include_index: config.include_index,
        }
    }
}

impl ExportSink for XlsxExporter {
    fn export(&self, table: &dyn ReportTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;

        let offset: u16 = if self.include_index { 1 } else { 0 };

        for (col, header) in table.headers().iter().enumerate() {
            sheet.write_string_with_format(0, col as u16 + offset, header, &header_format)?;
        }

        let rows = table.cell_rows();
        for (idx, cells) in rows.iter().enumerate() {
            let row = idx as u32 + 1;

            if self.include_index {
                sheet.write_number_with_format(row, 0, idx as f64, &header_format)?;
            }

            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16 + offset;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(s) => {
                        sheet.write_string(row, col, s)?;
                    }
                    CellValue::Number(n) => {
                        sheet.write_number(row, col, *n)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(row, col, *b)?;
                    }
                    CellValue::Date(d) => {
                        sheet.write_number_with_format(row, col, to_excel_serial(*d), &date_format)?;
                    }
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;

        debug!(
            "Exported {} rows to sheet '{}' ({} bytes)",
            rows.len(),
            self.sheet_name,
            buffer.len()
        );

        Ok(buffer)
    }
}

/// A named spreadsheet ready to be offered for download.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
