use crate::config::{ReportConfig, ReportVariant};
use crate::dates::DateNormalizer;
use crate::error::Result;
use crate::exceptions::{ExceptionDetector, ExceptionTable};
use crate::export::{Download, ExportSink, ReportTable};
use crate::ingestion::RawTable;
use crate::merge::{AttributeMerger, MergedReportTable};
use crate::pivot::{PivotBuilder, PivotTable};
use crate::schema::{BucketKey, CellValue, ContactRecord};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One bar of the revenue chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RevenuePoint {
    #[schemars(with = "String")]
    pub bucket: BucketKey,
    pub revenue: f64,
}

/// The revenue-by-month table, shaped by the report variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "variant", content = "table")]
pub enum RevenueTable {
    Basic(PivotTable),
    WithAttributes(MergedReportTable),
}

impl RevenueTable {
    pub fn buckets(&self) -> &[BucketKey] {
        match self {
            Self::Basic(pivot) => &pivot.buckets,
            Self::WithAttributes(merged) => &merged.buckets,
        }
    }

    pub fn row_values(&self) -> Vec<&[f64]> {
        match self {
            Self::Basic(pivot) => pivot.rows.iter().map(|r| r.values.as_slice()).collect(),
            Self::WithAttributes(merged) => {
                merged.rows.iter().map(|r| r.values.as_slice()).collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Basic(pivot) => pivot.rows.len(),
            Self::WithAttributes(merged) => merged.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportTable for RevenueTable {
    fn headers(&self) -> Vec<String> {
        match self {
            Self::Basic(pivot) => pivot.headers(),
            Self::WithAttributes(merged) => merged.headers(),
        }
    }

    fn cell_rows(&self) -> Vec<Vec<CellValue>> {
        match self {
            Self::Basic(pivot) => pivot.cell_rows(),
            Self::WithAttributes(merged) => merged.cell_rows(),
        }
    }
}

/// Total revenue per bucket across every row of the table.
///
/// Works from the typed bucket list, so descriptive columns never count.
pub fn revenue_series(table: &RevenueTable) -> Vec<RevenuePoint> {
    let buckets = table.buckets();
    let mut totals = vec![0.0; buckets.len()];

    for values in table.row_values() {
        for (total, value) in totals.iter_mut().zip(values) {
            *total += value;
        }
    }

    buckets
        .iter()
        .zip(totals)
        .map(|(bucket, revenue)| RevenuePoint {
            bucket: *bucket,
            revenue,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenewalsReport {
    pub variant: ReportVariant,
    pub revenue_table: RevenueTable,
    pub exceptions: ExceptionTable,
    pub series: Vec<RevenuePoint>,
}

impl RenewalsReport {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RenewalsReport)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Both tables as spreadsheets, named for download.
    pub fn downloads(&self, exporter: &dyn ExportSink) -> Result<Vec<Download>> {
        Ok(vec![
            Download {
                file_name: self.variant.revenue_file_name().to_string(),
                bytes: exporter.export(&self.revenue_table)?,
            },
            Download {
                file_name: self.variant.exceptions_file_name().to_string(),
                bytes: exporter.export(&self.exceptions)?,
            },
        ])
    }
}

/// Builds the revenue table, exception table and chart series from contact records.
pub struct ReportAssembler {
    variant: ReportVariant,
    normalizer: DateNormalizer,
}

impl ReportAssembler {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            variant: config.variant,
            normalizer: DateNormalizer::new(config.day_first),
        }
    }

    pub fn assemble(&self, records: &[ContactRecord]) -> RenewalsReport {
        info!(
            "Assembling {:?} renewals report from {} records",
            self.variant,
            records.len()
        );

        let pivot = PivotBuilder::new(self.normalizer).build(records);

        let revenue_table = match self.variant {
            ReportVariant::Basic => RevenueTable::Basic(pivot),
            ReportVariant::WithAttributes => {
                RevenueTable::WithAttributes(AttributeMerger::merge(&pivot, records))
            }
        };

        let exceptions = ExceptionDetector::new(self.normalizer).detect(records);
        let series = revenue_series(&revenue_table);

        debug!(
            "Report has {} revenue rows, {} buckets, {} exception rows",
            revenue_table.len(),
            series.len(),
            exceptions.rows.len()
        );

        RenewalsReport {
            variant: self.variant,
            revenue_table,
            exceptions,
            series,
        }
    }
}

pub fn generate_report(records: &[ContactRecord], config: &ReportConfig) -> Result<RenewalsReport> {
    config.validate()?;
    Ok(ReportAssembler::new(config).assemble(records))
}

/// Reads the configured sheet from `.xlsx` bytes and builds the report.
///
/// A missing sheet or required column fails before anything is built.
pub fn generate_report_from_xlsx(bytes: &[u8], config: &ReportConfig) -> Result<RenewalsReport> {
    config.validate()?;
    let table = RawTable::from_xlsx_bytes(bytes, &config.sheet_name)?;
    let records = table.contact_records(config.variant)?;
    Ok(ReportAssembler::new(config).assemble(&records))
}
