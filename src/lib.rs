//! # Renewals Report
//!
//! A library for turning a spreadsheet of licence-renewal contact records into
//! a revenue-by-month pivot and a data-quality exception report.
//!
//! ## Core Concepts
//!
//! - **Bucket**: a year-month (`2024-03`) that expected revenue is summed into
//! - **Revenue table**: one row per (Name, Licence), one column per bucket, optionally
//!   enriched with the contact's `LicenceChange` / `RenewalStatus` / `Updated` attributes
//! - **Exceptions**: every record, flagged when its expected renewal date is missing or
//!   falls after the actual renewal date
//! - **Series**: total revenue per bucket, for a bar chart
//!
//! Each call is a pure function of the uploaded bytes; nothing is cached between calls.
//!
//! ## Example
//!
//! ```rust,ignore
//! use renewals_report::*;
//!
//! let bytes = std::fs::read("renewals.xlsx")?;
//! let config = ReportConfig::default();
//!
//! let report = generate_report_from_xlsx(&bytes, &config)?;
//!
//! for point in &report.series {
//!     println!("{}: {:.2}", point.bucket, point.revenue);
//! }
//!
//! for download in report.downloads(&XlsxExporter::from_config(&config))? {
//!     std::fs::write(&download.file_name, &download.bytes)?;
//! }
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod exceptions;
pub mod export;
pub mod ingestion;
pub mod merge;
pub mod pivot;
pub mod render;
pub mod report;
pub mod schema;

pub use config::{ReportConfig, ReportVariant};
pub use dates::{from_excel_serial, to_excel_serial, DateNormalizer};
pub use error::{RenewalsReportError, Result};
pub use exceptions::{ExceptionDetector, ExceptionRow, ExceptionSummary, ExceptionTable};
pub use export::{Download, ExportSink, ReportTable, XlsxExporter};
pub use ingestion::RawTable;
pub use merge::{deduplicate_attributes, AttributeMerger, MergedReportRow, MergedReportTable};
pub use pivot::{PivotBuilder, PivotRow, PivotTable};
pub use render::{JsonRenderSink, RenderSink};
pub use report::{
    generate_report, generate_report_from_xlsx, revenue_series, RenewalsReport, ReportAssembler,
    RevenuePoint, RevenueTable,
};
pub use schema::{AttributeTuple, BucketKey, CellValue, ContactRecord};
