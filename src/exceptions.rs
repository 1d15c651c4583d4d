use crate::dates::DateNormalizer;
use crate::schema::ContactRecord;
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExceptionRow {
    pub name: String,
    pub licence: String,
    pub expected_renewal: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,
    pub missing_expected_date: bool,
    /// Expected renewal falls after the actual renewal. False when either date is missing.
    pub late_renewal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ExceptionSummary {
    pub total: usize,
    pub missing_expected_date: usize,
    pub late_renewal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ExceptionTable {
    pub rows: Vec<ExceptionRow>,
}

impl ExceptionTable {
    pub fn summary(&self) -> ExceptionSummary {
        ExceptionSummary {
            total: self.rows.len(),
            missing_expected_date: self.rows.iter().filter(|r| r.missing_expected_date).count(),
            late_renewal: self.rows.iter().filter(|r| r.late_renewal).count(),
        }
    }

    /// Rows carrying at least one flag.
    pub fn flagged(&self) -> impl Iterator<Item = &ExceptionRow> {
        self.rows
            .iter()
            .filter(|r| r.missing_expected_date || r.late_renewal)
    }
}

pub struct ExceptionDetector {
    normalizer: DateNormalizer,
}

impl ExceptionDetector {
    pub fn new(normalizer: DateNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn classify(&self, record: &ContactRecord) -> ExceptionRow {
        let expected_renewal = self.normalizer.normalize(&record.expected_renewal);
        let renewal_date = self.normalizer.normalize(&record.renewal_date);

        let late_renewal = match (expected_renewal, renewal_date) {
            (Some(expected), Some(actual)) => expected > actual,
            _ => false,
        };

        ExceptionRow {
            name: record.name.clone(),
            licence: record.licence.clone(),
            expected_renewal,
            renewal_date,
            missing_expected_date: expected_renewal.is_none(),
            late_renewal,
        }
    }

    /// One row per record, input order, nothing filtered.
    pub fn detect(&self, records: &[ContactRecord]) -> ExceptionTable {
        let table = ExceptionTable {
            rows: records.iter().map(|r| self.classify(r)).collect(),
        };

        let summary = table.summary();
        debug!(
            "Exceptions: {} records, {} missing expected date, {} late renewals",
            summary.total, summary.missing_expected_date, summary.late_renewal
        );

        table
    }
}
