use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NAME: &str = "Name";
pub const LICENCE: &str = "Licence";
pub const EXPECTED_RENEWAL: &str = "Expected_Renewal";
pub const EXPECTED_REVENUE: &str = "Expected_Revenue";
pub const RENEWAL_DATE: &str = "renewal_date";
pub const LICENCE_CHANGE: &str = "LicenceChange";
pub const RENEWAL_STATUS: &str = "RenewalStatus";
pub const UPDATED: &str = "Updated";

pub const MISSING_EXPECTED_DATE: &str = "MissingExpectedDate";
pub const LATE_RENEWAL: &str = "LateRenewal";

pub const BASIC_COLUMNS: [&str; 5] = [
    NAME,
    LICENCE,
    EXPECTED_RENEWAL,
    EXPECTED_REVENUE,
    RENEWAL_DATE,
];

pub const ATTRIBUTE_COLUMNS: [&str; 8] = [
    NAME,
    LICENCE,
    EXPECTED_RENEWAL,
    EXPECTED_REVENUE,
    RENEWAL_DATE,
    LICENCE_CHANGE,
    RENEWAL_STATUS,
    UPDATED,
];

/// A single spreadsheet cell as read from the uploaded workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell; text is accepted when it parses cleanly.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Text reading of the cell, as used for the Name and Licence keys.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One row of the contacts sheet, restricted to the columns the report consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContactRecord {
    pub name: String,
    pub licence: String,
    /// Raw value; see [`crate::dates::DateNormalizer`].
    pub expected_renewal: CellValue,
    pub expected_revenue: Option<f64>,
    pub renewal_date: CellValue,
    pub licence_change: CellValue,
    pub renewal_status: CellValue,
    pub updated: CellValue,
}

impl ContactRecord {
    pub fn attributes(&self) -> AttributeTuple {
        AttributeTuple {
            licence_change: self.licence_change.clone(),
            renewal_status: self.renewal_status.clone(),
            updated: self.updated.clone(),
        }
    }
}

/// Per-contact auxiliary attributes merged onto the pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct AttributeTuple {
    pub licence_change: CellValue,
    pub renewal_status: CellValue,
    pub updated: CellValue,
}

/// Year-month revenue bucket. Orders chronologically; displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BucketKey {
    year: i32,
    month: u32,
}

impl BucketKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Recognises a column label shaped `NNNN-NN` (four digits, hyphen, two digits).
    pub fn parse(label: &str) -> Option<Self> {
        let bytes = label.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return None;
        }
        if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
            return None;
        }
        let year = label[..4].parse().ok()?;
        let month = label[5..].parse().ok()?;
        Self::new(year, month)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid bucket key '{}'. Expected YYYY-MM", s))
    }
}

impl From<BucketKey> for String {
    fn from(key: BucketKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for BucketKey {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}
