use crate::schema::CellValue;
use chrono::{Datelike, Days, NaiveDate};
use log::debug;

/// Years a `YYYY-MM` bucket label can represent.
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// Text formats tried after the ISO prefix check, month-first variant.
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Coerces free-form date cells into calendar dates.
///
/// `None` marks a value that could not be read as a date. It is never
/// substituted with a default date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    day_first: bool,
}

impl DateNormalizer {
    pub fn new(day_first: bool) -> Self {
        Self { day_first }
    }

    pub fn normalize(&self, value: &CellValue) -> Option<NaiveDate> {
        let parsed = match value {
            CellValue::Date(date) => Some(*date),
            CellValue::Number(serial) => from_excel_serial(*serial),
            CellValue::Text(text) => self.parse_text(text),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
        .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()));

        if parsed.is_none() && !value.is_empty() {
            debug!("Unparseable date value {:?}", value);
        }

        parsed
    }

    pub fn normalize_column(&self, values: &[CellValue]) -> Vec<Option<NaiveDate>> {
        values.iter().map(|v| self.normalize(v)).collect()
    }

    fn parse_text(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(date) = parse_iso_prefix(text) {
            return Some(date);
        }

        if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
            let year = text[..4].parse().ok()?;
            let month = text[4..6].parse().ok()?;
            let day = text[6..].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        let formats = if self.day_first {
            DAY_FIRST_FORMATS
        } else {
            MONTH_FIRST_FORMATS
        };

        formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    }
}

/// `YYYY-MM-DD` optionally followed by a time part (`T...` or ` ...`).
fn parse_iso_prefix(text: &str) -> Option<NaiveDate> {
    let date_part = text.get(..10)?;
    let rest = &text[10..];
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Converts an Excel serial day number (1900 date system) to a date.
///
/// Serial 60 is Excel's phantom 1900-02-29 and has no calendar date.
/// Any time-of-day fraction is discarded.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let days = serial.trunc() as u64;
    match days {
        60 => None,
        1..=59 => excel_epoch().checked_add_days(Days::new(days + 1)),
        _ => excel_epoch().checked_add_days(Days::new(days)),
    }
}

/// Inverse of [`from_excel_serial`].
pub fn to_excel_serial(date: NaiveDate) -> f64 {
    let days = (date - excel_epoch()).num_days();
    if days < 61 {
        (days - 1) as f64
    } else {
        days as f64
    }
}
