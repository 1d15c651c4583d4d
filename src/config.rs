use crate::error::{RenewalsReportError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Excel refuses sheet names longer than this.
const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ReportVariant {
    #[schemars(description = "Pivot on Name/Licence only, without the auxiliary contact attributes.")]
    Basic,

    #[schemars(
        description = "Pivot plus LicenceChange, RenewalStatus and Updated merged in per contact name."
    )]
    #[default]
    WithAttributes,
}

impl ReportVariant {
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Basic => &crate::schema::BASIC_COLUMNS,
            Self::WithAttributes => &crate::schema::ATTRIBUTE_COLUMNS,
        }
    }

    /// Download filename for the revenue table.
    pub fn revenue_file_name(&self) -> &'static str {
        match self {
            Self::Basic => "pivot_table.xlsx",
            Self::WithAttributes => "relevant_data.xlsx",
        }
    }

    pub fn exceptions_file_name(&self) -> &'static str {
        "exceptions.xlsx"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    #[schemars(description = "Which pipeline variant to run")]
    pub variant: ReportVariant,

    #[schemars(description = "Name of the worksheet holding the contact records")]
    pub sheet_name: String,

    #[schemars(description = "Name given to the single worksheet of every exported file")]
    pub export_sheet_name: String,

    #[schemars(
        description = "Read ambiguous slash dates such as 03/04/2024 as day/month instead of month/day"
    )]
    pub day_first: bool,

    #[schemars(description = "Write the row index as the first column of exported files")]
    pub include_index: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            variant: ReportVariant::default(),
            sheet_name: "contacts".to_string(),
            export_sheet_name: "Sheet1".to_string(),
            day_first: false,
            include_index: true,
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sheet_name.trim().is_empty() {
            return Err(RenewalsReportError::InvalidConfig(
                "sheet_name must not be empty".to_string(),
            ));
        }

        let export = &self.export_sheet_name;
        if export.trim().is_empty() || export.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(RenewalsReportError::InvalidConfig(format!(
                "export_sheet_name '{}' must be 1 to {} characters",
                export, MAX_SHEET_NAME_LEN
            )));
        }

        if let Some(c) = export.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(RenewalsReportError::InvalidConfig(format!(
                "export_sheet_name '{}' contains forbidden character '{}'",
                export, c
            )));
        }

        Ok(())
    }
}
