use crate::pivot::PivotTable;
use crate::schema::{AttributeTuple, BucketKey, ContactRecord};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MergedReportRow {
    pub name: String,
    /// `None` only when the name had no attribute row at all.
    pub attributes: Option<AttributeTuple>,
    pub licence: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct MergedReportTable {
    #[schemars(with = "Vec<String>")]
    pub buckets: Vec<BucketKey>,
    pub rows: Vec<MergedReportRow>,
    /// Names with more than one distinct attribute tuple. Their pivot rows
    /// appear once per tuple.
    pub fanned_out_names: Vec<String>,
}

impl MergedReportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Distinct attribute tuples per name, in first-seen order.
pub fn deduplicate_attributes(records: &[ContactRecord]) -> Vec<(String, AttributeTuple)> {
    let mut seen: HashMap<&str, Vec<AttributeTuple>> = HashMap::new();
    let mut distinct = Vec::new();

    for record in records {
        let tuple = record.attributes();
        let known = seen.entry(record.name.as_str()).or_default();
        if !known.contains(&tuple) {
            known.push(tuple.clone());
            distinct.push((record.name.clone(), tuple));
        }
    }

    distinct
}

/// Left-joins the deduplicated attributes onto the pivot by name.
pub struct AttributeMerger;

impl AttributeMerger {
    pub fn merge(pivot: &PivotTable, records: &[ContactRecord]) -> MergedReportTable {
        let distinct = deduplicate_attributes(records);

        let mut by_name: HashMap<&str, Vec<&AttributeTuple>> = HashMap::new();
        for (name, tuple) in &distinct {
            by_name.entry(name.as_str()).or_default().push(tuple);
        }

        let mut rows = Vec::with_capacity(pivot.rows.len());
        let mut fanned_out_names: Vec<String> = Vec::new();

        for row in &pivot.rows {
            match by_name.get(row.name.as_str()) {
                Some(tuples) => {
                    if tuples.len() > 1 && !fanned_out_names.contains(&row.name) {
                        warn!(
                            "Contact '{}' has {} distinct attribute combinations; its pivot rows are duplicated per combination",
                            row.name,
                            tuples.len()
                        );
                        fanned_out_names.push(row.name.clone());
                    }
                    for tuple in tuples {
                        rows.push(MergedReportRow {
                            name: row.name.clone(),
                            attributes: Some((*tuple).clone()),
                            licence: row.licence.clone(),
                            values: row.values.clone(),
                        });
                    }
                }
                None => rows.push(MergedReportRow {
                    name: row.name.clone(),
                    attributes: None,
                    licence: row.licence.clone(),
                    values: row.values.clone(),
                }),
            }
        }

        debug!(
            "Merged {} attribute rows onto {} pivot rows -> {} report rows",
            distinct.len(),
            pivot.rows.len(),
            rows.len()
        );

        MergedReportTable {
            buckets: pivot.buckets.clone(),
            rows,
            fanned_out_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::PivotRow;
    use crate::schema::CellValue;

    fn record(name: &str, change: &str, status: &str, updated: &str) -> ContactRecord {
        ContactRecord {
            name: name.to_string(),
            licence: "Pro".to_string(),
            expected_renewal: CellValue::Empty,
            expected_revenue: None,
            renewal_date: CellValue::Empty,
            licence_change: CellValue::from(change),
            renewal_status: CellValue::from(status),
            updated: CellValue::from(updated),
        }
    }

    fn pivot(names: &[&str]) -> PivotTable {
        PivotTable {
            buckets: vec![BucketKey::new(2024, 1).unwrap()],
            rows: names
                .iter()
                .map(|n| PivotRow {
                    name: n.to_string(),
                    licence: "Pro".to_string(),
                    values: vec![10.0],
                })
                .collect(),
        }
    }

    #[test]
    fn test_identical_tuples_collapse() {
        let records = vec![
            record("Alice", "Upgrade", "Renewed", "2024-01-02"),
            record("Alice", "Upgrade", "Renewed", "2024-01-02"),
        ];

        let distinct = deduplicate_attributes(&records);
        assert_eq!(distinct.len(), 1);

        let merged = AttributeMerger::merge(&pivot(&["Alice"]), &records);
        assert_eq!(merged.rows.len(), 1);
        assert!(merged.fanned_out_names.is_empty());
        let attrs = merged.rows[0].attributes.as_ref().unwrap();
        assert_eq!(attrs.renewal_status, CellValue::Text("Renewed".to_string()));
    }

    #[test]
    fn test_distinct_tuples_fan_out() {
        let records = vec![
            record("Alice", "Upgrade", "Pending", "2024-01-02"),
            record("Bob", "None", "Renewed", "2024-01-03"),
            record("Alice", "Upgrade", "Renewed", "2024-02-01"),
        ];

        let merged = AttributeMerger::merge(&pivot(&["Alice", "Bob"]), &records);

        assert_eq!(merged.rows.len(), 3);
        assert_eq!(merged.fanned_out_names, vec!["Alice".to_string()]);
        assert_eq!(merged.rows[0].name, "Alice");
        assert_eq!(
            merged.rows[0].attributes.as_ref().unwrap().renewal_status,
            CellValue::Text("Pending".to_string())
        );
        assert_eq!(merged.rows[1].name, "Alice");
        assert_eq!(
            merged.rows[1].attributes.as_ref().unwrap().renewal_status,
            CellValue::Text("Renewed".to_string())
        );
        assert_eq!(merged.rows[2].name, "Bob");
        assert!(merged.rows.iter().all(|r| r.values == vec![10.0]));
    }

    #[test]
    fn test_unmatched_pivot_rows_are_kept() {
        let records = vec![record("Bob", "None", "Renewed", "")];
        let merged = AttributeMerger::merge(&pivot(&["Alice"]), &records);
        assert_eq!(merged.rows.len(), 1);
        assert!(merged.rows[0].attributes.is_none());
    }
}
