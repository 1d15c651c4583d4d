use crate::dates::DateNormalizer;
use crate::schema::{BucketKey, ContactRecord};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PivotRow {
    pub name: String,
    pub licence: String,
    /// One cell per entry of [`PivotTable::buckets`], same order.
    pub values: Vec<f64>,
}

impl PivotRow {
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Expected revenue per (Name, Licence), spread across year-month buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct PivotTable {
    /// Ascending; the column metadata for every row's `values`.
    #[schemars(with = "Vec<String>")]
    pub buckets: Vec<BucketKey>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, name: &str, licence: &str, bucket: BucketKey) -> Option<f64> {
        let col = self.buckets.binary_search(&bucket).ok()?;
        self.rows
            .iter()
            .find(|r| r.name == name && r.licence == licence)
            .and_then(|r| r.values.get(col).copied())
    }
}

pub struct PivotBuilder {
    normalizer: DateNormalizer,
}

impl PivotBuilder {
    pub fn new(normalizer: DateNormalizer) -> Self {
        Self { normalizer }
    }

    /// Records without a readable Expected_Renewal, or with a blank Name or
    /// Licence, are left out entirely.
    pub fn build(&self, records: &[ContactRecord]) -> PivotTable {
        let mut groups: BTreeMap<(String, String), BTreeMap<BucketKey, f64>> = BTreeMap::new();
        let mut buckets: BTreeSet<BucketKey> = BTreeSet::new();
        let mut excluded = 0usize;
        let mut unkeyed = 0usize;

        for record in records {
            if record.name.is_empty() || record.licence.is_empty() {
                unkeyed += 1;
                continue;
            }

            let Some(expected) = self.normalizer.normalize(&record.expected_renewal) else {
                excluded += 1;
                continue;
            };

            let bucket = BucketKey::from_date(expected);
            buckets.insert(bucket);

            let cells = groups
                .entry((record.name.clone(), record.licence.clone()))
                .or_default();
            *cells.entry(bucket).or_insert(0.0) += record.expected_revenue.unwrap_or(0.0);
        }

        let buckets: Vec<BucketKey> = buckets.into_iter().collect();

        let rows = groups
            .into_iter()
            .map(|((name, licence), cells)| PivotRow {
                name,
                licence,
                values: buckets
                    .iter()
                    .map(|b| cells.get(b).copied().unwrap_or(0.0))
                    .collect(),
            })
            .collect::<Vec<_>>();

        debug!(
            "Pivoted {} records into {} rows x {} buckets ({} excluded without expected date, {} without name or licence)",
            records.len() - excluded - unkeyed,
            rows.len(),
            buckets.len(),
            excluded,
            unkeyed
        );

        PivotTable { buckets, rows }
    }
}
