use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::model::{Table, Value};
use crate::error::ColumnNotFoundError;

// ---------------------------------------------------------------------------
// Frequency table: value → count
// ---------------------------------------------------------------------------

/// Occurrence count of every distinct value of one column.  Missing cells are
/// counted under [`Value::Null`], so the total equals the table's row count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencyTable {
    pub column: String,
    counts: BTreeMap<Value, usize>,
}

impl FrequencyTable {
    /// Count of the missing bucket.
    pub fn missing(&self) -> usize {
        self.counts.get(&Value::Null).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Buckets in value order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, usize)> {
        self.counts.iter().map(|(v, &c)| (v, c))
    }

    /// Buckets by descending count, ties broken by value order.
    pub fn by_count(&self) -> Vec<(&Value, usize)> {
        let mut entries: Vec<(&Value, usize)> = self.iter().collect();
        entries.sort_by(|(va, ca), (vb, cb)| cb.cmp(ca).then_with(|| va.cmp(vb)));
        entries
    }
}

#[cfg(test)]
impl FrequencyTable {
    pub fn get(&self, value: &Value) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct buckets, including the missing bucket if non-empty.
    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            value: &'a Value,
            count: usize,
        }
        let entries = self.by_count();
        let mut seq = serializer.serialize_seq(Some(entries.len()))?;
        for (value, count) in entries {
            seq.serialize_element(&Entry { value, count })?;
        }
        seq.end()
    }
}

/// Count occurrences of each value in `column`, bucketing missing cells.
pub fn value_counts(table: &Table, column: &str) -> Result<FrequencyTable, ColumnNotFoundError> {
    let col = table.column(column)?;
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for value in col.values() {
        *counts.entry(value.canonical()).or_default() += 1;
    }
    Ok(FrequencyTable {
        column: column.to_string(),
        counts,
    })
}

// ---------------------------------------------------------------------------
// Cross-tabulation: (value_a, value_b) → count
// ---------------------------------------------------------------------------

/// Co-occurrence counts of two columns.  Only observed pairs are stored, and
/// rows with a missing value in either column are not counted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrossTab {
    pub column_a: String,
    pub column_b: String,
    counts: BTreeMap<(Value, Value), usize>,
}

impl CrossTab {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Pairs ordered by `a`, then `b`, like a reset `groupby(...).size()`.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value, usize)> {
        self.counts.iter().map(|((a, b), &c)| (a, b, c))
    }
}

#[cfg(test)]
impl CrossTab {
    pub fn get(&self, a: &Value, b: &Value) -> usize {
        // BTreeMap lookups need an owned key for tuple keys.
        self.counts.get(&(a.clone(), b.clone())).copied().unwrap_or(0)
    }

    /// Number of observed pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

/// Serialised as `{"column_a", "column_b", "rows": [{"a", "b", "count"}]}`.
/// Row keys are fixed so that no column name can shadow another field.
impl Serialize for CrossTab {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Row<'a> {
            a: &'a Value,
            b: &'a Value,
            count: usize,
        }

        struct Rows<'a>(&'a CrossTab);

        impl Serialize for Rows<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.counts.len()))?;
                for (a, b, count) in self.0.iter() {
                    seq.serialize_element(&Row { a, b, count })?;
                }
                seq.end()
            }
        }

        #[derive(Serialize)]
        struct Document<'a> {
            column_a: &'a str,
            column_b: &'a str,
            rows: Rows<'a>,
        }

        Document {
            column_a: &self.column_a,
            column_b: &self.column_b,
            rows: Rows(self),
        }
        .serialize(serializer)
    }
}

/// Count co-occurring values of `column_a` and `column_b`.
pub fn cross_tab(
    table: &Table,
    column_a: &str,
    column_b: &str,
) -> Result<CrossTab, ColumnNotFoundError> {
    let a = table.column(column_a)?;
    let b = table.column(column_b)?;
    let mut counts: BTreeMap<(Value, Value), usize> = BTreeMap::new();
    for (va, vb) in a.values().iter().zip(b.values()) {
        if va.is_null() || vb.is_null() {
            continue;
        }
        *counts.entry((va.canonical(), vb.canonical())).or_default() += 1;
    }
    Ok(CrossTab {
        column_a: column_a.to_string(),
        column_b: column_b.to_string(),
        counts,
    })
}

/// Sorted distinct non-missing values of `column`.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<Value>, ColumnNotFoundError> {
    let col = table.column(column)?;
    let unique: BTreeSet<Value> = col
        .values()
        .iter()
        .filter(|v| !v.is_null())
        .map(Value::canonical)
        .collect();
    Ok(unique.into_iter().collect())
}
