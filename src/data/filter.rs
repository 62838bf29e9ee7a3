use super::model::{Table, Value};
use crate::error::ColumnNotFoundError;

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// Row selection for one render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterPredicate {
    /// Identity: every row passes.
    #[default]
    All,
    /// Keep rows whose `column` cell matches `value` (see [`Value::matches`]).
    Equals { column: String, value: Value },
}

impl FilterPredicate {
    pub fn equals(column: impl Into<String>, value: Value) -> Self {
        FilterPredicate::Equals {
            column: column.into(),
            value,
        }
    }
}

/// Return indices of rows that pass the predicate, in table order.
///
/// A row passes when:
/// * The predicate is [`FilterPredicate::All`] → always
/// * Its cell in the predicate column matches the target value → passes
/// * The cell is missing → never matches
pub fn filtered_indices(
    table: &Table,
    predicate: &FilterPredicate,
) -> Result<Vec<usize>, ColumnNotFoundError> {
    match predicate {
        FilterPredicate::All => Ok((0..table.num_rows()).collect()),
        FilterPredicate::Equals { column, value } => {
            let col = table.column(column)?;
            Ok(col
                .values()
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.matches(value))
                .map(|(i, _)| i)
                .collect())
        }
    }
}

/// Stable selection of the rows passing `predicate`, as an independent table.
pub fn apply(table: &Table, predicate: &FilterPredicate) -> Result<Table, ColumnNotFoundError> {
    match predicate {
        FilterPredicate::All => Ok(table.clone()),
        FilterPredicate::Equals { .. } => {
            let rows = filtered_indices(table, predicate)?;
            Ok(table.take(&rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn patients() -> Table {
        Table::new(vec![
            Column::inferred(
                "patient_id",
                (1..=5).map(Value::Integer).collect(),
            ),
            Column::inferred(
                "risk_level",
                ["low", "high", "high", "critical", "low"].map(Value::from).to_vec(),
            ),
            Column::inferred(
                "anomaly",
                vec![
                    Value::Integer(0),
                    Value::Integer(1),
                    Value::Null,
                    Value::Integer(1),
                    Value::Integer(0),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_filter_is_identity() {
        let table = patients();
        assert_eq!(apply(&table, &FilterPredicate::All).unwrap(), table);
    }

    #[test]
    fn test_filter_high_risk_keeps_order() {
        let table = patients();
        let high = apply(&table, &FilterPredicate::equals("risk_level", Value::from("high"))).unwrap();

        assert_eq!(high.num_rows(), 2);
        assert_eq!(
            high.column("risk_level").unwrap().values(),
            &[Value::from("high"), Value::from("high")]
        );
        assert_eq!(
            high.column("patient_id").unwrap().values(),
            &[Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let predicate = FilterPredicate::equals("risk_level", Value::from("low"));
        let once = apply(&patients(), &predicate).unwrap();
        let twice = apply(&once, &predicate).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let predicate = FilterPredicate::equals("risk_level", Value::from("HIGH"));
        assert!(apply(&patients(), &predicate).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_filter_ignores_missing() {
        let predicate = FilterPredicate::equals("anomaly", Value::Float(1.0));
        assert_eq!(filtered_indices(&patients(), &predicate).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_unknown_column() {
        let predicate = FilterPredicate::equals("masktype_label", Value::from("N95"));
        assert_eq!(
            apply(&patients(), &predicate).unwrap_err(),
            ColumnNotFoundError("masktype_label".to_string())
        );
    }
}
