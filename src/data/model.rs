use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::{ColumnNotFoundError, SchemaError};

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// One cell of a [`Table`].
///
/// Integers and floats form a single numeric domain: `Integer(1)`,
/// `Float(1.0)` and `Float(-0.0)`/`Integer(0)` are equal, order and hash
/// the same, so every grouping agrees with [`Value::matches`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date, kept as text.
    Date(String),
    /// Missing cell. Float `NaN` is read as this too.
    Null,
}

/// Exclusive upper bound of `i64` as an `f64` (2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    /// Sort rank of the value's domain: missing first, then booleans,
    /// numbers, text and dates.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::Date(_) => 4,
        }
    }

    /// The integer a float stands for, if it is integral and fits in `i64`.
    fn integral(v: f64) -> Option<i64> {
        (v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v)).then_some(v as i64)
    }

    /// Canonical form used as a grouping key: integral floats become
    /// integers, so a bucket is labelled the same whichever row came first.
    pub fn canonical(&self) -> Value {
        match self {
            Value::Float(v) => Self::integral(*v).map_or(Value::Float(*v), Value::Integer),
            other => other.clone(),
        }
    }
}

/// Exact comparison of an integer with a float, without rounding the integer.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() || f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        let frac = f - whole;
        if frac > 0.0 {
            Ordering::Less
        } else if frac < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            // `==` first so that 0.0 and -0.0 are one value
            (Value::Float(a), Value::Float(b)) if a == b => Ordering::Equal,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Integer(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) | (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self.canonical() {
            Value::Integer(i) => i.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::String(s) | Value::Date(s) => s.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Date(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("<missing>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Float(v)
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to interpret the value as an `f64` for numeric statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Filter equality: numbers compare numerically whatever their storage,
    /// text compares exactly (case-sensitive). A missing cell matches nothing.
    pub fn matches(&self, target: &Value) -> bool {
        !self.is_null() && !target.is_null() && self == target
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Semantic type of a column, used to decide which panels consider it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Boolean,
}

impl ColumnKind {
    /// Infer the kind from the non-missing values.  A column with no values
    /// at all is treated as categorical.
    pub fn infer(values: &[Value]) -> Self {
        let mut present = values.iter().filter(|v| !v.is_null()).peekable();
        if present.peek().is_none() {
            return ColumnKind::Categorical;
        }
        let mut numeric = true;
        let mut boolean = true;
        for v in present {
            numeric &= matches!(v, Value::Integer(_) | Value::Float(_));
            boolean &= matches!(v, Value::Bool(_));
        }
        if numeric {
            ColumnKind::Numeric
        } else if boolean {
            ColumnKind::Boolean
        } else {
            ColumnKind::Categorical
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Name and kind of a column, derived from the table on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

/// One named, homogeneously-kinded column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a column whose kind is inferred from its values.
    pub fn inferred(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnKind::infer(&values);
        Self::new(name, kind, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Rows × named columns, aligned by position.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Validate column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let num_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(SchemaError::DuplicateColumn(col.name().to_string()));
            }
            if col.len() != num_rows {
                return Err(SchemaError::LengthMismatch {
                    column: col.name().to_string(),
                    expected: num_rows,
                    found: col.len(),
                });
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn descriptors(&self) -> Vec<ColumnDescriptor> {
        self.columns.iter().map(Column::descriptor).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, ColumnNotFoundError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ColumnNotFoundError(name.to_string()))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Cell at `(row, column index)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.columns.get(col)?.get(row)
    }

    /// Copy the given rows, in the given order, into a new table with the
    /// same schema.  Out-of-range indices are skipped.
    pub fn take(&self, rows: &[usize]) -> Table {
        let rows: Vec<usize> = rows.iter().copied().filter(|&r| r < self.num_rows).collect();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = rows.iter().map(|&r| col.values[r].clone()).collect();
                Column::new(col.name.clone(), col.kind, values)
            })
            .collect();
        Table {
            columns,
            num_rows: rows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&v| Value::from(v)).collect()
    }

    #[test]
    fn test_table_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::inferred("a", text(&["x"])),
            Column::inferred("a", text(&["y"])),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::inferred("a", text(&["x", "y"])),
            Column::inferred("b", text(&["z"])),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::LengthMismatch {
                column: "b".to_string(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_kind_inference() {
        assert_eq!(
            ColumnKind::infer(&[Value::Integer(1), Value::Null, Value::Float(2.5)]),
            ColumnKind::Numeric
        );
        assert_eq!(
            ColumnKind::infer(&[Value::Bool(true), Value::Bool(false)]),
            ColumnKind::Boolean
        );
        assert_eq!(
            ColumnKind::infer(&[Value::Integer(1), Value::from("low")]),
            ColumnKind::Categorical
        );
        assert_eq!(ColumnKind::infer(&[Value::Null]), ColumnKind::Categorical);
    }

    #[test]
    fn test_take_preserves_requested_order() {
        let table = Table::new(vec![
            Column::inferred("id", vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)]),
            Column::inferred("risk", text(&["low", "high", "low"])),
        ])
        .unwrap();

        let subset = table.take(&[2, 0, 7]);
        assert_eq!(subset.num_rows(), 2);
        assert_eq!(subset.cell(0, 0), Some(&Value::Integer(2)));
        assert_eq!(subset.cell(1, 1), Some(&Value::from("low")));
        assert_eq!(subset.descriptors(), table.descriptors());
    }

    #[test]
    fn test_numbers_are_one_domain() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(v: &Value) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        let pairs = [
            (Value::Integer(1), Value::Float(1.0)),
            (Value::Integer(0), Value::Float(-0.0)),
            (Value::Float(0.0), Value::Float(-0.0)),
        ];
        for (a, b) in &pairs {
            assert_eq!(a, b);
            assert_eq!(a.cmp(b), Ordering::Equal);
            assert_eq!(hash_of(a), hash_of(b));
        }

        assert!(Value::Integer(1) < Value::Float(1.5));
        assert!(Value::Float(-1.5) < Value::Integer(-1));
        assert!(Value::Integer(i64::MAX) < Value::Float(1e19));
        assert_ne!(Value::Integer(1), Value::from("1"));
        assert_ne!(Value::Integer(1), Value::Bool(true));
    }

    #[test]
    fn test_canonical_collapses_integral_floats() {
        assert!(matches!(Value::Float(3.0).canonical(), Value::Integer(3)));
        assert!(matches!(Value::Float(-0.0).canonical(), Value::Integer(0)));
        assert!(matches!(Value::Float(2.5).canonical(), Value::Float(v) if v == 2.5));
        assert_eq!(Value::Float(2.0).canonical().to_string(), "2");
    }

    #[test]
    fn test_value_matching_semantics() {
        assert!(Value::Integer(2).matches(&Value::Float(2.0)));
        assert!(Value::from("high").matches(&Value::from("high")));
        assert!(!Value::from("High").matches(&Value::from("high")));
        assert!(!Value::Null.matches(&Value::Null));
        assert!(!Value::from("1").matches(&Value::Integer(1)));
    }

    #[test]
    fn test_missing_sorts_first() {
        let mut values = vec![Value::from("b"), Value::Null, Value::Integer(3), Value::from("a")];
        values.sort();
        assert_eq!(
            values,
            vec![Value::Null, Value::Integer(3), Value::from("a"), Value::from("b")]
        );
    }
}
