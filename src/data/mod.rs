/// Data layer: core types, loading, statistics and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns of Values, equal length
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐  ┌───────────┐  ┌──────────┐
///   │ summary   │  │ aggregate │  │  filter   │
///   └──────────┘  └───────────┘  └──────────┘
///   describe()     value counts,   equality predicate
///                  cross-tab       → row subset
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
