/// Data layer: core types, loading, and cleaning.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  sentinel → missing, drop incomplete rows,
///   └──────────┘  per-column percentile trim (sequential)
///        │
///        ▼
///   ┌────────────────┐
///   │ WellLogDataset │  ordered columns, kinds, complete rows
///   └────────────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
