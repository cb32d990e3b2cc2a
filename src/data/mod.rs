/// Data layer: core types, loading, and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (index column stripped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  ordered columns, rows of CellValue
///   └──────────┘
///        │  + Vec<Label>
///        ▼
///   ┌──────────┐
///   │  export   │  CSV, or XLSX with fills and summary rows
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
