/// Data layer: table model, file formats and row/grid transforms.
///
/// Architecture:
/// ```text
///  .ecsv / .parquet / .csv / .txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resample  │  optional, Akima regrid onto a uniform X step
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   trim    │  keep rows inside the X range → new Table
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod resample;
pub mod trim;
