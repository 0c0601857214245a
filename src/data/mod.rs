/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  sample   │  fixed-seed draw of N rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  dates    │  DD-MM-YYYY → Year, Month  → TradeDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredSubset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  six chart-ready views, or "no data"
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dates;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
