/// Data layer: table model, loading, filtering and reshaping.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  skip preamble, parse → Table (+ transposed view)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  rows by indicator / country, columns by year
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐  ┌───────────┐  ┌───────────┐
///   │  series   │  │   pivot    │  │  summary   │
///   └──────────┘  └───────────┘  └───────────┘
///   country →      long form →     5 × 5 lookup,
///   year values    correlation     describe()
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pivot;
pub mod series;
pub mod summary;

pub use error::{DataError, Result};
pub use model::{Cell, Table, TransposedTable};
