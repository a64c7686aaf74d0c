//! Price data acquisition: the provider seam, concrete providers, ingestion.

pub mod csv_dir;
pub mod ingest;
pub mod provider;
pub mod stooq;

pub use csv_dir::{read_price_csv, write_price_csv, CsvDirProvider};
pub use ingest::{ingest, IngestReport};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use stooq::StooqProvider;
