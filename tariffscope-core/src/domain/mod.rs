//! Domain types shared by every pipeline stage.

pub mod event;
pub mod metric;
pub mod price;

pub use event::TariffEvent;
pub use metric::{Baseline, EventWindowMetric};
pub use price::PriceRecord;
