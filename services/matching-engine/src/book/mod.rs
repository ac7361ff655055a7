//! Order book infrastructure module
//!
//! Contains the sparse price-tick index and the FIFO price level.

pub mod price_index;
pub mod price_level;

pub use price_index::PriceIndex;
pub use price_level::{LimitOrder, PriceLevel};
