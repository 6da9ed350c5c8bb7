//! Report shaping over the typed grouped-result records: everything here is
//! pure so the dashboard math is testable without a store.

pub mod aggregation;
pub mod budget;
pub mod window;
