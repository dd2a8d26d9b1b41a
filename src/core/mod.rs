pub mod candidate;
pub mod filter;
pub mod indicators;
pub mod scoring;
pub mod targets;

pub use indicators::IndicatorSnapshot;
