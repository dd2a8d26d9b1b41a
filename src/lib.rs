pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod notify;
pub mod scanner;
#[cfg(test)]
pub mod test_helpers;
pub mod tracking;
