pub mod events;
pub mod store;

pub use events::SignalEvent;
pub use store::{AdmitRejection, Dashboard, SignalStore};
