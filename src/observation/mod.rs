mod error;
mod jsonl;
mod memory;
mod store;
mod types;

pub use error::StoreError;
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use store::{select_window, ObservationStore, Observations, WindowQuery};
pub use types::{Altitude, Observation};
