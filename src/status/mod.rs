mod phase;
mod projector;
mod summary;
mod types;

pub use phase::{rank_order, Phase};
pub use projector::{list_tracks, rank_statuses, StatusProjector, StatusSettings, TrackSettings};
pub use summary::{group_by_aircraft, summarize, TrackSummary};
pub use types::{FlightStatus, TrackListing};
