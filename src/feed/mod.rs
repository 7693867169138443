mod client;
mod decode;
mod error;
mod types;

pub use client::{build_feed_url, FeedSource, HttpFeed};
pub use decode::{decode_altitude, decode_snapshot};
pub use error::{FeedError, FieldDecodeError, UnusableRecord};
pub use types::{AircraftSnapshot, FeedResponse, FeedSnapshot};
