pub mod config;
pub mod feed;
pub mod geo;
pub mod ingest;
pub mod observation;
pub mod status;
pub mod web;
