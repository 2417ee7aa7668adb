pub mod event_time;
pub mod filters;
pub mod models;
pub mod parse;
pub mod snapshot;
pub mod stats;
