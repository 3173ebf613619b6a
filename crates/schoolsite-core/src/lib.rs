//! Core library for the school website front end.
//!
//! The school backend serves one JSON document describing the whole school.
//! Every page of the site reads from that document, so it is fetched through
//! a process-wide single-flight [`ResourceCache`]: however many pages ask for
//! it at once, at most one request is in flight, and once it arrives every
//! page is served from memory until it is invalidated.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod site;
pub mod utils;

pub use api::{ApiError, SchoolClient};
pub use cache::{CacheError, CacheStatus, ResourceCache, ResourceKey};
pub use config::Config;
pub use models::SchoolData;
pub use site::{Loadable, SchoolCache, SchoolSite};
