pub mod apis;
pub mod arguments;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod logger;
pub mod paths;
pub mod snapshot;
