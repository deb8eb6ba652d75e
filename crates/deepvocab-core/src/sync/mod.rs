//! Remote synchronization sources.

mod http;

pub use http::HttpRemoteSource;
