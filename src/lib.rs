/// pickup_watch: Apple retail in-store pickup availability watcher.
///
/// # Module structure
///
/// ```text
/// pickup_watch
/// ├── model       — shared data types (SearchResponse, Message, WatchError, …)
/// ├── config      — watch configuration loader (pickup_watch.toml)
/// ├── http        — blocking GET seam over reqwest
/// ├── daemon      — poll loop state machine (fetch, parse, classify, notify, sleep)
/// ├── notify      — push relay fan-out over a bounded worker pool
/// ├── ingest
/// │   ├── fulfillment — search URL construction, fetch, JSON parsing
/// │   └── fixtures (test only) — representative API response payloads
/// └── analysis
///     ├── stock       — pickup quote in-stock heuristic
///     └── messages    — turns in-stock records into notification messages
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod daemon;
pub mod http;
pub mod ingest;
pub mod model;
pub mod notify;
