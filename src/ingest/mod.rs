/// Upstream data sources.
///
/// Each source gets its own file: URL construction, fetch and parsing
/// live together with their tests.

pub mod fulfillment;

#[cfg(test)]
mod fixtures;
