/// Shared data types for the pickup watch service.
///
/// Everything here lives for one poll cycle at most: the decoded search
/// payload, the notification messages derived from it, and the errors a
/// cycle can run into. Nothing is persisted between cycles.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Decoded search payload
// ---------------------------------------------------------------------------

/// Pickup availability for a set of stores near the configured location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub stores: Vec<Store>,
}

/// One retail store and the availability of every requested part there.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub store_name: String,
    pub parts_availability: Vec<PartAvailability>,
}

/// Availability of a single product at a single store.
#[derive(Debug, Clone, PartialEq)]
pub struct PartAvailability {
    /// Marketing title of the product, e.g. "iPhone 15 Pro 256GB Black Titanium".
    pub product_title: String,
    /// Free-text pickup phrase, e.g. "Available Today" or "Currently unavailable".
    pub pickup_quote: String,
}

impl SearchResponse {
    /// Total number of part records across all stores.
    pub fn part_count(&self) -> usize {
        self.stores.iter().map(|s| s.parts_availability.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A push notification for one in-stock record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub content: String,
}

impl Message {
    /// Builds the notification for a product that can be picked up at `store_name`.
    /// Body format: "取货时间:<quote> 地点:<store>".
    pub fn for_pickup(part: &PartAvailability, store_name: &str) -> Self {
        Message {
            title: part.product_title.clone(),
            content: format!("取货时间:{} 地点:{}", part.pickup_quote, store_name),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Maximum number of payload characters carried in a decode error.
pub const EXCERPT_CHARS: usize = 200;

/// Errors raised while running a poll cycle.
///
/// None of these are fatal: `Network` and `Decode` end the current cycle
/// early, `DeliveryFailed` is recorded per (message, endpoint) pair.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("decode error: {message} (payload: {excerpt})")]
    Decode { message: String, excerpt: String },

    #[error("delivery to {endpoint} failed: {message}")]
    DeliveryFailed { endpoint: String, message: String },
}

impl WatchError {
    pub fn network(url: &str, err: impl std::fmt::Display) -> Self {
        WatchError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Decode failure carrying a bounded, lossily-decoded excerpt of the payload.
    pub fn decode(payload: &[u8], err: impl std::fmt::Display) -> Self {
        let excerpt: String = String::from_utf8_lossy(payload)
            .chars()
            .take(EXCERPT_CHARS)
            .collect();
        WatchError::Decode {
            message: err.to_string(),
            excerpt,
        }
    }
}
