/// Apple retail fulfillment-messages API client.
///
/// Handles URL construction, the bounded fetch and JSON response parsing
/// for the store pickup search:
///   https://www.apple.com/us-hed/shop/fulfillment-messages
///
/// See `fixtures.rs` for annotated examples of the response structure.

use crate::config::WatchConfig;
use crate::http::HttpGet;
use crate::model::{PartAvailability, SearchResponse, Store, WatchError};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Hard deadline on the search request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Serde structures for the fulfillment JSON envelope
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct FulfillmentResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    body: ResponseBody,
}

#[derive(Deserialize, Default)]
struct ResponseBody {
    #[serde(default, deserialize_with = "null_as_default")]
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(rename = "pickupMessage", default, deserialize_with = "null_as_default")]
    pickup_message: PickupMessage,
}

#[derive(Deserialize, Default)]
struct PickupMessage {
    /// Decoded entry by entry so one bad store cannot sink the others.
    #[serde(default, deserialize_with = "null_as_default")]
    stores: Vec<Value>,
}

#[derive(Deserialize)]
struct StoreEntry {
    #[serde(rename = "storeName", default, deserialize_with = "null_as_default")]
    store_name: String,
    #[serde(rename = "partsAvailability", default, deserialize_with = "parts_list")]
    parts_availability: Vec<Value>,
}

#[derive(Deserialize)]
struct PartEntry {
    #[serde(rename = "storePickupProductTitle", default, deserialize_with = "null_as_default")]
    product_title: String,
    #[serde(rename = "pickupSearchQuote", default, deserialize_with = "null_as_default")]
    pickup_quote: String,
    #[serde(rename = "messageTypes", default, deserialize_with = "null_as_default")]
    message_types: MessageTypes,
}

/// Per-channel copy of the part strings; `regular` is the in-store one.
#[derive(Deserialize, Default)]
struct MessageTypes {
    #[serde(default, deserialize_with = "null_as_default")]
    regular: RegularMessage,
}

#[derive(Deserialize, Default)]
struct RegularMessage {
    #[serde(rename = "storePickupProductTitle", default, deserialize_with = "null_as_default")]
    product_title: String,
    #[serde(rename = "storePickupQuote", default, deserialize_with = "null_as_default")]
    pickup_quote: String,
}

/// `partsAvailability` arrives as a list or as an object keyed by part number.
#[derive(Deserialize)]
#[serde(untagged)]
enum PartsShape {
    List(Vec<Value>),
    Keyed(BTreeMap<String, Value>),
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn parts_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<PartsShape>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(PartsShape::List(parts)) => parts,
        Some(PartsShape::Keyed(parts)) => parts.into_values().collect(),
    })
}

/// Missing strings decode as empty; only entries that are not objects at
/// all are dropped, with a warning.
fn decode_store(index: usize, value: Value) -> Option<Store> {
    let entry: StoreEntry = match serde_json::from_value(value) {
        Ok(entry) => entry,
        Err(e) => {
            warn!("skipping store #{}: {}", index, e);
            return None;
        }
    };

    let mut parts_availability = Vec::with_capacity(entry.parts_availability.len());
    for (part_index, value) in entry.parts_availability.into_iter().enumerate() {
        match serde_json::from_value::<PartEntry>(value) {
            Ok(part) => parts_availability.push(into_part(part)),
            Err(e) => warn!(
                "skipping part #{} at store {}: {}",
                part_index, entry.store_name, e
            ),
        }
    }

    Some(Store {
        store_name: entry.store_name,
        parts_availability,
    })
}

/// Falls back to `messageTypes.regular` for strings missing at the top level.
fn into_part(part: PartEntry) -> PartAvailability {
    let regular = part.message_types.regular;
    PartAvailability {
        product_title: if part.product_title.is_empty() {
            regular.product_title
        } else {
            part.product_title
        },
        pickup_quote: if part.pickup_quote.is_empty() {
            regular.pickup_quote
        } else {
            part.pickup_quote
        },
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the pickup search URL for the configured location and models.
///
/// Parameters are emitted in a fixed order: `mt=regular`, `pl=true`,
/// `location`, then `parts.0`, `parts.1`, ... following the order of
/// `config.models`. Keys and values are percent-encoded. An empty model
/// list produces a query with no `parts.*` parameters.
///
/// # Example
/// ```
/// use pickup_watch::config::WatchConfig;
/// use pickup_watch::ingest::fulfillment::build_search_url;
///
/// let mut config = WatchConfig::new("10001", vec!["MTUW3LL/A".to_string()], 30, vec![]);
/// config.search_url = "https://example.com/fulfillment".to_string();
/// assert_eq!(
///     build_search_url(&config),
///     "https://example.com/fulfillment?mt=regular&pl=true&location=10001&parts.0=MTUW3LL%2FA"
/// );
/// ```
pub fn build_search_url(config: &WatchConfig) -> String {
    let mut params: Vec<(String, &str)> = vec![
        ("mt".to_string(), "regular"),
        ("pl".to_string(), "true"),
        ("location".to_string(), config.location.as_str()),
    ];

    for (index, model) in config.models.iter().enumerate() {
        params.push((format!("parts.{}", index), model.as_str()));
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if config.search_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", config.search_url, separator, query)
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Issues the search GET and returns the raw body.
///
/// The status code is not validated; a non-2xx body is still handed to the
/// parser (it usually fails to decode and ends the cycle there).
///
/// # Errors
/// - `WatchError::Network` — transport failure or the deadline elapsed.
pub fn fetch_availability(
    client: &dyn HttpGet,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, WatchError> {
    debug!("GET {}", url);

    let response = client
        .do_get(url, timeout)
        .map_err(|e| WatchError::network(url, e))?;

    if !response.is_success() {
        warn!("search API answered {} for {}", response.status, url);
    }

    Ok(response.body)
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a fulfillment-messages JSON body into a `SearchResponse`.
///
/// Unknown fields are ignored. Missing or null fields decode as empty, so
/// `{}` yields a response with no stores and a part without a quote is
/// simply not in stock. Store and part entries that are not objects are
/// skipped with a warning instead of failing the whole response.
///
/// # Errors
/// - `WatchError::Decode` — malformed JSON, or an envelope that is not
///   shaped like an object.
pub fn parse_search_response(payload: &[u8]) -> Result<SearchResponse, WatchError> {
    let response: FulfillmentResponse =
        serde_json::from_slice(payload).map_err(|e| WatchError::decode(payload, e))?;

    let stores = response
        .body
        .content
        .pickup_message
        .stores
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| decode_store(index, value))
        .collect();

    Ok(SearchResponse { stores })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
