/// Test fixtures: representative JSON payloads from the fulfillment-messages API.
///
/// Trimmed to what the parser reads plus a few unrelated fields, so tests
/// also cover tolerance of unknown keys. Response shape:
///   body.content.pickupMessage.stores[]
///     .storeName
///     .partsAvailability[]            — array, or object keyed by part number
///       .storePickupProductTitle
///       .pickupSearchQuote            — free text, e.g. "Available Today"
///
/// Quotes carry markup in the live API ("<span>Available</span> Today");
/// the classifier only does substring matching so it is left in place.

/// Two stores: Fifth Avenue has one model in stock and one unavailable,
/// Grand Central has nothing.
#[cfg(test)]
pub(crate) fn fixture_two_stores_json() -> &'static str {
    r#"{
      "head": { "status": "200", "data": {} },
      "body": {
        "content": {
          "pickupMessage": {
            "stores": [
              {
                "storeNumber": "R095",
                "storeName": "Fifth Avenue",
                "city": "New York",
                "partsAvailability": [
                  {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Natural Titanium",
                    "pickupSearchQuote": "Available Today",
                    "pickupDisplay": "available"
                  },
                  {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Blue Titanium",
                    "pickupSearchQuote": "Currently unavailable",
                    "pickupDisplay": "unavailable"
                  }
                ]
              },
              {
                "storeNumber": "R238",
                "storeName": "Grand Central",
                "partsAvailability": [
                  {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Natural Titanium",
                    "pickupSearchQuote": "Currently unavailable"
                  }
                ]
              }
            ],
            "location": "10001"
          }
        }
      }
    }"#
}

/// Live-API shape: `partsAvailability` is an object keyed by part number.
#[cfg(test)]
pub(crate) fn fixture_keyed_parts_json() -> &'static str {
    r#"{
      "body": {
        "content": {
          "pickupMessage": {
            "stores": [
              {
                "storeName": "Williamsburg",
                "partsAvailability": {
                  "MTUX3LL/A": {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Blue Titanium",
                    "pickupSearchQuote": "Available Tomorrow"
                  },
                  "MTUW3LL/A": {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Natural Titanium",
                    "pickupSearchQuote": "<span class=\"pickup-quote\">Available</span> Today"
                  }
                }
              }
            ]
          }
        }
      }
    }"#
}

/// Search with no nearby stores.
#[cfg(test)]
pub(crate) fn fixture_no_stores_json() -> &'static str {
    r#"{ "body": { "content": { "pickupMessage": { "stores": [] } } } }"#
}

/// Error page shape: the API sometimes answers with an envelope that has no
/// pickupMessage at all (e.g. unknown location).
#[cfg(test)]
pub(crate) fn fixture_missing_pickup_message_json() -> &'static str {
    r#"{
      "head": { "status": "200" },
      "body": {
        "content": {
          "deliveryMessage": { "geoLocated": false },
          "pickupMessage": null
        }
      }
    }"#
}

/// One usable record next to incomplete ones: a stray non-object part, a
/// non-object store entry, and a keyed part whose title only appears under
/// `messageTypes.regular`.
#[cfg(test)]
pub(crate) fn fixture_mixed_records_json() -> &'static str {
    r#"{
      "body": {
        "content": {
          "pickupMessage": {
            "stores": [
              {
                "storeName": "Fifth Avenue",
                "partsAvailability": [
                  {
                    "storePickupProductTitle": "iPhone 15 Pro 128GB Natural Titanium",
                    "pickupSearchQuote": "Available Today"
                  },
                  "unexpected"
                ]
              },
              42,
              {
                "storeName": "Williamsburg",
                "partsAvailability": {
                  "MTUX3LL/A": {
                    "pickupSearchQuote": "Currently unavailable",
                    "messageTypes": {
                      "regular": {
                        "storePickupProductTitle": "iPhone 15 Pro 128GB Blue Titanium",
                        "storePickupQuote": "Currently unavailable"
                      }
                    }
                  }
                }
              }
            ]
          }
        }
      }
    }"#
}
