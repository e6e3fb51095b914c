/// Pickup quote classification.
///
/// The search API has no structured stock flag, only a human-readable
/// quote per (store, part) such as "Available Today", "Available Tomorrow"
/// or "Currently unavailable". Stock is inferred from two substrings.
/// Other phrasings (other negations, other locales) are not special-cased.

/// Matches "Available" and "available".
pub const AVAILABLE_MARKER: &str = "vailable";

/// Negative phrase; takes precedence over `AVAILABLE_MARKER`.
pub const UNAVAILABLE_MARKER: &str = "Currently unavailable";

/// Returns `true` when `quote` advertises in-store pickup.
///
/// Case-sensitive: the quote must contain "vailable" and must not contain
/// "Currently unavailable".
pub fn is_in_stock(quote: &str) -> bool {
    quote.contains(AVAILABLE_MARKER) && !quote.contains(UNAVAILABLE_MARKER)
}
