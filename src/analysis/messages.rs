/// Turns a decoded search response into notification messages.
///
/// Every (store, part) record is classified independently. In-stock
/// records become `Message`s in response order; every rejected record is
/// logged so a quiet cycle can still be told apart from a broken one.

use crate::model::{Message, SearchResponse};
use log::info;

/// Outcome of classifying one search response.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classified {
    pub messages: Vec<Message>,
    pub rejected: usize,
}

/// Applies `is_in_stock` to every part of every store.
///
/// The classifier is passed in so the heuristic can be swapped without
/// touching parsing or delivery; production uses
/// `analysis::stock::is_in_stock`.
pub fn collect_messages<F>(response: &SearchResponse, is_in_stock: F) -> Classified
where
    F: Fn(&str) -> bool,
{
    let mut classified = Classified::default();

    for store in &response.stores {
        for part in &store.parts_availability {
            if !is_in_stock(&part.pickup_quote) {
                info!(
                    "no stock: model={} store={} quote={}",
                    part.product_title, store.store_name, part.pickup_quote
                );
                classified.rejected += 1;
                continue;
            }

            info!(
                "IN STOCK: model={} store={} quote={}",
                part.product_title, store.store_name, part.pickup_quote
            );
            classified.messages.push(Message::for_pickup(part, &store.store_name));
        }
    }

    classified
}
