/// Availability analysis for the pickup watch service.
///
/// Submodules:
/// - `stock`    — classifies a free-text pickup quote as in stock or not.
/// - `messages` — walks a decoded search response and turns every in-stock
///   record into a notification `Message`.

pub mod messages;
pub mod stock;
