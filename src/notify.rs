/// Push notification delivery.
///
/// Every in-stock `Message` is sent to every configured relay as a plain
/// GET (Bark-style API):
///
///   <endpoint>/<escaped title>/<escaped content>?sound=<sound>
///
/// Sends run on a bounded worker pool and each carries its own timeout.
/// A failed pair is logged and recorded; it never stops the remaining
/// pairs, so M messages and N endpoints always produce M×N attempts.

use crate::config::WatchConfig;
use crate::http::HttpGet;
use crate::model::{Message, WatchError};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use threadpool::ThreadPool;

// ---------------------------------------------------------------------------
// Delivery outcomes
// ---------------------------------------------------------------------------

/// Result of one (message, endpoint) send.
#[derive(Debug)]
pub struct Delivery {
    pub message_index: usize,
    pub endpoint_index: usize,
    pub endpoint: String,
    pub url: String,
    /// HTTP status on success. The relay's answer is not otherwise checked.
    pub result: Result<u16, WatchError>,
}

/// Individual outcomes of one fan-out, ordered by (message, endpoint).
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.deliveries.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the relay URL for one message. Title and content are escaped as
/// single path segments (`/` included); a trailing `/` on the endpoint is
/// dropped so it is not doubled.
pub fn notification_url(endpoint: &str, message: &Message, sound: &str) -> String {
    format!(
        "{}/{}/{}?sound={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(&message.title),
        urlencoding::encode(&message.content),
        urlencoding::encode(sound)
    )
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

pub struct Notifier {
    client: Arc<dyn HttpGet>,
    sound: String,
    timeout: Duration,
    pool: ThreadPool,
}

impl Notifier {
    pub fn new(client: Arc<dyn HttpGet>, config: &WatchConfig) -> Self {
        Self {
            client,
            sound: config.notify_sound.clone(),
            timeout: Duration::from_secs(config.notify_timeout_seconds),
            pool: ThreadPool::with_name("notify".to_string(), config.notify_workers.max(1)),
        }
    }

    /// Sends every message to every endpoint and waits for all sends to
    /// finish. Failures are logged and reported, never propagated.
    pub fn notify(&self, messages: &[Message], endpoints: &[String]) -> DeliveryReport {
        let (tx, rx) = mpsc::channel();
        let mut expected = 0;

        for (message_index, message) in messages.iter().enumerate() {
            for (endpoint_index, endpoint) in endpoints.iter().enumerate() {
                let url = notification_url(endpoint, message, &self.sound);
                let endpoint = endpoint.clone();
                let client = Arc::clone(&self.client);
                let timeout = self.timeout;
                let tx = tx.clone();
                expected += 1;

                self.pool.execute(move || {
                    let result = send_one(client.as_ref(), &endpoint, &url, timeout);
                    // receiver outlives the fan-out
                    let _ = tx.send(Delivery {
                        message_index,
                        endpoint_index,
                        endpoint,
                        url,
                        result,
                    });
                });
            }
        }

        // Only the workers hold senders now; iteration ends once they are done.
        drop(tx);
        let mut deliveries: Vec<Delivery> = rx.iter().take(expected).collect();

        if deliveries.len() < expected {
            warn!(
                "{} of {} notification sends did not report back",
                expected - deliveries.len(),
                expected
            );
        }

        deliveries.sort_by_key(|d| (d.message_index, d.endpoint_index));
        DeliveryReport { deliveries }
    }
}

fn send_one(
    client: &dyn HttpGet,
    endpoint: &str,
    url: &str,
    timeout: Duration,
) -> Result<u16, WatchError> {
    debug!("notify GET {}", url);

    match client.do_get(url, timeout) {
        Ok(response) => {
            if !response.is_success() {
                debug!("relay {} answered {}", endpoint, response.status);
            }
            Ok(response.status)
        }
        Err(e) => {
            let err = WatchError::DeliveryFailed {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            };
            warn!("send stock message failed: {}", err);
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
