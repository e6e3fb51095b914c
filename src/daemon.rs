/// Core daemon implementation for the pickup watch service
///
/// This module implements the polling loop that, once per cycle:
/// 1. Builds the search URL and fetches availability (5 s deadline)
/// 2. Parses the fulfillment JSON into stores and parts
/// 3. Classifies every pickup quote as in stock or not
/// 4. Sends a notification per in-stock record to every relay
/// 5. Sleeps for the configured interval
///
/// A fetch or parse failure ends the cycle early; the next scheduled cycle
/// is the only retry. Nothing carries over between cycles.

use crate::analysis::messages::collect_messages;
use crate::analysis::stock::is_in_stock;
use crate::config::WatchConfig;
use crate::http::{self, HttpGet};
use crate::ingest::fulfillment::{self, FETCH_TIMEOUT};
use crate::model::WatchError;
use crate::notify::{DeliveryReport, Notifier};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Cycle state machine
// ---------------------------------------------------------------------------

/// Where the daemon is within a poll cycle.
///
/// `Idle → Fetching → Parsing → Classifying → Notifying → Sleeping → Idle`.
/// A failure in `Fetching` or `Parsing` jumps straight to `Sleeping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Parsing,
    Classifying,
    Notifying,
    Sleeping,
}

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    FetchFailed(WatchError),
    DecodeFailed(WatchError),
    Completed {
        stores: usize,
        in_stock: usize,
        rejected: usize,
        delivery: DeliveryReport,
    },
}

/// Summary of one cycle, handed back to the loop for logging.
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed { .. })
    }
}

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

pub struct Daemon {
    config: WatchConfig,
    client: Arc<dyn HttpGet>,
    notifier: Notifier,
    state: CycleState,
}

impl Daemon {
    /// Create a daemon backed by a real HTTP client.
    pub fn new(config: WatchConfig) -> Result<Self, reqwest::Error> {
        let client = http::build_client()?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a daemon over any `HttpGet` implementation.
    pub fn with_client(config: WatchConfig, client: Arc<dyn HttpGet>) -> Self {
        let notifier = Notifier::new(Arc::clone(&client), &config);
        Self {
            config,
            client,
            notifier,
            state: CycleState::Idle,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Pause between the end of one cycle and the start of the next.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.config.search_interval_seconds)
    }

    fn transition(&mut self, next: CycleState) {
        debug!("cycle state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn finish(&mut self, started_at: DateTime<Utc>, outcome: CycleOutcome) -> CycleReport {
        self.transition(CycleState::Sleeping);
        CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcome,
        }
    }

    /// Run exactly one fetch → parse → classify → notify cycle.
    ///
    /// Leaves the daemon in `Sleeping`. Never fails: fetch and decode
    /// errors are logged and reported in the returned `CycleReport`.
    pub fn run_cycle(&mut self) -> CycleReport {
        let started_at = Utc::now();
        info!("querying pickup availability, location: {}", self.config.location);

        self.transition(CycleState::Fetching);
        let url = fulfillment::build_search_url(&self.config);
        let payload = match fulfillment::fetch_availability(self.client.as_ref(), &url, FETCH_TIMEOUT) {
            Ok(payload) => payload,
            Err(e) => {
                error!("search request failed: {}", e);
                return self.finish(started_at, CycleOutcome::FetchFailed(e));
            }
        };

        self.transition(CycleState::Parsing);
        let response = match fulfillment::parse_search_response(&payload) {
            Ok(response) => response,
            Err(e) => {
                error!("search response could not be decoded: {}", e);
                return self.finish(started_at, CycleOutcome::DecodeFailed(e));
            }
        };

        self.transition(CycleState::Classifying);
        let classified = collect_messages(&response, is_in_stock);

        self.transition(CycleState::Notifying);
        let delivery = self
            .notifier
            .notify(&classified.messages, &self.config.notify_endpoints);

        let outcome = CycleOutcome::Completed {
            stores: response.stores.len(),
            in_stock: classified.messages.len(),
            rejected: classified.rejected,
            delivery,
        };
        self.finish(started_at, outcome)
    }

    /// Main daemon loop (runs indefinitely).
    ///
    /// The first cycle starts immediately; each later cycle starts
    /// `search_interval_seconds` after the previous one finished, so cycles
    /// never overlap.
    pub fn run(&mut self) -> ! {
        info!(
            "starting poll loop: {} models at {}, every {}s, {} notify endpoints",
            self.config.models.len(),
            self.config.location,
            self.config.search_interval_seconds,
            self.config.notify_endpoints.len()
        );

        loop {
            let report = self.run_cycle();
            log_report(&report);

            std::thread::sleep(self.sleep_interval());
            self.transition(CycleState::Idle);
        }
    }
}

fn log_report(report: &CycleReport) {
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();

    match &report.outcome {
        CycleOutcome::Completed { stores, in_stock, rejected, delivery } => {
            info!(
                "cycle complete in {} ms: {} stores, {} in stock, {} not in stock, {}/{} notifications sent",
                elapsed_ms,
                stores,
                in_stock,
                rejected,
                delivery.delivered(),
                delivery.attempted()
            );
        }
        CycleOutcome::FetchFailed(_) | CycleOutcome::DecodeFailed(_) => {
            info!("cycle skipped after {} ms, retrying next interval", elapsed_ms);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeHttp;

    const SEARCH: &str = "http://search.example/fm";
    const RELAY: &str = "http://n.example/push";

    fn config(endpoints: &[&str]) -> WatchConfig {
        let mut config = WatchConfig::new(
            "10001",
            vec!["MODEL_A".to_string()],
            30,
            endpoints.iter().map(|e| e.to_string()).collect(),
        );
        config.search_url = SEARCH.to_string();
        config
    }

    fn one_part(quote: &str) -> String {
        format!(
            r#"{{"body":{{"content":{{"pickupMessage":{{"stores":[
                {{"storeName":"Store5","partsAvailability":[
                    {{"storePickupProductTitle":"iPhone 15","pickupSearchQuote":"{}"}}
                ]}}
            ]}}}}}}}}"#,
            quote
        )
    }

    fn notify_requests(client: &FakeHttp) -> Vec<String> {
        client
            .requested()
            .into_iter()
            .filter(|u| u.starts_with(RELAY))
            .collect()
    }

    #[test]
    fn test_daemon_starts_idle() {
        let daemon = Daemon::with_client(config(&[]), Arc::new(FakeHttp::new()));
        assert_eq!(daemon.state(), CycleState::Idle);
        assert_eq!(daemon.sleep_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_in_stock_record_is_notified_once() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, &one_part("Available, pick up today")));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        let report = daemon.run_cycle();

        let sent = notify_requests(&client);
        assert_eq!(sent.len(), 1);
        assert!(
            sent[0].starts_with("http://n.example/push/iPhone%2015/%E5%8F%96%E8%B4%A7%E6%97%B6%E9%97%B4"),
            "got {}",
            sent[0]
        );
        assert!(sent[0].ends_with("?sound=minuet"));
        assert!(report.is_completed());
        assert_eq!(daemon.state(), CycleState::Sleeping);
    }

    #[test]
    fn test_unavailable_record_is_not_notified() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, &one_part("Currently unavailable")));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        let report = daemon.run_cycle();

        assert!(notify_requests(&client).is_empty());
        match report.outcome {
            CycleOutcome::Completed { stores, in_stock, rejected, delivery } => {
                assert_eq!(stores, 1);
                assert_eq!(in_stock, 0);
                assert_eq!(rejected, 1);
                assert_eq!(delivery.attempted(), 0);
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_failure_skips_parse_and_notify() {
        let client = Arc::new(FakeHttp::new().fail_prefix(SEARCH));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        let report = daemon.run_cycle();

        assert!(matches!(report.outcome, CycleOutcome::FetchFailed(WatchError::Network { .. })));
        assert_eq!(client.requested().len(), 1, "only the search request is made");
        assert_eq!(daemon.state(), CycleState::Sleeping);
    }

    #[test]
    fn test_decode_failure_skips_notify() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 502, "<html>Bad Gateway</html>"));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        let report = daemon.run_cycle();

        assert!(matches!(report.outcome, CycleOutcome::DecodeFailed(WatchError::Decode { .. })));
        assert!(notify_requests(&client).is_empty());
        assert_eq!(daemon.state(), CycleState::Sleeping);
    }

    #[test]
    fn test_cycles_are_independent() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, &one_part("Available Today")));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        daemon.run_cycle();
        daemon.run_cycle();

        // no dedup: the same record is notified again on the next cycle
        assert_eq!(notify_requests(&client).len(), 2);
        assert_eq!(client.requested().len(), 4);
    }

    #[test]
    fn test_search_url_is_rebuilt_from_config() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, "{}"));
        let mut daemon = Daemon::with_client(config(&[]), client.clone());

        daemon.run_cycle();

        assert_eq!(
            client.requested(),
            vec![format!("{}?mt=regular&pl=true&location=10001&parts.0=MODEL_A", SEARCH)]
        );
    }

    #[test]
    fn test_each_request_carries_its_deadline() {
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, &one_part("Available Today")));
        let mut cfg = config(&[RELAY, "http://m.example/push"]);
        cfg.notify_timeout_seconds = 2;
        let mut daemon = Daemon::with_client(cfg, client.clone());

        daemon.run_cycle();

        let requests = client.requested_with_timeouts();
        assert_eq!(requests.len(), 3, "one search plus one send per relay");

        let (search_url, search_timeout) = &requests[0];
        assert!(search_url.starts_with(SEARCH));
        assert_eq!(*search_timeout, FETCH_TIMEOUT);
        assert_eq!(FETCH_TIMEOUT, Duration::from_secs(5));

        for (url, timeout) in &requests[1..] {
            assert!(!url.starts_with(SEARCH), "unexpected request {}", url);
            assert_eq!(*timeout, Duration::from_secs(2), "relay send to {}", url);
        }
    }

    #[test]
    fn test_incomplete_record_does_not_block_other_notifications() {
        // Store9 uses the keyed shape and only carries its title under
        // messageTypes.regular; Store5 is a plain in-stock record.
        let body = r#"{"body":{"content":{"pickupMessage":{"stores":[
            {"storeName":"Store5","partsAvailability":[
                {"storePickupProductTitle":"iPhone 15","pickupSearchQuote":"Available Today"}
            ]},
            {"storeName":"Store9","partsAvailability":{
                "MTUX3LL/A":{"pickupSearchQuote":"Currently unavailable",
                    "messageTypes":{"regular":{"storePickupProductTitle":"iPhone 15 Plus"}}}
            }}
        ]}}}}"#;
        let client = Arc::new(FakeHttp::new().respond(SEARCH, 200, body));
        let mut daemon = Daemon::with_client(config(&[RELAY]), client.clone());

        let report = daemon.run_cycle();

        match report.outcome {
            CycleOutcome::Completed { stores, in_stock, rejected, delivery } => {
                assert_eq!(stores, 2);
                assert_eq!(in_stock, 1);
                assert_eq!(rejected, 1);
                assert_eq!(delivery.delivered(), 1);
            }
            other => panic!("expected Completed, got {:?}", other),
        }

        let sent = notify_requests(&client);
        assert_eq!(sent.len(), 1, "Store5 is still notified");
        assert!(sent[0].contains("Store5"), "got {}", sent[0]);
    }
}
