//! Polling loop against the broker
//!
//! One long poll at a time: park on `/client-long-poll`, and when the broker
//! says a command was issued, report the local time on `/client-time` before
//! polling again. Failures are classified: transport problems (connect,
//! timeout) and bad responses both back off and retry; only an unusable
//! broker address is fatal, and that is caught at construction.

use std::time::Duration;

use eyre::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use timebroker::WireTime;

/// The broker holds a poll open for up to 60 seconds; the HTTP timeout must
/// comfortably outlast that.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from one poll or submit exchange
#[derive(Debug, Error)]
pub enum PollError {
    /// Could not reach the broker (connect failure, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Reached the broker but the exchange itself failed (bad status,
    /// undecodable body).
    #[error("protocol error: {0}")]
    Protocol(#[source] reqwest::Error),

    /// The broker accepted the request but rejected the submission.
    #[error("broker rejected submission: {0}")]
    Rejected(String),
}

impl PollError {
    fn classify(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Transport(err)
        } else {
            Self::Protocol(err)
        }
    }

    /// Transport errors are the "broker is down or unreachable" class.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[derive(Debug, Deserialize)]
struct CheckInBody {
    ask_for_time: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    error: bool,
    msg: String,
}

/// Exponential backoff with jitter, reset on success.
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new() -> Self {
        Self::with_bounds(Duration::from_millis(500), Duration::from_secs(30))
    }

    pub fn with_bounds(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to sleep before the next attempt. Doubles per call up to the
    /// cap, with up to 25% added jitter.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.max);
        base + base.mul_f64(rand::random::<f64>() * 0.25)
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client bound to one broker address and one client ID.
pub struct BrokerClient {
    http: reqwest::Client,
    base: reqwest::Url,
    client_id: String,
}

impl BrokerClient {
    pub fn new(host: &str, port: u16, client_id: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        let base = reqwest::Url::parse(&format!("http://{host}:{port}/"))
            .context("Invalid broker address")?;
        if base.cannot_be_a_base() {
            eyre::bail!("Invalid broker address: {base}");
        }

        Ok(Self {
            http,
            base,
            client_id: client_id.to_string(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// URL an operator would use to query this client's time, for the
    /// startup banner.
    pub fn query_url(&self) -> reqwest::Url {
        self.endpoint(&["clients", &self.client_id, "system-time"])
    }

    // Base is validated as a hierarchical URL in new(), so segments always
    // apply; they are percent-encoded as needed (the timestamp has spaces).
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// One long poll. True means the broker issued a command and the time
    /// should be reported now.
    pub async fn check_in(&self) -> Result<bool, PollError> {
        let url = self.endpoint(&["client-long-poll", &self.client_id]);
        debug!(%url, "checking in");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(PollError::classify)?;
        let body: CheckInBody = resp.json().await.map_err(PollError::classify)?;

        Ok(body.ask_for_time)
    }

    /// Report a timestamp in reply to an issued command.
    pub async fn submit_time(&self, ts: &WireTime) -> Result<(), PollError> {
        let url = self.endpoint(&["client-time", &self.client_id, &ts.to_string()]);
        debug!(%url, "submitting time");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(PollError::classify)?;
        let body: SubmitBody = resp.json().await.map_err(PollError::classify)?;

        if body.error {
            return Err(PollError::Rejected(body.msg));
        }
        Ok(())
    }
}

/// Poll until the process is killed. Every failure backs off and retries;
/// successful exchanges reset the backoff.
pub async fn run(client: &BrokerClient) {
    let mut backoff = Backoff::new();

    loop {
        match client.check_in().await {
            Ok(true) => {
                let now = WireTime::now_utc();
                match client.submit_time(&now).await {
                    Ok(()) => {
                        backoff.reset();
                        info!(ts = %now, "reported system time");
                    }
                    Err(err) => {
                        warn!(%err, "failed to report system time");
                        sleep(backoff.next_delay()).await;
                    }
                }
            }
            // A lapsed poll is the normal idle outcome; go straight back.
            Ok(false) => backoff.reset(),
            Err(err) if err.is_transport() => {
                warn!(%err, "broker unreachable, backing off");
                sleep(backoff.next_delay()).await;
            }
            Err(err) => {
                warn!(%err, "bad exchange with broker, backing off");
                sleep(backoff.next_delay()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let mut backoff = Backoff::with_bounds(Duration::from_millis(100), Duration::from_millis(400));

        // Jitter adds at most 25%, so each delay is within [base, base*1.25].
        let first = backoff.next_delay();
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));

        let second = backoff.next_delay();
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(250));

        let third = backoff.next_delay();
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));

        // Capped from here on.
        let fourth = backoff.next_delay();
        assert!(fourth >= Duration::from_millis(400) && fourth <= Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_reset_returns_to_initial() {
        let mut backoff = Backoff::with_bounds(Duration::from_millis(100), Duration::from_secs(10));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();

        let delay = backoff.next_delay();
        assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(125));
    }

    #[test]
    fn test_endpoint_encodes_timestamp_segment() {
        let client = BrokerClient::new("localhost", 7777, "c1").unwrap();
        let url = client.endpoint(&["client-time", "c1", "Mon, 02 Jan 2006 15:04:05 MST"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:7777/client-time/c1/Mon,%2002%20Jan%202006%2015:04:05%20MST"
        );
    }

    #[test]
    fn test_query_url_names_the_client() {
        let client = BrokerClient::new("localhost", 7777, "c1").unwrap();
        assert_eq!(
            client.query_url().as_str(),
            "http://localhost:7777/clients/c1/system-time"
        );
    }

    #[test]
    fn test_new_rejects_garbage_host() {
        assert!(BrokerClient::new("not a host", 7777, "c1").is_err());
    }

    #[tokio::test]
    async fn test_connect_failure_classified_as_transport() {
        // Nothing listens on this port.
        let client = BrokerClient::new("127.0.0.1", 1, "c1").unwrap();
        let err = client.check_in().await.unwrap_err();
        assert!(err.is_transport(), "got: {err}");
    }
}
