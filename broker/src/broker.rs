//! Long-poll coordination core
//!
//! Three operations over the [`ClientRegistry`](crate::registry::ClientRegistry):
//!
//! - `check_in` parks a client's long poll until a command signal arrives or
//!   the check-in ceiling elapses (the ceiling is the normal "nothing to do"
//!   outcome, not an error);
//! - `request_value` issues a command signal to a client and waits, bounded
//!   by the reply ceiling, for that client's value;
//! - `submit_value` accepts the client's reply and hands it to whoever is
//!   waiting, dropping it when nobody is.
//!
//! Signal and value delivery are not transactionally linked. A second
//! `request_value` racing the first gets last-write-wins semantics, and a
//! value that arrives after its waiter timed out is dropped by the next
//! cycle. Both are accepted looseness, not defects to guard against here.

use std::time::Duration;

use tracing::debug;

use crate::error::BrokerError;
use crate::registry::ClientRegistry;
use crate::timefmt::WireTime;

/// Wait ceilings for the two suspension points.
#[derive(Debug, Clone, Copy)]
pub struct BrokerConfig {
    /// How long a check-in is parked waiting for a command.
    pub check_in_ceiling: Duration,
    /// How long a command issuer waits for the client's reply.
    pub reply_ceiling: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            check_in_ceiling: Duration::from_secs(60),
            reply_ceiling: Duration::from_secs(5),
        }
    }
}

/// The coordination broker. One instance per process, shared across all
/// request tasks.
pub struct Broker {
    registry: ClientRegistry,
    config: BrokerConfig,
}

impl Broker {
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Construct with custom ceilings (tests shorten them).
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            registry: ClientRegistry::new(),
            config,
        }
    }

    /// Park the calling client until a command signal arrives or the
    /// check-in ceiling elapses. True means a command was issued and the
    /// client should report its time now.
    pub async fn check_in(&self, id: &str) -> bool {
        let slot = self.registry.signal_slot(id);
        debug!(%id, "check_in: parked waiting for a command");
        let signaled = slot.take(self.config.check_in_ceiling).await.is_some();
        debug!(%id, signaled, "check_in: released");
        signaled
    }

    /// Issue a command to `id` and wait for its reply.
    ///
    /// Fails immediately with `UnknownClient` if the client has never
    /// checked in, and with `ReplyTimeout` if no value lands within the
    /// reply ceiling. A late value is dropped by the next cycle.
    pub async fn request_value(&self, id: &str) -> Result<WireTime, BrokerError> {
        // The value slot must exist before the signal goes out, or a fast
        // replier would have nowhere to deliver.
        let values = self.registry.value_slot(id);

        let Some(signals) = self.registry.known_signal_slot(id) else {
            debug!(%id, "request_value: client has never checked in");
            return Err(BrokerError::UnknownClient { id: id.to_string() });
        };

        // A value left over from an expired cycle is stale; drop it so the
        // reply we wait on matches the signal we are about to send.
        values.clear();

        if !signals.offer(()) {
            debug!(%id, "request_value: signal already pending, not queued");
        }

        debug!(%id, "request_value: signal issued, waiting for reply");
        match values.take(self.config.reply_ceiling).await {
            Some(ts) => {
                debug!(%id, ts = %ts, "request_value: reply received");
                Ok(ts)
            }
            None => Err(BrokerError::ReplyTimeout {
                id: id.to_string(),
                ceiling: self.config.reply_ceiling,
            }),
        }
    }

    /// Accept a client's reply to a previously issued command.
    ///
    /// The raw timestamp is validated against the wire layout before any
    /// delivery is attempted. Delivery itself never blocks; with no waiter
    /// the value is dropped.
    pub fn submit_value(&self, id: &str, raw: &str) -> Result<(), BrokerError> {
        let ts = WireTime::parse(raw).map_err(|source| BrokerError::MalformedTimestamp {
            input: raw.to_string(),
            source,
        })?;

        let delivered = self.registry.value_slot(id).offer(ts);
        debug!(%id, delivered, "submit_value: reply handed off");
        Ok(())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
