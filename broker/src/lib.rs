//! timebroker - long-poll command broker
//!
//! Lets a server obtain on-demand data (the current time) from clients that
//! cannot accept inbound connections and can only poll. The broker holds a
//! pending command for a client until that client's next long poll arrives,
//! then waits for the client's follow-up reply.
//!
//! # Modules
//!
//! - [`registry`] - per-client signal/value handoff slots
//! - [`broker`] - check-in, command-issue and reply-submit coordination
//! - [`timefmt`] - the fixed wire timestamp layout
//! - [`api`] - axum routes and handlers
//! - [`cli`] - command-line interface

pub mod api;
pub mod broker;
pub mod cli;
pub mod error;
pub mod registry;
pub mod timefmt;

pub use broker::{Broker, BrokerConfig};
pub use error::BrokerError;
pub use timefmt::WireTime;
