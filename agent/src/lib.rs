//! timebroker-agent - polling client for the timebroker
//!
//! Repeatedly holds a long poll open against the broker; when told a command
//! was issued, reads the local current time, reports it, and resumes polling.
//! Transport and protocol failures are retried with backoff rather than
//! aborting the process.

pub mod cli;
pub mod poller;
