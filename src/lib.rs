//! Least-cost call routing.
//!
//! Resolves the price of each phone number from the longest matching
//! dialing prefix in a route table, keeping only the cheapest price per
//! distinct prefix.
//!
//! - [`ingest`] parses `prefix,price` route records and phone numbers
//! - [`router`] holds the prefix cost tables and the batch resolver
//! - [`output`] serializes resolved costs
//! - [`config`] and [`telemetry`] carry the runtime settings and logging

pub mod config;
pub mod ingest;
pub mod output;
pub mod router;
pub mod telemetry;
