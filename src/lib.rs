//! odyssey-link: a status-reconciliation client for the Odyssey resin
//! print engine. Polls the engine's HTTP status endpoint at an adaptive
//! cadence, drives a local job-tracking state machine, and relays
//! start/cancel/pause/resume commands.

pub mod bridge;
pub mod config;
pub mod gateway;
pub mod remote;
pub mod stats;
pub mod tracker;
pub mod web;
