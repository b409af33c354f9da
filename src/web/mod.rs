//! Web command surface for the bridge.

pub mod api;
pub mod models;
