//! Public API module.
//!
//! This module contains the high-level user-facing API for the `wlanpool` crate.

pub mod daemon;
pub mod models;
pub mod radio;
pub mod registry;
