//! Core internal logic for adapter management.
//!
//! This module contains the internal implementation details for discovering
//! adapters, probing their capabilities, choosing interfaces for a role,
//! driving the radio, and talking to NetworkManager.

pub(crate) mod discovery;
pub(crate) mod lifecycle;
pub(crate) mod nm_client;
pub(crate) mod probe;
pub(crate) mod selection;
