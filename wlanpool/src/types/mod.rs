//! Type definitions and constants.
//!
//! This module contains driver error codes and NetworkManager constants.

pub(crate) mod constants;
