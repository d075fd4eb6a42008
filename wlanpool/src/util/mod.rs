//! Utility helpers.

pub(crate) mod mac;
