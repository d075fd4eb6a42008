//! D-Bus proxy interfaces for NetworkManager.
//!
//! This module contains low-level blocking D-Bus proxy definitions for
//! communicating with NetworkManager over the system bus.

mod device;
mod main_nm;

pub(crate) use device::NMDeviceProxy as NMDeviceProxyBlocking;
pub(crate) use main_nm::NMProxy as NMProxyBlocking;
