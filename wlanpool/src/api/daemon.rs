//! The seam to the host's connection-management daemon.
//!
//! Radios that NetworkManager controls cannot be switched into AP or monitor
//! mode without it fighting back. The registry asks a [`ConnectionDaemon`]
//! which interfaces it owns and, when told to, switches it off entirely.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use zbus::blocking::Connection;

use crate::Result;
use crate::core::nm_client;

/// Outcome of reaching the daemon on the bus.
#[derive(Debug)]
pub enum DaemonLink {
    /// The bus is up and the daemon owns its name.
    Connected(Connection),
    /// No daemon to talk to: the bus is unreachable or the name is unowned.
    ServiceAbsent,
    /// The bus answered, but not in a way we understand.
    ProtocolError(zbus::Error),
}

/// What the registry needs from a connection-management daemon.
pub trait ConnectionDaemon {
    /// Whether the daemon currently manages `interface`.
    ///
    /// An absent daemon manages nothing, so this returns `false` rather than
    /// an error in that case. Malformed answers are errors.
    fn is_managed(&self, interface: &str) -> Result<bool>;

    /// Turns the daemon's networking on or off. Idempotent.
    fn set_enabled(&self, enabled: bool) -> Result<()>;

    /// Whether this client has switched the daemon off during this process.
    fn has_disabled(&self) -> bool;
}

/// [`ConnectionDaemon`] backed by NetworkManager on the system D-Bus.
///
/// Every call opens its own bus connection, so a daemon that starts or stops
/// while the registry is alive is picked up on the next call.
///
/// # Example
///
/// ```no_run
/// use wlanpool::{ConnectionDaemon, NetworkManagerDaemon};
///
/// # fn example() -> wlanpool::Result<()> {
/// let nm = NetworkManagerDaemon::new();
/// if nm.is_managed("wlan0")? {
///     nm.set_enabled(false)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct NetworkManagerDaemon {
    disabled: AtomicBool,
}

impl NetworkManagerDaemon {
    /// Creates a client that has not disabled anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reaches NetworkManager, classifying why it could not be reached.
    pub fn connect(&self) -> DaemonLink {
        nm_client::connect()
    }
}

impl ConnectionDaemon for NetworkManagerDaemon {
    fn is_managed(&self, interface: &str) -> Result<bool> {
        managed_over(self.connect(), interface, nm_client::device_managed)
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        let sent = networking_over(self.connect(), enabled, nm_client::set_networking)?;
        self.note_networking_call(enabled, sent);
        Ok(())
    }

    fn has_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }
}

impl NetworkManagerDaemon {
    /// Only an `Enable(false)` that was actually sent counts as disabling;
    /// networking that was already off stays the user's choice.
    fn note_networking_call(&self, enabled: bool, sent: bool) {
        if sent && !enabled {
            self.disabled.store(true, Ordering::Relaxed);
        }
    }
}

/// Answers a managed-state query over `link`. An absent daemon manages
/// nothing.
fn managed_over<F>(link: DaemonLink, interface: &str, query: F) -> Result<bool>
where
    F: FnOnce(&Connection, &str) -> Result<bool>,
{
    match link {
        DaemonLink::Connected(conn) => query(&conn, interface),
        DaemonLink::ServiceAbsent => {
            debug!("NetworkManager absent, treating {interface} as unmanaged");
            Ok(false)
        }
        DaemonLink::ProtocolError(e) => Err(e.into()),
    }
}

/// Applies a networking switch over `link` and returns whether a call was
/// sent. An absent daemon has nothing to switch.
fn networking_over<F>(link: DaemonLink, enabled: bool, toggle: F) -> Result<bool>
where
    F: FnOnce(&Connection, bool) -> Result<bool>,
{
    match link {
        DaemonLink::Connected(conn) => {
            let sent = toggle(&conn, enabled)?;
            if sent {
                info!("NetworkManager networking set to {enabled}");
            }
            Ok(sent)
        }
        DaemonLink::ServiceAbsent => {
            warn!("NetworkManager absent, not setting networking enabled to {enabled}");
            Ok(false)
        }
        DaemonLink::ProtocolError(e) => Err(e.into()),
    }
}

/// [`ConnectionDaemon`] for hosts without a connection manager.
///
/// Reports every interface as unmanaged and ignores enable/disable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDaemon;

impl ConnectionDaemon for NoDaemon {
    fn is_managed(&self, _interface: &str) -> Result<bool> {
        Ok(false)
    }

    fn set_enabled(&self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn has_disabled(&self) -> bool {
        false
    }
}
