//! NetworkManager queries over the system bus.
//!
//! Reaching the bus and finding NetworkManager on it is separated from the
//! queries themselves, so an absent daemon is reported as
//! [`DaemonLink::ServiceAbsent`] instead of surfacing as a D-Bus error.

use log::debug;
use zbus::blocking::Connection;
use zbus::blocking::fdo::DBusProxy;
use zbus::names::WellKnownName;

use crate::api::daemon::DaemonLink;
use crate::api::models::AdapterError;
use crate::dbus::{NMDeviceProxyBlocking, NMProxyBlocking};
use crate::types::constants::bus::NM_BUS_NAME;
use crate::Result;

/// Opens the system bus and checks that NetworkManager owns its name.
pub(crate) fn connect() -> DaemonLink {
    let conn = match Connection::system() {
        Ok(conn) => conn,
        Err(e) => return classify(e),
    };

    let dbus = match DBusProxy::new(&conn) {
        Ok(proxy) => proxy,
        Err(e) => return DaemonLink::ProtocolError(e),
    };

    match dbus.name_has_owner(WellKnownName::from_static_str_unchecked(NM_BUS_NAME).into()) {
        Ok(true) => DaemonLink::Connected(conn),
        Ok(false) => {
            debug!("{NM_BUS_NAME} has no owner on the system bus");
            DaemonLink::ServiceAbsent
        }
        Err(e) => DaemonLink::ProtocolError(e.into()),
    }
}

/// A bus we cannot reach at all counts as no daemon; anything else is a
/// protocol failure.
fn classify(err: zbus::Error) -> DaemonLink {
    match err {
        zbus::Error::InputOutput(e) => {
            debug!("system bus unreachable: {e}");
            DaemonLink::ServiceAbsent
        }
        zbus::Error::Address(addr) => {
            debug!("system bus address unusable: {addr}");
            DaemonLink::ServiceAbsent
        }
        other => DaemonLink::ProtocolError(other),
    }
}

/// Finds the NetworkManager device named `interface` and returns its
/// `Managed` property. Interfaces NetworkManager does not know are unmanaged.
pub(crate) fn device_managed(conn: &Connection, interface: &str) -> Result<bool> {
    let nm = NMProxyBlocking::new(conn)?;
    let paths = nm
        .get_devices()
        .map_err(|e| AdapterError::DbusOperation {
            context: "failed to get device paths from NetworkManager".to_string(),
            source: e,
        })?;

    for p in paths {
        let d_proxy = NMDeviceProxyBlocking::builder(conn)
            .path(p.clone())?
            .build()?;

        let name = d_proxy
            .interface()
            .map_err(|e| AdapterError::DbusOperation {
                context: format!("failed to get interface name for device {}", p.as_str()),
                source: e,
            })?;
        if name != interface {
            continue;
        }

        return d_proxy
            .managed()
            .map_err(|e| AdapterError::DbusOperation {
                context: format!("failed to get 'managed' property for {interface}"),
                source: e,
            });
    }

    debug!("{interface} is not a NetworkManager device");
    Ok(false)
}

/// Reads `NetworkingEnabled` and calls `Enable` only when it differs.
///
/// Returns whether a call was made.
pub(crate) fn set_networking(conn: &Connection, enabled: bool) -> Result<bool> {
    let nm = NMProxyBlocking::new(conn)?;
    let current = nm
        .networking_enabled()
        .map_err(|e| AdapterError::DbusOperation {
            context: "failed to read NetworkingEnabled".to_string(),
            source: e,
        })?;
    if current == enabled {
        return Ok(false);
    }

    nm.enable(enabled)
        .map_err(|e| AdapterError::DbusOperation {
            context: format!("failed to set networking enabled to {enabled}"),
            source: e,
        })?;
    Ok(true)
}
