//! Constants for driver error codes and NetworkManager D-Bus names.
//!
//! The numeric codes are the errno values the radio control layer reports
//! alongside its error messages.

/// Driver error codes the registry interprets. Every other code is passed
/// through to the caller untouched.
pub mod errno {
    /// The device disappeared between enumeration and use (`ENODEV`).
    pub const NO_SUCH_DEVICE: i32 = 19;
    /// The driver rejected an argument, e.g. a malformed MAC (`EINVAL`).
    pub const INVALID_ARGUMENT: i32 = 22;
    /// The device does not speak nl80211 (`EPROTONOSUPPORT`).
    pub const UNSUPPORTED_DEVICE: i32 = 93;
}

/// NetworkManager bus coordinates.
pub mod bus {
    pub const NM_BUS_NAME: &str = "org.freedesktop.NetworkManager";
}

/// MAC address constants.
pub mod mac {
    /// Prefix used for generated addresses; the remaining octets are random.
    pub const RANDOM_PREFIX: [u8; 3] = [0x00, 0x00, 0x00];
}
