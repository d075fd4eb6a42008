//! Random MAC address generation.

use crate::api::models::MacAddress;
use crate::types::constants::mac::RANDOM_PREFIX;

/// Generates a MAC address with the fixed prefix and three random octets.
pub fn random_mac_address() -> MacAddress {
    random_mac_address_from(rand::random::<u8>)
}

/// Like [`random_mac_address`], drawing the last three octets from `next_octet`.
///
/// ```rust
/// let mut draws = [10u8, 100, 200].into_iter();
/// let mac = wlanpool::random_mac_address_from(|| draws.next().unwrap_or(0));
/// assert_eq!(mac.to_string(), "00:00:00:0a:64:c8");
/// ```
pub fn random_mac_address_from(mut next_octet: impl FnMut() -> u8) -> MacAddress {
    let [a, b, c] = RANDOM_PREFIX;
    MacAddress::new([a, b, c, next_octet(), next_octet(), next_octet()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_fill_last_three_octets_in_order() {
        let mut draws = vec![10u8, 100, 200].into_iter();
        let mac = random_mac_address_from(|| draws.next().unwrap());
        assert_eq!(mac.to_string(), "00:00:00:0a:64:c8");
    }

    #[test]
    fn generated_addresses_keep_prefix_and_parse() {
        for _ in 0..32 {
            let mac = random_mac_address();
            assert_eq!(mac.octets()[..3], RANDOM_PREFIX);
            assert_eq!(mac.to_string().parse::<MacAddress>().unwrap(), mac);
        }
    }
}
