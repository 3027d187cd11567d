//! Syntax gatekeepers for wallet addresses and transaction hashes.
//!
//! Both checks are total: any input, including the empty string, yields a
//! boolean. Neither validates an EIP-55 checksum.

/// Number of hex digits in an EVM account address.
pub const WALLET_ADDRESS_HEX_LEN: usize = 40;

/// Number of hex digits in an EVM transaction hash.
pub const TRANSACTION_HASH_HEX_LEN: usize = 64;

/// Returns `true` iff `address` is `0x` followed by exactly 40 hex digits.
#[must_use]
pub fn is_valid_wallet_address(address: &str) -> bool {
    is_prefixed_hex(address, WALLET_ADDRESS_HEX_LEN)
}

/// Returns `true` iff `hash` is `0x` followed by exactly 64 hex digits.
#[must_use]
pub fn is_valid_transaction_hash(hash: &str) -> bool {
    is_prefixed_hex(hash, TRANSACTION_HASH_HEX_LEN)
}

/// Canonical form of a hex identifier: trimmed and lowercased.
///
/// Hex digits are case-insensitive, so `0xAB…` and `0xab…` name the same
/// transaction. Storing the canonical form keeps the uniqueness constraint
/// on transaction hashes meaningful.
#[must_use]
pub fn canonical_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn is_prefixed_hex(value: &str, digits: usize) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == digits && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_wallet_address() {
        assert!(is_valid_wallet_address(
            "0x39d36a64a1e16e52d8353eff82ace7c96502f269"
        ));
        assert!(is_valid_wallet_address(
            "0x39D36A64A1E16E52D8353EFF82ACE7C96502F269"
        ));
    }

    #[test]
    fn rejects_malformed_wallet_addresses() {
        assert!(!is_valid_wallet_address(""));
        assert!(!is_valid_wallet_address("0x123"));
        assert!(!is_valid_wallet_address("0x"));
        assert!(!is_valid_wallet_address(
            "39d36a64a1e16e52d8353eff82ace7c96502f269"
        ));
        assert!(!is_valid_wallet_address(
            "0X39d36a64a1e16e52d8353eff82ace7c96502f269"
        ));
        assert!(!is_valid_wallet_address(
            "0x39d36a64a1e16e52d8353eff82ace7c96502f26g"
        ));
        assert!(!is_valid_wallet_address(
            "0x39d36a64a1e16e52d8353eff82ace7c96502f2690"
        ));
    }

    #[test]
    fn transaction_hash_requires_exactly_64_digits() {
        let ok = format!("0x{}", "a".repeat(64));
        let short = format!("0x{}", "a".repeat(63));
        let long = format!("0x{}", "a".repeat(65));
        assert!(is_valid_transaction_hash(&ok));
        assert!(!is_valid_transaction_hash(&short));
        assert!(!is_valid_transaction_hash(&long));
        assert!(!is_valid_transaction_hash(""));
        assert!(!is_valid_transaction_hash(&"a".repeat(66)));
    }

    #[test]
    fn wallet_address_is_not_a_transaction_hash() {
        let wallet = format!("0x{}", "1".repeat(40));
        assert!(!is_valid_transaction_hash(&wallet));
    }

    #[test]
    fn canonical_hex_lowercases_and_trims() {
        assert_eq!(canonical_hex(" 0xABcd "), "0xabcd");
    }
}
