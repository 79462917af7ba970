use crate::{AddressReason, ValidationError};
use alloy_primitives::Address;

/// Separator used by [`validate_address_list`] when the caller has no preference.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Validate a 20-byte hex address.
///
/// Accepts `0x`/`0X` followed by exactly 40 hex digits, surrounding whitespace
/// ignored. All-lowercase and all-uppercase digits are accepted as-is; mixed
/// case must be a valid EIP-55 checksum.
pub fn validate_address(input: &str) -> Result<Address, ValidationError> {
    let trimmed = input.trim();
    let reject = |reason| ValidationError::InvalidAddress {
        input: input.to_string(),
        reason,
    };

    let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    else {
        return Err(reject(AddressReason::MissingPrefix));
    };

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(reject(AddressReason::NotHex));
    }

    if hex.len() != 40 {
        return Err(reject(AddressReason::WrongLength));
    }

    let address: Address = hex
        .parse()
        .map_err(|_| reject(AddressReason::NotHex))?;

    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && address.to_checksum(None)[2..] != *hex {
        return Err(reject(AddressReason::BadChecksum));
    }

    Ok(address)
}

/// Split `input` on `separator` and validate every non-empty entry.
///
/// Returns the valid addresses in input order alongside the rejections.
pub fn split_address_list(
    input: &str,
    separator: &str,
) -> (Vec<Address>, Vec<ValidationError>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for entry in input.split(separator).map(str::trim).filter(|e| !e.is_empty()) {
        match validate_address(entry) {
            Ok(address) => valid.push(address),
            Err(e) => rejected.push(e),
        }
    }

    (valid, rejected)
}

/// Validate a separated list of addresses, keeping only the valid ones.
///
/// An empty result means nothing usable was entered; callers treat that as a
/// user error.
pub fn validate_address_list(input: &str, separator: &str) -> Vec<Address> {
    split_address_list(input, separator).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_valid_addresses() {
        let expected = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(validate_address(CHECKSUMMED).unwrap(), expected);
        assert_eq!(
            validate_address(&CHECKSUMMED.to_lowercase()).unwrap(),
            expected
        );
        assert_eq!(
            validate_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap(),
            expected
        );
        assert_eq!(
            validate_address(&format!("  {CHECKSUMMED}\n")).unwrap(),
            expected
        );
    }

    #[test]
    fn test_malformed_addresses() {
        let cases = [
            ("", AddressReason::MissingPrefix),
            ("not-an-address", AddressReason::MissingPrefix),
            ("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", AddressReason::MissingPrefix),
            ("0x", AddressReason::WrongLength),
            ("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beae", AddressReason::WrongLength),
            ("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00", AddressReason::WrongLength),
            ("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaeg", AddressReason::NotHex),
            ("0x+aaeb6053f3e94c9b9a09f33669435e7ef1beaed", AddressReason::NotHex),
            ("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", AddressReason::BadChecksum),
        ];

        for (input, reason) in cases {
            assert_eq!(
                validate_address(input),
                Err(ValidationError::InvalidAddress {
                    input: input.to_string(),
                    reason,
                }),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_list_keeps_valid_entries() {
        let a = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let b = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
        let input = format!("{a}, not-an-address ,{b},, 0x1234");

        let list = validate_address_list(&input, DEFAULT_SEPARATOR);
        assert_eq!(
            list,
            vec![Address::repeat_byte(0xaa), Address::repeat_byte(0xbb)]
        );

        let (_, rejected) = split_address_list(&input, DEFAULT_SEPARATOR);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_list_custom_separator() {
        let input = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\n0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
        assert_eq!(validate_address_list(input, "\n").len(), 2);
        // Wrong separator: the whole line is one malformed entry
        assert!(validate_address_list(input, ";").is_empty());
    }

    #[test]
    fn test_list_all_invalid_is_empty() {
        assert!(validate_address_list("foo, bar", DEFAULT_SEPARATOR).is_empty());
        assert!(validate_address_list("", DEFAULT_SEPARATOR).is_empty());
    }
}
