//! Well-known program IDs used by compressed NFT instructions.

/// Bubblegum: `BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY`
pub const BUBBLEGUM_PROGRAM_ID: [u8; 32] = [
    0x98, 0x8b, 0x80, 0xeb, 0x79, 0x35, 0x28, 0x69, 0xb2, 0x24, 0x74, 0x5f, 0x59, 0xdd, 0xbf,
    0x8a, 0x26, 0x58, 0xca, 0x13, 0xdc, 0x68, 0x81, 0x21, 0x26, 0x35, 0x1c, 0xae, 0x07, 0xc1,
    0xa5, 0xa5,
];

/// SPL Account Compression: `cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK`
pub const ACCOUNT_COMPRESSION_PROGRAM_ID: [u8; 32] = [
    0x09, 0x2a, 0x13, 0xee, 0x95, 0xc4, 0x1c, 0xba, 0x08, 0xa6, 0x7f, 0x5a, 0xc6, 0x7e, 0x8d,
    0xf7, 0xe1, 0xda, 0x11, 0x62, 0x5e, 0x1d, 0x64, 0x13, 0x7f, 0x8f, 0x4f, 0x23, 0x83, 0x03,
    0x7f, 0x14,
];

/// SPL Noop, used by Bubblegum as its log wrapper:
/// `noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV`
pub const NOOP_PROGRAM_ID: [u8; 32] = [
    0x0b, 0xbc, 0x0f, 0xc0, 0xbb, 0x47, 0xca, 0x2f, 0x74, 0xc4, 0x11, 0x2e, 0x94, 0xab, 0x13,
    0xcf, 0xa3, 0xc6, 0x34, 0xe5, 0xdc, 0x17, 0xea, 0xcb, 0x03, 0xcd, 0x1a, 0x23, 0xcd, 0x7e,
    0x78, 0x7c,
];

/// Token Metadata: `metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s`
pub const TOKEN_METADATA_PROGRAM_ID: [u8; 32] = [
    0x0b, 0x70, 0x65, 0xb1, 0xe3, 0xd1, 0x7c, 0x45, 0x38, 0x9d, 0x52, 0x7f, 0x6b, 0x04, 0xc3,
    0xcd, 0x58, 0xb8, 0x6c, 0x73, 0x1a, 0xa0, 0xfd, 0xb5, 0x49, 0xb6, 0xd1, 0xbc, 0x03, 0xf8,
    0x29, 0x46,
];

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::bytes_to_address;

    #[test]
    fn program_ids_match_base58() {
        assert_eq!(
            bytes_to_address(&BUBBLEGUM_PROGRAM_ID),
            "BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY"
        );
        assert_eq!(
            bytes_to_address(&ACCOUNT_COMPRESSION_PROGRAM_ID),
            "cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK"
        );
        assert_eq!(
            bytes_to_address(&NOOP_PROGRAM_ID),
            "noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV"
        );
        assert_eq!(
            bytes_to_address(&TOKEN_METADATA_PROGRAM_ID),
            "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s"
        );
        assert_eq!(
            bytes_to_address(&SYSTEM_PROGRAM_ID),
            "11111111111111111111111111111111"
        );
    }
}
