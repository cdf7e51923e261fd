//! Identity string codecs: bech32 `npub` and raw hex public keys.

use bech32::{Bech32, Hrp};
use thiserror::Error;

use crate::domain::PublicKeyHex;

const NPUB_HRP: &str = "npub";
const URI_PREFIX: &str = "nostr:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Invalid npub: {0}")]
    InvalidNpub(String),
    #[error("Invalid public key: {0}")]
    InvalidHex(String),
}

pub fn npub_to_hex(npub: &str) -> Result<PublicKeyHex, IdentityError> {
    let npub = npub.trim();
    let (hrp, data) =
        bech32::decode(npub).map_err(|err| IdentityError::InvalidNpub(err.to_string()))?;

    if !hrp.as_str().eq_ignore_ascii_case(NPUB_HRP) {
        return Err(IdentityError::InvalidNpub(format!(
            "expected '{NPUB_HRP}' prefix, got '{}'",
            hrp.as_str()
        )));
    }

    let bytes: [u8; 32] = data.as_slice().try_into().map_err(|_| {
        IdentityError::InvalidNpub(format!("expected 32 bytes, got {}", data.len()))
    })?;

    Ok(PublicKeyHex::from_bytes(&bytes))
}

pub fn hex_to_npub(pubkey: &PublicKeyHex) -> Result<String, IdentityError> {
    let bytes = hex::decode(pubkey.as_str())
        .map_err(|err| IdentityError::InvalidHex(err.to_string()))?;
    let hrp = Hrp::parse(NPUB_HRP).map_err(|err| IdentityError::InvalidNpub(err.to_string()))?;
    bech32::encode::<Bech32>(hrp, &bytes).map_err(|err| IdentityError::InvalidNpub(err.to_string()))
}

pub fn is_valid_npub(value: &str) -> bool {
    value.trim().starts_with("npub1") && npub_to_hex(value).is_ok()
}

/// Strips an optional `nostr:` URI prefix.
pub fn strip_uri_prefix(value: &str) -> &str {
    let value = value.trim();
    match value.get(..URI_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(URI_PREFIX) => &value[URI_PREFIX.len()..],
        _ => value,
    }
}

/// Accepts an npub or a hex key, optionally behind `nostr:`.
pub fn parse_public_key(value: &str) -> Result<PublicKeyHex, IdentityError> {
    let value = strip_uri_prefix(value);
    if value.starts_with("npub1") {
        npub_to_hex(value)
    } else {
        PublicKeyHex::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIP-19 reference vector.
    const HEX: &str = "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e";
    const NPUB: &str = "npub10elfcs4fr0l0r8af98jlmgdh9c8tcxjvz9qkw038js35mp4dma8qzvjptg";

    #[test]
    fn decodes_reference_npub() {
        assert_eq!(npub_to_hex(NPUB).expect("decode").as_str(), HEX);
    }

    #[test]
    fn encodes_reference_hex() {
        let key = PublicKeyHex::parse(HEX).expect("hex");
        assert_eq!(hex_to_npub(&key).expect("encode"), NPUB);
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut corrupted = NPUB.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert!(!is_valid_npub(&corrupted));
        assert!(matches!(
            npub_to_hex(&corrupted),
            Err(IdentityError::InvalidNpub(_))
        ));
    }

    #[test]
    fn rejects_other_human_readable_parts() {
        let key = PublicKeyHex::parse(HEX).expect("hex");
        let bytes = hex::decode(key.as_str()).expect("bytes");
        let nsec = bech32::encode::<Bech32>(Hrp::parse("nsec").expect("hrp"), &bytes)
            .expect("encode");
        assert!(npub_to_hex(&nsec).is_err());
        assert!(!is_valid_npub(&nsec));
    }

    #[test]
    fn parse_public_key_accepts_uri_prefix_and_hex() {
        let via_uri = parse_public_key(&format!("nostr:{NPUB}")).expect("uri");
        let via_hex = parse_public_key(HEX).expect("hex");
        assert_eq!(via_uri, via_hex);
        assert!(parse_public_key("not-a-key").is_err());
    }
}
