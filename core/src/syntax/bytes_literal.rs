//! Byte vector literals: `base16'..'`, `base58'..'` and `base64'..'`.
//!
//! Base58 uses the Bitcoin alphabet, which is also how addresses are printed.

use base64::Engine;
use core::fmt;

/// Encoding named by a byte literal prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Base16,
    Base58,
    Base64,
}

impl Encoding {
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "base16" => Some(Encoding::Base16),
            "base58" => Some(Encoding::Base58),
            "base64" => Some(Encoding::Base64),
            _ => None,
        }
    }

    pub fn decode(self, body: &str) -> Result<Vec<u8>, DecodeError> {
        match self {
            Encoding::Base16 => hex::decode(body).map_err(|e| DecodeError {
                encoding: self,
                message: e.to_string(),
            }),
            Encoding::Base58 => decode_base58(body),
            Encoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(body)
                .map_err(|e| DecodeError {
                    encoding: self,
                    message: e.to_string(),
                }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Base16 => write!(f, "base16"),
            Encoding::Base58 => write!(f, "base58"),
            Encoding::Base64 => write!(f, "base64"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub encoding: Encoding,
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} literal: {}", self.encoding, self.message)
    }
}

/// Encode bytes as base58.
pub fn encode_base58(input: &[u8]) -> String {
    bs58::encode(input).into_string()
}

/// Decode a base58 string.
pub fn decode_base58(input: &str) -> Result<Vec<u8>, DecodeError> {
    bs58::decode(input).into_vec().map_err(|e| DecodeError {
        encoding: Encoding::Base58,
        message: match e {
            bs58::decode::Error::InvalidCharacter { character, index } => {
                format!("invalid character '{}' at position {}", character, index)
            }
            other => other.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_known_vectors() {
        assert_eq!(encode_base58(b""), "");
        assert_eq!(encode_base58(b"hello world"), "StV1DL6CwTryKyV");
        assert_eq!(encode_base58(&[0, 0, 1]), "112");
        assert_eq!(decode_base58("StV1DL6CwTryKyV").unwrap(), b"hello world");
        assert_eq!(decode_base58("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_base58_rejects_ambiguous_characters() {
        let err = decode_base58("0OIl").unwrap_err();
        assert_eq!(err.encoding, Encoding::Base58);
        assert!(err.message.contains("position 0"));
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(
            Encoding::from_prefix("base16").unwrap().decode("cafe").unwrap(),
            vec![0xca, 0xfe]
        );
        assert_eq!(
            Encoding::from_prefix("base64").unwrap().decode("aGk=").unwrap(),
            b"hi"
        );
        assert!(Encoding::from_prefix("base32").is_none());
    }
}
