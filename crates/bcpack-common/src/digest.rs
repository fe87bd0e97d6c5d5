//! MD5 content digests.
//!
//! Digests are only used to tell whether two byte ranges are equal, so the
//! collision weakness of MD5 does not matter here.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 128-bit MD5 digest, displayed as 32 lower-case hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest {
    bytes: [u8; 16],
}

impl Digest {
    /// Compute the digest of a byte slice.
    #[inline]
    pub fn of(data: &[u8]) -> Self {
        Self {
            bytes: md5::compute(data).0,
        }
    }

    /// Create a digest from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw digest bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

/// Compute the hex digest of a byte slice.
#[inline]
pub fn hash_hex(data: &[u8]) -> String {
    Digest::of(data).to_hex()
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidDigest(s.to_string()))?;
        Ok(Self { bytes })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}
