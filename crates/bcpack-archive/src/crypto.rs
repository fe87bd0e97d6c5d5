//! Archive decryption.
//!
//! Two ciphers are in play:
//!
//! - `.list` indexes use AES-128-ECB with PKCS#7 padding and one global key.
//! - `.pack` segments use AES-128-CBC with a per-locale key/IV, no cipher-layer
//!   padding, and a packer-specific trailing padding that is stripped by table.

use bcpack_common::{Category, Locale};
use cipher::block_padding::{NoPadding, Pkcs7};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockDecryptMut, KeyInit, KeyIvInit};

use crate::{Content, Error, FileDescriptor, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// The AES-128 key for every `.list` index, regardless of locale.
///
/// Hardcoded in the game client; not a secret.
pub const LIST_KEY: [u8; 16] = *b"b484857901742afc";

/// Formats under [`Category::ImageDataLocal`] that are stored as plain text.
pub const PLAINTEXT_FORMATS: [&str; 3] = ["imgcut", "maanim", "mamodel"];

/// Extension of segments returned as raw bytes instead of text.
pub const BINARY_IMAGE_EXTENSION: &str = ".png";

/// Key and IV for one locale's pack segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleKeys {
    pub key: [u8; 16],
    pub iv: [u8; 16],
}

const JP_KEYS: LocaleKeys = LocaleKeys {
    key: [
        0xD7, 0x54, 0x86, 0x8D, 0xE8, 0x9D, 0x71, 0x7F, 0xA9, 0xE7, 0xB0, 0x6D, 0xA4, 0x5A, 0xE9, 0xE3,
    ],
    iv: [
        0x40, 0xB2, 0x13, 0x1A, 0x9F, 0x38, 0x8A, 0xD4, 0xE5, 0x00, 0x2A, 0x98, 0x11, 0x8F, 0x61, 0x28,
    ],
};

const TW_KEYS: LocaleKeys = LocaleKeys {
    key: [
        0x31, 0x3D, 0x98, 0x58, 0xA7, 0xFB, 0x93, 0x9D, 0xEF, 0x1D, 0x7D, 0x85, 0x96, 0x29, 0x08, 0x7D,
    ],
    iv: [
        0x0E, 0x37, 0x43, 0xEB, 0x53, 0xBF, 0x59, 0x44, 0xD1, 0xAE, 0x7E, 0x10, 0xC2, 0xE5, 0x4B, 0xDF,
    ],
};

const EN_KEYS: LocaleKeys = LocaleKeys {
    key: [
        0x0A, 0xD3, 0x9E, 0x4A, 0xEA, 0xF5, 0x5A, 0xA7, 0x17, 0xFE, 0xB1, 0x82, 0x5E, 0xDE, 0xF5, 0x21,
    ],
    iv: [
        0xD1, 0xD7, 0xE7, 0x08, 0x09, 0x19, 0x41, 0xD9, 0x0C, 0xDF, 0x8A, 0xA5, 0xF3, 0x0B, 0xB0, 0xC2,
    ],
};

const KR_KEYS: LocaleKeys = LocaleKeys {
    key: [
        0xBE, 0xA5, 0x85, 0xEB, 0x99, 0x32, 0x16, 0xEF, 0x4D, 0xCB, 0x88, 0xB6, 0x25, 0xC3, 0xDF, 0x98,
    ],
    iv: [
        0x9B, 0x13, 0xC2, 0x12, 0x1D, 0x39, 0xF1, 0x35, 0x3A, 0x12, 0x5F, 0xED, 0x98, 0x69, 0x66, 0x49,
    ],
};

/// The pack key/IV for a locale.
#[inline]
pub const fn locale_keys(locale: Locale) -> LocaleKeys {
    match locale {
        Locale::Jp => JP_KEYS,
        Locale::Tw => TW_KEYS,
        Locale::En => EN_KEYS,
        Locale::Kr => KR_KEYS,
    }
}

/// Number of trailing bytes the packer's padding occupies, given the last
/// byte of a decrypted segment.
///
/// `0x00` and `0x01` both mean one byte; `0x02..=0x10` mean that many bytes;
/// anything else means the segment is unpadded.
#[inline]
pub const fn padding_len(last_byte: u8) -> usize {
    match last_byte {
        0x00 => 1,
        0x01..=0x10 => last_byte as usize,
        _ => 0,
    }
}

/// Strip the packer's trailing padding from a decrypted segment.
pub fn strip_padding(data: &[u8]) -> &[u8] {
    match data.last() {
        Some(&last) => {
            let count = padding_len(last).min(data.len());
            &data[..data.len() - count]
        }
        None => data,
    }
}

/// Decrypt a `.list` index to its UTF-8 text.
///
/// Empty input yields empty text.
pub fn decrypt_list(data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Decode(format!(
            "ciphertext length {} is not a multiple of {}",
            data.len(),
            BLOCK_SIZE
        )));
    }

    let cipher = aes::Aes128::new(GenericArray::from_slice(&LIST_KEY));
    let mut buffer = data.to_vec();
    let len = BlockDecrypt::decrypt_padded::<Pkcs7>(&cipher, &mut buffer)
        .map_err(|_| Error::Decode("invalid PKCS#7 padding".to_string()))?
        .len();
    buffer.truncate(len);

    String::from_utf8(buffer).map_err(|e| Error::Decode(format!("index is not UTF-8: {}", e)))
}

/// Decrypt a pack segment with a locale's key, then strip padding.
///
/// The data length must be a multiple of the AES block size.
pub fn decrypt_segment(locale: Locale, data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::Decryption(format!(
            "segment length {} is not a multiple of {}",
            data.len(),
            BLOCK_SIZE
        )));
    }

    let keys = locale_keys(locale);
    let decryptor = Aes128CbcDec::new(
        GenericArray::from_slice(&keys.key),
        GenericArray::from_slice(&keys.iv),
    );

    let mut buffer = data.to_vec();
    decryptor
        .decrypt_padded_mut::<NoPadding>(&mut buffer)
        .map_err(|_| Error::Decryption("decryption failed".to_string()))?;

    let len = strip_padding(&buffer).len();
    buffer.truncate(len);
    Ok(buffer)
}

/// Whether a file is stored unencrypted in the pack.
pub fn is_plaintext(category: Category, entry: &FileDescriptor) -> bool {
    category == Category::ImageDataLocal && PLAINTEXT_FORMATS.contains(&entry.extension())
}

/// Decrypt one file's segment out of a pack buffer.
pub fn decrypt_range(
    locale: Locale,
    category: Category,
    pack: &[u8],
    entry: &FileDescriptor,
) -> Result<Content> {
    let segment = entry.slice(pack)?;

    if is_plaintext(category, entry) {
        return Ok(Content::text_lossy(segment));
    }

    let data = decrypt_segment(locale, segment)?;

    if entry.name.ends_with(BINARY_IMAGE_EXTENSION) {
        Ok(Content::Bytes(data))
    } else {
        Ok(Content::text_lossy(&data))
    }
}
