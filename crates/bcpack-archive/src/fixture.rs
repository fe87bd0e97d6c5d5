//! Encryption helpers for building archive fixtures.
//!
//! The reader never writes archives; these exist so tests in this and
//! downstream crates can produce realistic `.list`/`.pack` bytes.

use bcpack_common::Locale;
use cipher::block_padding::{NoPadding, Padding, Pkcs7};
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};

use crate::crypto::{locale_keys, BLOCK_SIZE, LIST_KEY};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// Copy `data` into a buffer with room for one more block of padding.
fn padded_buffer(data: &[u8]) -> Vec<u8> {
    let mut buffer = vec![0u8; (data.len() / BLOCK_SIZE + 1) * BLOCK_SIZE];
    buffer[..data.len()].copy_from_slice(data);
    buffer
}

/// ECB-encrypt `data` with the index key.
fn encrypt_list_with<P: Padding<cipher::consts::U16>>(data: &[u8]) -> Vec<u8> {
    let cipher = aes::Aes128::new(GenericArray::from_slice(&LIST_KEY));
    let mut buffer = padded_buffer(data);
    let len = BlockEncrypt::encrypt_padded::<P>(&cipher, &mut buffer, data.len())
        .expect("buffer has room for padding")
        .len();
    buffer.truncate(len);
    buffer
}

/// ECB-encrypt data whose length is already a multiple of the block size.
pub fn encrypt_list_unpadded(data: &[u8]) -> Vec<u8> {
    assert_eq!(data.len() % BLOCK_SIZE, 0, "fixture data must be block aligned");
    encrypt_list_with::<NoPadding>(data)
}

/// Encrypt index text the way the packer does.
pub fn encrypt_list(text: &str) -> Vec<u8> {
    encrypt_list_with::<Pkcs7>(text.as_bytes())
}

/// Pad and CBC-encrypt a file with a locale's key.
pub fn encrypt_segment(locale: Locale, data: &[u8]) -> Vec<u8> {
    let keys = locale_keys(locale);
    let mut buffer = padded_buffer(data);

    let len = Aes128CbcEnc::new(
        GenericArray::from_slice(&keys.key),
        GenericArray::from_slice(&keys.iv),
    )
    .encrypt_padded_mut::<Pkcs7>(&mut buffer, data.len())
    .expect("buffer has room for padding")
    .len();
    buffer.truncate(len);
    buffer
}

/// Files to lay out into a `.list`/`.pack` pair.
#[derive(Debug, Default)]
pub struct PackBuilder {
    rows: Vec<(String, u64, u64)>,
    pack: Vec<u8>,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an encrypted file.
    pub fn encrypted(mut self, locale: Locale, name: &str, data: &[u8]) -> Self {
        let segment = encrypt_segment(locale, data);
        self.push(name, &segment);
        self
    }

    /// Append a file stored as-is.
    pub fn raw(mut self, name: &str, data: &[u8]) -> Self {
        self.push(name, data);
        self
    }

    fn push(&mut self, name: &str, segment: &[u8]) {
        self.rows
            .push((name.to_string(), self.pack.len() as u64, segment.len() as u64));
        self.pack.extend_from_slice(segment);
    }

    /// Index plaintext: a count header, one row per file, trailing newline.
    pub fn list_text(&self) -> String {
        let mut text = format!("{}\n", self.rows.len());
        for (name, start, length) in &self.rows {
            text.push_str(&format!("{},{},{}\n", name, start, length));
        }
        text
    }

    /// Encrypted `.list` and raw `.pack` bytes.
    pub fn build(self) -> (Vec<u8>, Vec<u8>) {
        (encrypt_list(&self.list_text()), self.pack)
    }
}
