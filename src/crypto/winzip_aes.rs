// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://www.winzip.com/en/support/aes-encryption/>
//!
//! WinZip AES keys are derived with PBKDF2-HMAC-SHA1 (1000 iterations) from the password and a per-entry salt. The
//! derived material is split into the AES key, an HMAC-SHA1 authentication key of the same length, and a two-byte
//! password verification value. Entry data is encrypted with AES in CTR mode using a little-endian block counter
//! which starts at one, and is followed by the first ten bytes of an HMAC-SHA1 computed over the ciphertext.

use crate::error::{Result, ZipError};
use crate::spec::consts::{WINZIP_AES_AUTH_CODE_LENGTH, WINZIP_AES_KDF_ITERATIONS, WINZIP_AES_VERIFY_LENGTH};
use crate::spec::header::AesKeySize;

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const BLOCK_LENGTH: usize = 16;

fn pbkdf2_hmac_sha1(password: &[u8], salt: &[u8], rounds: u32, output: &mut [u8]) {
    pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, output);
}

/// Key material derived for a single WinZip AES entry.
#[derive(Clone, PartialEq, Eq)]
pub struct WinzipAesKeys {
    key_size: AesKeySize,
    key: Vec<u8>,
    auth_key: Vec<u8>,
    verify_value: [u8; WINZIP_AES_VERIFY_LENGTH],
}

impl WinzipAesKeys {
    /// Derives the key material for the given password, salt, and key size.
    pub fn derive(password: &[u8], salt: &[u8], key_size: AesKeySize) -> Self {
        let key_length = key_size.key_length();
        let mut derived = vec![0; key_length * 2 + WINZIP_AES_VERIFY_LENGTH];
        pbkdf2_hmac_sha1(password, salt, WINZIP_AES_KDF_ITERATIONS, &mut derived);

        let verify_value = [derived[key_length * 2], derived[key_length * 2 + 1]];
        let auth_key = derived[key_length..key_length * 2].to_vec();
        derived.truncate(key_length);

        Self { key_size, key: derived, auth_key, verify_value }
    }

    /// Derives the key material for reading an entry, checking it against the verification value stored alongside
    /// the salt.
    pub fn for_read(
        password: &[u8],
        salt: &[u8],
        stored_verify_value: [u8; WINZIP_AES_VERIFY_LENGTH],
        key_size: AesKeySize,
    ) -> Result<Self> {
        let keys = Self::derive(password, salt, key_size);
        if keys.verify_value != stored_verify_value {
            return Err(ZipError::PasswordIncorrect);
        }

        Ok(keys)
    }

    pub fn key_size(&self) -> AesKeySize {
        self.key_size
    }

    /// Returns the two-byte password verification value.
    pub fn verify_value(&self) -> [u8; WINZIP_AES_VERIFY_LENGTH] {
        self.verify_value
    }
}

impl std::fmt::Debug for WinzipAesKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinzipAesKeys").field("key_size", &self.key_size).finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum AesBlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesBlockCipher {
    fn new(key_size: AesKeySize, key: &[u8]) -> Result<Self> {
        let invalid = |_| ZipError::InvalidExtraData("derived aes key has an unexpected length");

        Ok(match key_size {
            AesKeySize::Aes128 => AesBlockCipher::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
            AesKeySize::Aes192 => AesBlockCipher::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
            AesKeySize::Aes256 => AesBlockCipher::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
        })
    }

    fn encrypt_block(&self, block: &mut aes::Block) {
        match self {
            AesBlockCipher::Aes128(cipher) => cipher.encrypt_block(block),
            AesBlockCipher::Aes192(cipher) => cipher.encrypt_block(block),
            AesBlockCipher::Aes256(cipher) => cipher.encrypt_block(block),
        }
    }
}

/// The WinZip AES stream cipher (AES-CTR with a trailing HMAC-SHA1 authentication code).
///
/// Data may be processed in arbitrarily sized chunks; a partially used keystream block is carried over to the next
/// call.
#[derive(Clone)]
pub struct WinzipAesCipher {
    block_cipher: AesBlockCipher,
    counter: u128,
    keystream: [u8; BLOCK_LENGTH],
    keystream_pos: usize,
    mac: HmacSha1,
}

impl WinzipAesCipher {
    /// Constructs a cipher from derived key material.
    pub fn new(keys: &WinzipAesKeys) -> Result<Self> {
        let block_cipher = AesBlockCipher::new(keys.key_size, &keys.key)?;
        let mac = <HmacSha1 as Mac>::new_from_slice(&keys.auth_key)
            .map_err(|_| ZipError::InvalidExtraData("derived authentication key has an unexpected length"))?;

        Ok(Self { block_cipher, counter: 1, keystream: [0; BLOCK_LENGTH], keystream_pos: BLOCK_LENGTH, mac })
    }

    fn apply_keystream(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            if self.keystream_pos == BLOCK_LENGTH {
                let mut block = aes::Block::from(self.counter.to_le_bytes());
                self.block_cipher.encrypt_block(&mut block);
                self.keystream.copy_from_slice(&block);
                self.keystream_pos = 0;
                self.counter = self.counter.wrapping_add(1);
            }

            *byte ^= self.keystream[self.keystream_pos];
            self.keystream_pos += 1;
        }
    }

    /// Decrypts a buffer in place.
    pub fn decrypt(&mut self, buffer: &mut [u8]) {
        self.mac.update(buffer);
        self.apply_keystream(buffer);
    }

    /// Encrypts a buffer in place.
    pub fn encrypt(&mut self, buffer: &mut [u8]) {
        self.apply_keystream(buffer);
        self.mac.update(buffer);
    }

    /// Consumes the cipher and returns the authentication code over all ciphertext processed.
    pub fn finalize_auth_code(self) -> [u8; WINZIP_AES_AUTH_CODE_LENGTH] {
        let mut code = [0; WINZIP_AES_AUTH_CODE_LENGTH];
        code.copy_from_slice(&self.mac.finalize().into_bytes()[..WINZIP_AES_AUTH_CODE_LENGTH]);
        code
    }

    /// Consumes the cipher and checks the stored authentication code against all ciphertext processed.
    pub fn verify_auth_code(self, stored: &[u8]) -> Result<()> {
        if stored.len() != WINZIP_AES_AUTH_CODE_LENGTH {
            return Err(ZipError::AuthenticationFailed);
        }
        self.mac.verify_truncated_left(stored).map_err(|_| ZipError::AuthenticationFailed)
    }
}

impl std::fmt::Debug for WinzipAesCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinzipAesCipher")
            .field("counter", &self.counter)
            .field("keystream_pos", &self.keystream_pos)
            .finish_non_exhaustive()
    }
}
