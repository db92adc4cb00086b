// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#6>
//!
//! The traditional PKWARE encryption scheme is a stream cipher keyed by three 32-bit words. Every byte processed -
//! in either direction - mixes the *plaintext* byte back into the keys, so encryption and decryption are only
//! inverses of one another when both sides start from the same freshly keyed state.

use crate::error::{Result, ZipError};
use crate::spec::consts::PKWARE_HEADER_LENGTH;

const INITIAL_KEYS: [u32; 3] = [0x12345678, 0x23456789, 0x34567890];

/// A single step of the raw (non-inverted) CRC-32 register.
fn crc32_update(state: u32, byte: u8) -> u32 {
    // crc32fast operates on finalised (inverted) values, so invert on the way in and out to step the raw register.
    let mut hasher = crc32fast::Hasher::new_with_initial(!state);
    hasher.update(&[byte]);
    !hasher.finalize()
}

/// The traditional PKWARE ("ZipCrypto") stream cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PkwareTraditionalCipher {
    keys: [u32; 3],
}

impl PkwareTraditionalCipher {
    /// Constructs a cipher keyed with the provided password.
    pub fn new(password: &[u8]) -> Self {
        let mut cipher = Self { keys: INITIAL_KEYS };
        for byte in password {
            cipher.update(*byte);
        }
        cipher
    }

    /// Constructs a cipher for reading an entry, consuming and verifying its 12-byte encryption header.
    ///
    /// The last byte of the decrypted header must match the high byte of the entry's CRC. When the entry is followed
    /// by a data descriptor, the CRC isn't known upfront and the high byte of the DOS modification time is accepted
    /// instead.
    pub fn for_read(
        password: &[u8],
        mut header: [u8; PKWARE_HEADER_LENGTH],
        crc: u32,
        mod_time: u16,
        data_descriptor: bool,
    ) -> Result<Self> {
        let mut cipher = Self::new(password);
        cipher.decrypt(&mut header);

        let check = header[PKWARE_HEADER_LENGTH - 1];
        if check == (crc >> 24) as u8 {
            return Ok(cipher);
        }
        if data_descriptor && check == (mod_time >> 8) as u8 {
            return Ok(cipher);
        }

        Err(ZipError::PasswordIncorrect)
    }

    fn update(&mut self, byte: u8) {
        self.keys[0] = crc32_update(self.keys[0], byte);
        self.keys[1] = self.keys[1].wrapping_add(self.keys[0] & 0xff).wrapping_mul(0x08088405).wrapping_add(1);
        self.keys[2] = crc32_update(self.keys[2], (self.keys[1] >> 24) as u8);
    }

    fn magic_byte(&self) -> u8 {
        let temp = (self.keys[2] & 0xffff) | 2;
        (temp.wrapping_mul(temp ^ 1) >> 8) as u8
    }

    /// Decrypts a single byte.
    pub fn decrypt_byte(&mut self, byte: u8) -> u8 {
        let plain = byte ^ self.magic_byte();
        self.update(plain);
        plain
    }

    /// Encrypts a single byte.
    pub fn encrypt_byte(&mut self, byte: u8) -> u8 {
        let cipher = byte ^ self.magic_byte();
        self.update(byte);
        cipher
    }

    /// Decrypts a buffer in place.
    pub fn decrypt(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.decrypt_byte(*byte);
        }
    }

    /// Encrypts a buffer in place.
    pub fn encrypt(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.encrypt_byte(*byte);
        }
    }
}
