// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#![allow(dead_code)]

use async_unzip::base::read::{seek, stream};
use async_unzip::crypto::{PkwareTraditionalCipher, WinzipAesCipher, WinzipAesKeys};
use async_unzip::error::Result;
use async_unzip::spec::header::AesKeySize;
use async_unzip::ReadOptions;

use futures_lite::io::{AsyncReadExt, Cursor};

pub const PASSWORD: &str = "pw";
pub const MOD_TIME: u16 = 0x7d1c;
pub const MOD_DATE: u16 = 0x5a4e;

pub const SAMPLE: &[u8] = b"The quick brown fox jumps over the lazy dog. The quick brown fox jumps over the lazy dog.";

#[derive(Clone, Copy)]
pub enum Encryption {
    None,
    Pkware,
    WinzipAes { strength: AesKeySize, ae2: bool },
}

pub struct TestEntry {
    pub name: &'static str,
    pub data: Vec<u8>,
    pub deflate: bool,
    pub descriptor: bool,
    pub encryption: Encryption,
}

impl TestEntry {
    pub fn new(name: &'static str, data: &[u8]) -> Self {
        Self { name, data: data.to_vec(), deflate: false, descriptor: false, encryption: Encryption::None }
    }

    pub fn deflate(mut self) -> Self {
        self.deflate = true;
        self
    }

    pub fn descriptor(mut self) -> Self {
        self.descriptor = true;
        self
    }

    pub fn encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }
}

struct Central {
    flags: u16,
    method: u16,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    extra: Vec<u8>,
    offset: u32,
}

/// Writes a plain (non-Zip64) archive, encrypting entries with [`PASSWORD`] where requested.
pub async fn build_archive(entries: &[TestEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut centrals = Vec::new();

    for entry in entries {
        let offset = out.len() as u32;
        let crc = crc32fast::hash(&entry.data);
        let compressed = compress(entry).await;

        let mut flags = 0u16;
        let mut method: u16 = if entry.deflate { 8 } else { 0 };
        let mut extra = Vec::new();
        let mut stored_crc = crc;

        let payload = match entry.encryption {
            Encryption::None => compressed,
            Encryption::Pkware => {
                flags |= 1;
                let check = match entry.descriptor {
                    true => (MOD_TIME >> 8) as u8,
                    false => (crc >> 24) as u8,
                };

                let mut payload = vec![0x5A, 0x11, 0x93, 0x02, 0xC7, 0x48, 0xE0, 0x3D, 0x76, 0xAB, 0x1F, check];
                payload.extend_from_slice(&compressed);
                PkwareTraditionalCipher::new(PASSWORD.as_bytes()).encrypt(&mut payload);
                payload
            }
            Encryption::WinzipAes { strength, ae2 } => {
                flags |= 1;
                extra.extend_from_slice(&0x9901u16.to_le_bytes());
                extra.extend_from_slice(&7u16.to_le_bytes());
                extra.extend_from_slice(&(if ae2 { 2u16 } else { 1u16 }).to_le_bytes());
                extra.extend_from_slice(b"AE");
                extra.push(match strength {
                    AesKeySize::Aes128 => 1,
                    AesKeySize::Aes192 => 2,
                    AesKeySize::Aes256 => 3,
                });
                extra.extend_from_slice(&method.to_le_bytes());
                method = 99;

                if ae2 {
                    stored_crc = 0;
                }

                let salt: Vec<u8> = (0..strength.salt_length() as u8).map(|byte| byte.wrapping_mul(37)).collect();
                let keys = WinzipAesKeys::derive(PASSWORD.as_bytes(), &salt, strength);
                let mut cipher = WinzipAesCipher::new(&keys).unwrap();

                let mut ciphertext = compressed;
                cipher.encrypt(&mut ciphertext);

                let mut payload = salt;
                payload.extend_from_slice(&keys.verify_value());
                payload.extend_from_slice(&ciphertext);
                payload.extend_from_slice(&cipher.finalize_auth_code());
                payload
            }
        };

        if entry.descriptor {
            flags |= 1 << 3;
        }

        let (header_crc, header_compressed, header_uncompressed) = match entry.descriptor {
            true => (0, 0, 0),
            false => (stored_crc, payload.len() as u32, entry.data.len() as u32),
        };

        out.extend_from_slice(&0x04034b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&MOD_TIME.to_le_bytes());
        out.extend_from_slice(&MOD_DATE.to_le_bytes());
        out.extend_from_slice(&header_crc.to_le_bytes());
        out.extend_from_slice(&header_compressed.to_le_bytes());
        out.extend_from_slice(&header_uncompressed.to_le_bytes());
        out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(&extra);
        out.extend_from_slice(&payload);

        if entry.descriptor {
            out.extend_from_slice(&0x08074b50u32.to_le_bytes());
            out.extend_from_slice(&stored_crc.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
        }

        centrals.push(Central {
            flags,
            method,
            crc: stored_crc,
            compressed_size: payload.len() as u32,
            uncompressed_size: entry.data.len() as u32,
            extra,
            offset,
        });
    }

    let directory_start = out.len() as u32;
    for (entry, central) in entries.iter().zip(&centrals) {
        out.extend_from_slice(&0x02014b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&central.flags.to_le_bytes());
        out.extend_from_slice(&central.method.to_le_bytes());
        out.extend_from_slice(&MOD_TIME.to_le_bytes());
        out.extend_from_slice(&MOD_DATE.to_le_bytes());
        out.extend_from_slice(&central.crc.to_le_bytes());
        out.extend_from_slice(&central.compressed_size.to_le_bytes());
        out.extend_from_slice(&central.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(central.extra.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&central.offset.to_le_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(&central.extra);
    }
    let directory_size = out.len() as u32 - directory_start;

    out.extend_from_slice(&0x06054b50u32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&directory_size.to_le_bytes());
    out.extend_from_slice(&directory_start.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    out
}

async fn compress(entry: &TestEntry) -> Vec<u8> {
    if !entry.deflate {
        return entry.data.clone();
    }

    let mut encoder = async_compression::futures::bufread::DeflateEncoder::new(entry.data.as_slice());
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await.unwrap();
    compressed
}

pub fn options(password: Option<&str>) -> ReadOptions {
    match password {
        Some(password) => ReadOptions::new().password(password),
        None => ReadOptions::new(),
    }
}

/// Reads every entry via the streaming reader, returning the filenames and contents in order.
pub async fn read_stream(archive: &[u8], options: ReadOptions) -> Result<Vec<(String, Vec<u8>)>> {
    let mut zip = stream::ZipFileReader::with_options(archive, options);
    let mut read = Vec::new();

    while let Some(mut entry) = zip.next_with_entry().await? {
        let filename = entry.reader().entry().filename().to_string_lossy();
        let mut data = Vec::new();
        entry.reader().read_to_end_checked(&mut data).await?;

        read.push((filename, data));
        zip = entry.done().await?;
    }

    Ok(read)
}

/// Reads every entry via the central directory, returning the filenames and contents in order.
pub async fn read_seek(archive: &[u8], options: ReadOptions) -> Result<Vec<(String, Vec<u8>)>> {
    let mut zip = seek::ZipFileReader::with_options(Cursor::new(archive), options).await?;
    let mut read = Vec::new();

    for index in 0..zip.entries().len() {
        let filename = zip.entries()[index].filename().to_string_lossy();
        let mut data = Vec::new();
        zip.reader_with_entry(index).await?.read_to_end_checked(&mut data).await?;

        read.push((filename, data));
    }

    Ok(read)
}
