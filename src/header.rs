// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The headers produced by parsing an archive, one per on-disk record signature.

use crate::crypto::{PkwareTraditionalCipher, WinzipAesKeys};
use crate::spec::consts::{PKWARE_HEADER_LENGTH, WINZIP_AES_AUTH_CODE_LENGTH, WINZIP_AES_VERIFY_LENGTH};
use crate::spec::header::{AesVendorVersion, ExtraField, GeneralPurposeFlag};
use crate::spec::Compression;
use crate::string::ZipString;

use std::ops::Deref;

/// A parsed archive record.
#[derive(Clone, Debug)]
pub enum ZipHeader {
    LocalEntry(LocalEntry),
    DirectoryEntry(DirectoryEntry),
    DirectoryEnd(DirectoryEnd),
    /// A split/spanned archive marker at the very start of the first volume.
    Split,
    /// A Zip64 end of central directory record or locator, consumed without interpretation.
    Ignore,
}

/// The fields shared by local and central directory entries.
#[derive(Clone, Debug)]
pub struct EntryMeta {
    pub(crate) filename: ZipString,
    pub(crate) flags: GeneralPurposeFlag,
    pub(crate) compression: Compression,
    pub(crate) last_mod_date: u16,
    pub(crate) last_mod_time: u16,
    pub(crate) extra_fields: Vec<ExtraField>,
}

impl EntryMeta {
    /// Returns the entry's filename.
    ///
    /// # Note
    /// This will return the raw filename stored during ZIP creation. If calling this method on entries retrieved from
    /// untrusted ZIP files, the filename should be sanitised before being used as a path to prevent [directory
    /// travesal attacks](https://en.wikipedia.org/wiki/Directory_traversal_attack).
    pub fn filename(&self) -> &ZipString {
        &self.filename
    }

    /// Returns the entry's general purpose flags.
    pub fn flags(&self) -> GeneralPurposeFlag {
        self.flags
    }

    /// Returns the entry's compression method.
    ///
    /// For local entries encrypted with WinZip AES, this is the actual method taken from the AES extra field rather
    /// than the recorded marker method.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the entry's last modification date in MS-DOS format.
    pub fn last_mod_date(&self) -> u16 {
        self.last_mod_date
    }

    /// Returns the entry's last modification time in MS-DOS format.
    pub fn last_mod_time(&self) -> u16 {
        self.last_mod_time
    }

    /// Returns the entry's extra field data.
    pub fn extra_fields(&self) -> &[ExtraField] {
        &self.extra_fields
    }

    /// Returns whether or not the entry represents a directory.
    pub fn is_dir(&self) -> bool {
        self.filename.as_bytes().ends_with(b"/")
    }

    /// Returns whether or not the entry is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags.encrypted
    }
}

/// An entry's CRC and sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sizes {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

/// An entry's CRC and sizes along with whether they're final.
///
/// Entries which use a post-data descriptor hold placeholder values until the descriptor following their data has
/// been read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntrySizes {
    Sealed(Sizes),
    Provisional(Sizes),
}

impl EntrySizes {
    pub fn sizes(&self) -> &Sizes {
        match self {
            EntrySizes::Sealed(sizes) | EntrySizes::Provisional(sizes) => sizes,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, EntrySizes::Sealed(_))
    }
}

/// Where an entry's payload can be found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataLocation {
    /// The absolute offset of the payload (after any encryption header).
    Seekable { offset: u64 },
    /// The shared stream is positioned at the payload.
    Streaming,
}

/// Encryption state for a single entry, loaded once its password has been verified.
#[derive(Clone, Debug)]
pub enum EncryptionInfo {
    /// Keys after the 12-byte encryption header has been consumed.
    PkwareTraditional(PkwareTraditionalCipher),
    WinzipAes { keys: WinzipAesKeys, vendor_version: AesVendorVersion },
}

impl EncryptionInfo {
    /// Returns the number of bytes which precede the payload within the entry's compressed data.
    pub fn header_length(&self) -> u64 {
        match self {
            EncryptionInfo::PkwareTraditional(_) => PKWARE_HEADER_LENGTH as u64,
            EncryptionInfo::WinzipAes { keys, .. } => {
                (keys.key_size().salt_length() + WINZIP_AES_VERIFY_LENGTH) as u64
            }
        }
    }

    /// Returns the number of bytes which follow the payload within the entry's compressed data.
    pub fn trailer_length(&self) -> u64 {
        match self {
            EncryptionInfo::PkwareTraditional(_) => 0,
            EncryptionInfo::WinzipAes { .. } => WINZIP_AES_AUTH_CODE_LENGTH as u64,
        }
    }

    /// Returns whether the entry's stored CRC is meaningful.
    ///
    /// AE-2 entries store a CRC of zero and rely on the authentication code alone.
    pub fn has_crc(&self) -> bool {
        !matches!(self, EncryptionInfo::WinzipAes { vendor_version: AesVendorVersion::Ae2, .. })
    }
}

/// An entry parsed from a local file header.
#[derive(Clone, Debug)]
pub struct LocalEntry {
    pub(crate) meta: EntryMeta,
    pub(crate) sizes: EntrySizes,
    pub(crate) encryption: Option<EncryptionInfo>,
    pub(crate) data_location: DataLocation,
    pub(crate) has_data: bool,
    pub(crate) data_start_position: Option<u64>,
}

impl LocalEntry {
    /// Returns the entry's CRC and sizes, with the compressed size excluding any encryption header.
    pub fn sizes(&self) -> &Sizes {
        self.sizes.sizes()
    }

    /// Returns whether the entry's CRC and sizes are final.
    pub fn is_sealed(&self) -> bool {
        self.sizes.is_sealed()
    }

    pub fn crc32(&self) -> u32 {
        self.sizes().crc32
    }

    pub fn compressed_size(&self) -> u64 {
        self.sizes().compressed_size
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.sizes().uncompressed_size
    }

    pub fn encryption(&self) -> Option<&EncryptionInfo> {
        self.encryption.as_ref()
    }

    pub fn data_location(&self) -> DataLocation {
        self.data_location
    }

    /// Returns whether the entry carries any compressed data.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Returns the absolute offset of the entry's payload, once known.
    pub fn data_start_position(&self) -> Option<u64> {
        self.data_start_position
    }

    pub(crate) fn seal(&mut self, sizes: Sizes) {
        self.sizes = EntrySizes::Sealed(sizes);
    }

    /// Returns whether decoded content should be checked against the stored CRC.
    pub(crate) fn verifies_crc(&self) -> bool {
        self.encryption.as_ref().map_or(true, EncryptionInfo::has_crc)
    }
}

impl Deref for LocalEntry {
    type Target = EntryMeta;

    fn deref(&self) -> &Self::Target {
        &self.meta
    }
}

/// An entry parsed from a central directory record.
#[derive(Clone, Debug)]
pub struct DirectoryEntry {
    pub(crate) meta: EntryMeta,
    pub(crate) sizes: Sizes,
    pub(crate) relative_offset_of_local_header: u64,
    pub(crate) comment: ZipString,
    pub(crate) version_made_by: u16,
    pub(crate) internal_file_attribute: u16,
    pub(crate) external_file_attribute: u32,
    pub(crate) has_data: bool,
}

impl DirectoryEntry {
    /// Returns the entry's CRC and sizes as recorded, including any encryption overhead.
    pub fn sizes(&self) -> &Sizes {
        &self.sizes
    }

    pub fn crc32(&self) -> u32 {
        self.sizes.crc32
    }

    pub fn compressed_size(&self) -> u64 {
        self.sizes.compressed_size
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.sizes.uncompressed_size
    }

    /// Returns the offset of the entry's local file header.
    pub fn relative_offset_of_local_header(&self) -> u64 {
        self.relative_offset_of_local_header
    }

    /// Returns the entry's file comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }

    pub fn version_made_by(&self) -> u16 {
        self.version_made_by
    }

    pub fn internal_file_attribute(&self) -> u16 {
        self.internal_file_attribute
    }

    pub fn external_file_attribute(&self) -> u32 {
        self.external_file_attribute
    }

    /// Returns whether the entry carries any compressed data.
    pub fn has_data(&self) -> bool {
        self.has_data
    }
}

impl Deref for DirectoryEntry {
    type Target = EntryMeta;

    fn deref(&self) -> &Self::Target {
        &self.meta
    }
}

/// The end of central directory record, with any Zip64 values already applied.
#[derive(Clone, Debug)]
pub struct DirectoryEnd {
    pub(crate) directory_start_offset: u64,
    pub(crate) entry_count: u64,
    pub(crate) directory_size: u64,
    pub(crate) comment: ZipString,
}

impl DirectoryEnd {
    pub fn directory_start_offset(&self) -> u64 {
        self.directory_start_offset
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn directory_size(&self) -> u64 {
        self.directory_size
    }

    /// Returns the archive's comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }
}
