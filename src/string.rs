// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

/// The encoding of a string stored within a ZIP record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    /// Bytes in an unspecified legacy code page (typically CP437).
    Raw,
}

/// A filename or comment as stored within a ZIP record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipString {
    encoding: StringEncoding,
    raw: Vec<u8>,
}

impl ZipString {
    /// Constructs a string from the raw bytes of a record and whether the record's UTF-8 flag was set.
    ///
    /// Plain ASCII is always UTF-8 compatible, so it's treated as such even when the flag is unset. Other bytes
    /// without the flag are kept raw, since strings in a multi-byte code page may happen to be valid UTF-8.
    pub(crate) fn from_record(raw: Vec<u8>, utf8_flag: bool) -> Self {
        let encoding = if (utf8_flag || raw.is_ascii()) && std::str::from_utf8(&raw).is_ok() {
            StringEncoding::Utf8
        } else {
            StringEncoding::Raw
        };

        Self { encoding, raw }
    }

    /// Returns the raw bytes for this string.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the encoding type for this string.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Returns whether this string holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the string as a slice if it's UTF-8 encoded.
    pub fn as_str(&self) -> Result<&str> {
        match self.encoding {
            StringEncoding::Utf8 => std::str::from_utf8(&self.raw).map_err(|_| ZipError::StringNotUtf8),
            StringEncoding::Raw => Err(ZipError::StringNotUtf8),
        }
    }

    /// Returns the string with any invalid UTF-8 sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

impl From<&str> for ZipString {
    fn from(value: &str) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: value.as_bytes().to_vec() }
    }
}

impl PartialEq<str> for ZipString {
    fn eq(&self, other: &str) -> bool {
        self.raw == other.as_bytes()
    }
}

impl PartialEq<&str> for ZipString {
    fn eq(&self, other: &&str) -> bool {
        self.raw == other.as_bytes()
    }
}
