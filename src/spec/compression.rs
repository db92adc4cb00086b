// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

/// A compression method as recorded within a ZIP record.
///
/// Every method code is representable so that headers can be parsed regardless of whether a decoder is available;
/// decoder availability is only checked once an entry is opened for reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflate,
    Deflate64,
    Bz,
    Lzma,
    Zstd,
    Xz,
    Ppmd,
    /// A marker method signalling that the real method is held within the WinZip AES extra field.
    WinzipAes,
    Other(u16),
}

impl Compression {
    /// Returns whether a decoder for this method was compiled in.
    pub fn is_supported(&self) -> bool {
        match self {
            Compression::Stored => true,
            Compression::Deflate => cfg!(feature = "deflate"),
            Compression::Deflate64 => cfg!(feature = "deflate64"),
            Compression::Bz => cfg!(feature = "bzip2"),
            Compression::Lzma => cfg!(feature = "lzma"),
            Compression::Zstd => cfg!(feature = "zstd"),
            Compression::Xz => cfg!(feature = "xz"),
            Compression::Ppmd | Compression::WinzipAes | Compression::Other(_) => false,
        }
    }
}

impl From<u16> for Compression {
    // Convert a u16 stored with little endianness into a compression method.
    // https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#445
    fn from(value: u16) -> Self {
        match value {
            0 => Compression::Stored,
            8 => Compression::Deflate,
            9 => Compression::Deflate64,
            12 => Compression::Bz,
            14 => Compression::Lzma,
            93 => Compression::Zstd,
            95 => Compression::Xz,
            98 => Compression::Ppmd,
            99 => Compression::WinzipAes,
            other => Compression::Other(other),
        }
    }
}

impl From<&Compression> for u16 {
    // Convert a compression method into its relevant u16 stored with little endianness.
    // https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#445
    fn from(compression: &Compression) -> u16 {
        match compression {
            Compression::Stored => 0,
            Compression::Deflate => 8,
            Compression::Deflate64 => 9,
            Compression::Bz => 12,
            Compression::Lzma => 14,
            Compression::Zstd => 93,
            Compression::Xz => 95,
            Compression::Ppmd => 98,
            Compression::WinzipAes => 99,
            Compression::Other(other) => *other,
        }
    }
}

impl From<Compression> for u16 {
    fn from(compression: Compression) -> u16 {
        (&compression).into()
    }
}
