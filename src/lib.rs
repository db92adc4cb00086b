// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! An asynchronous ZIP archive reading crate with a heavy focus on streaming support.
//!
//! ## Features
//! - A base implementation atop `futures`'s IO traits.
//! - An extended implementation atop `tokio`'s IO traits.
//! - Reading forward-only sources, including entries written with a post-data descriptor.
//! - Reading seekable sources via the central directory, including Zip64 archives.
//! - Support for Stored, Deflate, Deflate64, bzip2, LZMA, zstd, and xz compression methods.
//! - Decryption of PKWARE traditional and WinZip AES (AE-1/AE-2) entries.
//! - Aims for reasonable [specification](https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT) compliance.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! async_unzip = { version = "0.1.0", features = ["full"] }
//! ```
//!
//! ### Feature Flags
//! - `full` - Enables all below features.
//! - `tokio` - Compatibility with the `tokio` crate.
//! - `deflate` - Support for the Deflate compression method.
//! - `bzip2` - Support for the bzip2 compression method.
//! - `lzma` - Support for the LZMA compression method.
//! - `zstd` - Support for the zstd compression method.
//! - `xz` - Support for the xz compression method.
//! - `deflate64` - Support for the Deflate64 compression method.
//!
//! ## Example
//! ```no_run
//! # use async_unzip::base::read::stream::ZipFileReader;
//! # use async_unzip::opts::ReadOptions;
//! # use async_unzip::error::Result;
//! # use futures_lite::io::Cursor;
//! #
//! # async fn run() -> Result<()> {
//! let options = ReadOptions::new().password("secret");
//! let mut zip = ZipFileReader::with_options(Cursor::new(Vec::new()), options);
//!
//! while let Some(mut entry) = zip.next_with_entry().await? {
//!     let mut data = Vec::new();
//!     entry.reader().read_to_end_checked(&mut data).await?;
//!     zip = entry.done().await?;
//! }
//! #
//! #     Ok(())
//! # }
//! ```

pub mod base;
pub mod crypto;
pub mod error;
pub mod header;
pub mod opts;
pub mod spec;
pub mod string;

#[cfg(feature = "tokio")]
pub mod tokio;

pub use crate::base::read::{RewindableStream, ZipEntryReader};
pub use crate::header::{
    DataLocation, DirectoryEnd, DirectoryEntry, EncryptionInfo, EntryMeta, EntrySizes, LocalEntry, Sizes, ZipHeader,
};
pub use crate::opts::ReadOptions;
pub use crate::spec::Compression;
pub use crate::string::{StringEncoding, ZipString};

#[cfg(test)]
pub(crate) mod tests;
