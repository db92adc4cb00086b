// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A ZIP reader which acts over a seekable source.
//!
//! The central directory is read upfront, so entry comments, attributes, and the archive comment are available and
//! entries may be opened in any order.
//!
//! ### Example
//! ```no_run
//! # use async_unzip::base::read::seek::ZipFileReader;
//! # use async_unzip::error::Result;
//! # use futures_lite::io::BufReader;
//! # use tokio::fs::File;
//! # use tokio_util::compat::TokioAsyncReadCompatExt;
//! #
//! async fn run() -> Result<()> {
//!     let data = File::open("./foo.zip").await?;
//!     let mut reader = ZipFileReader::new(BufReader::new(data.compat())).await?;
//!
//!     let mut data = Vec::new();
//!     let mut entry = reader.reader_with_entry(0).await?;
//!     entry.read_to_end_checked(&mut data).await?;
//!
//!     // Use data within current scope.
//!
//!     Ok(())
//! }
//! ```

use crate::base::read::decoder;
use crate::base::read::io::entry::ZipEntryReader;
use crate::base::read::parser::SeekableHeaderParser;
use crate::error::{Result, ZipError};
use crate::header::{DirectoryEnd, DirectoryEntry};
use crate::opts::ReadOptions;
use crate::string::ZipString;

use futures_lite::io::{AsyncBufRead, AsyncSeek};

#[cfg(feature = "tokio")]
use crate::tokio::read::seek::ZipFileReader as TokioZipFileReader;
#[cfg(feature = "tokio")]
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// A ZIP reader which acts over a seekable source.
pub struct ZipFileReader<R> {
    parser: SeekableHeaderParser<R>,
    entries: Vec<DirectoryEntry>,
    end: DirectoryEnd,
}

impl<R> ZipFileReader<R>
where
    R: AsyncBufRead + AsyncSeek + Unpin,
{
    /// Constructs a new ZIP reader from a seekable source.
    pub async fn new(reader: R) -> Result<ZipFileReader<R>> {
        Self::with_options(reader, ReadOptions::default()).await
    }

    /// Constructs a new ZIP reader from a seekable source with the given options.
    pub async fn with_options(reader: R, options: ReadOptions) -> Result<ZipFileReader<R>> {
        let mut parser = SeekableHeaderParser::new(reader, options);
        let end = parser.locate_end_of_central_directory().await?;
        let entries = parser.read_directory(&end).await?;

        Ok(ZipFileReader { parser, entries, end })
    }

    /// Returns the entries of the central directory, in the order they're stored.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Returns the end of central directory record.
    pub fn directory_end(&self) -> &DirectoryEnd {
        &self.end
    }

    /// Returns the archive's comment.
    pub fn comment(&self) -> &ZipString {
        self.end.comment()
    }

    /// Returns a mutable reference to the inner seekable source.
    pub fn inner_mut(&mut self) -> &mut R {
        self.parser.reader_mut()
    }

    /// Returns the inner seekable source by consuming self.
    pub fn into_inner(self) -> R {
        self.parser.into_inner()
    }

    /// Returns a new entry reader if the provided index is valid.
    pub async fn reader_with_entry(&mut self, index: usize) -> Result<ZipEntryReader<&mut R>> {
        let entry = self.entries.get(index).ok_or(ZipError::EntryIndexOutOfBounds)?;
        let local = self.parser.load_local_header(entry).await?;

        decoder::open_seekable(self.parser.reader_mut(), local).await
    }

    /// Returns a new entry reader if the provided index is valid.
    /// Consumes self
    pub async fn into_entry(mut self, index: usize) -> Result<ZipEntryReader<R>> {
        let entry = self.entries.get(index).ok_or(ZipError::EntryIndexOutOfBounds)?;
        let local = self.parser.load_local_header(entry).await?;

        decoder::open_seekable(self.parser.into_inner(), local).await
    }
}

#[cfg(feature = "tokio")]
impl<R> ZipFileReader<Compat<R>>
where
    R: tokio::io::AsyncBufRead + tokio::io::AsyncSeek + Unpin,
{
    /// Constructs a new tokio-specific ZIP reader from a seekable source.
    pub async fn with_tokio(reader: R) -> Result<TokioZipFileReader<R>> {
        ZipFileReader::new(reader.compat()).await
    }
}
