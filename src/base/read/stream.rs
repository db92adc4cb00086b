// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A ZIP reader which acts over a non-seekable source.
//!
//! # API Design
//! As opposed to the seekable reader, it's important that the data of an entry is fully read before the proceeding
//! entry is read. This is as a result of not being able to seek forwards or backwards, so we must end up at the start
//! of the next entry.
//!
//! **We encode this invariant within Rust's type system so that it can be enforced at compile time.**
//!
//! This requires that any transition methods between these encoded types consume the reader and provide a new owned
//! reader back. This is certainly something to keep in mind when working with this reader, but idiomatic code can
//! still be produced nevertheless.
//!
//! # Considerations
//! As the central directory of a ZIP archive is stored at the end of it, a non-seekable reader doesn't have access
//! to it. We have to rely on information provided within the local file header which may not be accurate or complete.
//! This results in:
//! - No file comment or file attributes being available.
//! - The inability to read Stored entries written with a data descriptor (their end can't be found).
//! - Encrypted entries written with a data descriptor and no sizes being unreadable.
//! - The CRC and sizes of entries written with a data descriptor only being known once their data has been read. The
//!   sealed values are available via [`ZipFileReader::last_entry`] after [`ZipFileReader::done`].
//!
//! # Example
//! ```no_run
//! # use futures_lite::io::Cursor;
//! # use async_unzip::error::Result;
//! # use async_unzip::base::read::stream::ZipFileReader;
//! #
//! # async fn run() -> Result<()> {
//! let mut zip = ZipFileReader::new(Cursor::new([0; 0]));
//!
//! // Print the name of every file in a ZIP archive.
//! while let Some(mut entry) = zip.next_with_entry().await? {
//!     println!("File: {}", entry.reader().entry().filename().to_string_lossy());
//!     zip = entry.skip().await?;
//! }
//! #
//! #     Ok(())
//! # }
//! ```

use crate::base::read::decoder;
use crate::base::read::io::entry::ZipEntryReader;
use crate::base::read::io::rewind::RewindableStream;
use crate::base::read::parser::StreamingHeaderParser;
use crate::error::{Result, ZipError};
use crate::header::{LocalEntry, ZipHeader};
use crate::opts::ReadOptions;

use futures_lite::io::{AsyncRead, AsyncReadExt};

#[cfg(feature = "tokio")]
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// A type which encodes that [`ZipFileReader`] is ready to open a new entry.
pub struct Ready<R>(StreamingHeaderParser<R>);

/// A type which encodes that [`ZipFileReader`] is currently reading an entry.
pub struct Reading<R> {
    reader: ZipEntryReader<RewindableStream<R>>,
    options: ReadOptions,
}

/// A ZIP reader which acts over a non-seekable source.
///
/// See the [module-level docs](.) for more information.
pub struct ZipFileReader<S>(S);

impl<R> ZipFileReader<Ready<R>>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a new ZIP reader from a non-seekable source.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReadOptions::default())
    }

    /// Constructs a new ZIP reader from a non-seekable source with the given options.
    pub fn with_options(reader: R, options: ReadOptions) -> Self {
        Self(Ready(StreamingHeaderParser::new(reader, options)))
    }

    /// Opens the next entry for reading if the central directory hasn't yet been reached.
    pub async fn next_with_entry(mut self) -> Result<Option<ZipFileReader<Reading<R>>>> {
        loop {
            match self.0 .0.parse_next().await? {
                Some(ZipHeader::LocalEntry(entry)) => {
                    let (stream, options, _) = self.0 .0.into_parts();
                    let reader = decoder::open_streaming(stream, entry).await?;
                    return Ok(Some(ZipFileReader(Reading { reader, options })));
                }
                Some(ZipHeader::DirectoryEntry(_)) | Some(ZipHeader::DirectoryEnd(_)) => return Ok(None),
                Some(ZipHeader::Split) | Some(ZipHeader::Ignore) | None => continue,
            }
        }
    }

    /// Returns the most recently read entry, sealed with its data descriptor's values where it had one.
    pub fn last_entry(&self) -> Option<&LocalEntry> {
        self.0 .0.last_entry()
    }

    /// Consumes the `ZipFileReader` returning the original `reader`.
    ///
    /// Any bytes buffered ahead of the current position are lost.
    pub fn into_inner(self) -> R {
        self.0 .0.into_parts().0.into_inner()
    }
}

#[cfg(feature = "tokio")]
impl<R> ZipFileReader<Ready<Compat<R>>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    /// Constructs a new tokio-specific ZIP reader from a non-seekable source.
    pub fn with_tokio(reader: R) -> Self {
        Self::new(reader.compat())
    }
}

impl<R> ZipFileReader<Reading<R>>
where
    R: AsyncRead + Unpin,
{
    /// Returns a mutable reference to the inner entry reader.
    pub fn reader(&mut self) -> &mut ZipEntryReader<RewindableStream<R>> {
        &mut self.0.reader
    }

    /// Converts the reader back into the Ready state if EOF has been reached.
    ///
    /// The entry's data descriptor (if any) is read, and the content read is checked against the entry's CRC.
    pub async fn done(mut self) -> Result<ZipFileReader<Ready<R>>> {
        if self.0.reader.read(&mut [0; 1]).await? != 0 {
            return Err(ZipError::EOFNotReached);
        }

        self.finish().await
    }

    /// Reads until EOF and converts the reader back into the Ready state.
    pub async fn skip(mut self) -> Result<ZipFileReader<Ready<R>>> {
        while self.0.reader.read(&mut [0; 2048]).await? != 0 {}
        self.finish().await
    }

    async fn finish(self) -> Result<ZipFileReader<Ready<R>>> {
        let computed = self.0.reader.compute_hash();
        let (entry, stream) = self.0.reader.into_parts();

        let mut parser = StreamingHeaderParser::from_parts(stream, self.0.options, Some(entry));
        parser.seal_previous().await?;

        if let Some(entry) = parser.last_entry() {
            if entry.verifies_crc() && entry.crc32() != computed {
                tracing::debug!(expected = entry.crc32(), computed, "CRC32 mismatch");
                return Err(ZipError::CRC32CheckError);
            }
        }

        Ok(ZipFileReader(Ready(parser)))
    }
}
