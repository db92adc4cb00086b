// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading ZIP files.

use crate::base::read::ZipEntryReader as BaseZipEntryReader;
use crate::error::Result;
use crate::header::LocalEntry;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::io::{AsyncBufRead, AsyncRead as FuturesAsyncRead};
use pin_project::pin_project;
use tokio::io::{AsyncRead, ReadBuf};

pub mod seek {
    //! A ZIP reader which acts over a seekable source.

    #[cfg(doc)]
    use crate::base;
    use tokio_util::compat::Compat;

    /// A [`tokio`]-specific type alias for [`base::read::seek::ZipFileReader`];
    pub type ZipFileReader<R> = crate::base::read::seek::ZipFileReader<Compat<R>>;
}

pub mod stream {
    //! A ZIP reader which acts over a non-seekable source.

    #[cfg(doc)]
    use crate::base;
    use crate::base::read::stream::{Ready, Reading};
    use tokio_util::compat::Compat;

    /// A [`tokio`]-specific type alias for [`base::read::stream::ZipFileReader`] in its ready state;
    pub type ZipFileReader<R> = crate::base::read::stream::ZipFileReader<Ready<Compat<R>>>;

    /// A [`tokio`]-specific type alias for [`base::read::stream::ZipFileReader`] whilst reading an entry;
    pub type ZipEntryFileReader<R> = crate::base::read::stream::ZipFileReader<Reading<Compat<R>>>;
}

/// A ZIP entry reader which implements [`tokio`]'s [`AsyncRead`].
#[pin_project]
pub struct ZipEntryReader<R>(#[pin] BaseZipEntryReader<R>);

impl<R> From<BaseZipEntryReader<R>> for ZipEntryReader<R> {
    fn from(reader: BaseZipEntryReader<R>) -> Self {
        Self(reader)
    }
}

impl<R> AsyncRead for ZipEntryReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        let result = self.project().0.poll_read(c, b.initialize_unfilled());

        if let Poll::Ready(Ok(advance)) = &result {
            b.advance(*advance);
        }

        result.map_ok(|_| ())
    }
}

impl<R> ZipEntryReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Returns the entry this reader is decoding.
    pub fn entry(&self) -> &LocalEntry {
        self.0.entry()
    }

    /// Computes and returns the CRC32 hash of bytes read by this reader so far.
    pub fn compute_hash(&self) -> u32 {
        self.0.compute_hash()
    }

    /// Reads all bytes until EOF has been reached, appending them to buf, and verifies the CRC32 values.
    pub async fn read_to_end_checked(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        self.0.read_to_end_checked(buf).await
    }

    /// Reads all bytes until EOF has been reached, placing them into buf, and verifies the CRC32 values.
    pub async fn read_to_string_checked(&mut self, buf: &mut String) -> Result<usize> {
        self.0.read_to_string_checked(buf).await
    }

    /// Consumes this reader and returns the wrapped runtime-agnostic reader.
    pub fn into_inner(self) -> BaseZipEntryReader<R> {
        self.0
    }
}
