// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::io::{cipher::CipherReader, compressed::CompressedReader, poll_result_ok};
use crate::error::{Result, ZipError};
use crate::header::LocalEntry;

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crc32fast::Hasher;
use futures_lite::io::{AsyncBufRead, AsyncRead, AsyncReadExt, Take};
use pin_project::pin_project;

/// The full stack of layers between the shared source and decoded entry content.
pub(crate) type EntryStack<R> = CompressedReader<CipherReader<Take<R>>>;

/// A ZIP entry reader which removes any encryption, decompresses, and computes a CRC32 hash of the content read.
#[pin_project]
pub struct ZipEntryReader<R> {
    #[pin]
    reader: EntryStack<R>,
    hasher: Hasher,
    entry: LocalEntry,
}

impl<R> ZipEntryReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub(crate) fn new(reader: EntryStack<R>, entry: LocalEntry) -> Self {
        Self { reader, hasher: Hasher::new(), entry }
    }

    /// Returns the entry this reader is decoding.
    pub fn entry(&self) -> &LocalEntry {
        &self.entry
    }

    /// Computes and returns the CRC32 hash of bytes read by this reader so far.
    pub fn compute_hash(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Checks the computed hash against the entry's stored CRC, where one is meaningful.
    ///
    /// Entries still awaiting their data descriptor are checked once sealed by the streaming reader instead.
    pub(crate) fn check_hash(&self) -> Result<()> {
        let computed = self.compute_hash();

        if !self.entry.verifies_crc() || !self.entry.is_sealed() || computed == self.entry.crc32() {
            Ok(())
        } else {
            tracing::debug!(expected = self.entry.crc32(), computed, "CRC32 mismatch");
            Err(ZipError::CRC32CheckError)
        }
    }

    /// Reads all bytes until EOF has been reached, appending them to buf, and verifies the CRC32 values.
    ///
    /// This is a helper function synonymous to [`AsyncReadExt::read_to_end()`].
    pub async fn read_to_end_checked(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let read = self.read_to_end(buf).await?;
        self.check_hash()?;
        Ok(read)
    }

    /// Reads all bytes until EOF has been reached, placing them into buf, and verifies the CRC32 values.
    ///
    /// This is a helper function synonymous to [`AsyncReadExt::read_to_string()`].
    pub async fn read_to_string_checked(&mut self, buf: &mut String) -> Result<usize> {
        let read = self.read_to_string(buf).await?;
        self.check_hash()?;
        Ok(read)
    }

    /// Consumes this reader and returns the entry alongside the shared source, positioned after the bytes consumed.
    pub(crate) fn into_parts(self) -> (LocalEntry, R) {
        (self.entry, self.reader.into_inner().into_inner().into_inner())
    }
}

impl<R> AsyncRead for ZipEntryReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        let mut project = self.project();
        let written = poll_result_ok!(ready!(project.reader.as_mut().poll_read(c, b)));
        project.hasher.update(&b[..written]);

        if written == 0 && !b.is_empty() {
            poll_result_ok!(ready!(project.reader.get_pin_mut().poll_finish(c)));
        }

        Poll::Ready(Ok(written))
    }
}
