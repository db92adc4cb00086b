// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A header parser which walks the records of a forward-only source.
//!
//! Entries written with a post-data descriptor don't know their CRC or sizes upfront, so their headers start out
//! provisional. Once the entry's data has been read, the descriptor which follows it is read and the header is sealed
//! before the next record is parsed.

use crate::base::read::io::rewind::RewindableStream;
use crate::base::read::parser::{is_header_signature, parse_record, uses_zip64_descriptor, Record};
use crate::error::Result;
use crate::header::{LocalEntry, Sizes, ZipHeader};
use crate::opts::ReadOptions;
use crate::spec::consts::DATA_DESCRIPTOR_SIGNATURE;
use crate::spec::header::DataDescriptor;
use crate::spec::parse::read_u32;

use futures_lite::io::{AsyncRead, AsyncReadExt};

/// A header parser over a forward-only source.
///
/// The data of each local entry returned must be fully consumed from [`Self::stream_mut`] before the next call to
/// [`Self::parse_next`].
pub struct StreamingHeaderParser<R> {
    stream: RewindableStream<R>,
    options: ReadOptions,
    last_entry: Option<LocalEntry>,
}

impl<R> StreamingHeaderParser<R>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a new parser from a forward-only source.
    pub fn new(reader: R, options: ReadOptions) -> Self {
        let stream = RewindableStream::with_capacity(options.buffer_capacity, reader);
        Self { stream, options, last_entry: None }
    }

    pub(crate) fn from_parts(stream: RewindableStream<R>, options: ReadOptions, last_entry: Option<LocalEntry>) -> Self {
        Self { stream, options, last_entry }
    }

    pub(crate) fn into_parts(self) -> (RewindableStream<R>, ReadOptions, Option<LocalEntry>) {
        (self.stream, self.options, self.last_entry)
    }

    /// Returns the most recently parsed local entry.
    ///
    /// Its sizes are only final once [`Self::seal_previous`] has run (which [`Self::parse_next`] does first).
    pub fn last_entry(&self) -> Option<&LocalEntry> {
        self.last_entry.as_ref()
    }

    /// Returns a mutable reference to the shared stream.
    pub fn stream_mut(&mut self) -> &mut RewindableStream<R> {
        &mut self.stream
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Seals the previous entry from the data descriptor following its data, if it's still provisional.
    ///
    /// The stream must be positioned at the end of the entry's compressed data.
    pub async fn seal_previous(&mut self) -> Result<()> {
        if !self.last_entry.as_ref().is_some_and(|entry| !entry.is_sealed()) {
            return Ok(());
        }

        let position = self.stream.position();

        // The descriptor's signature is optional, so peek at it and rewind if it's absent.
        self.stream.start_recording();
        let signature = read_u32(&mut self.stream).await?;
        if signature == DATA_DESCRIPTOR_SIGNATURE {
            self.stream.stop_recording();
        } else {
            self.stream.rewind();
        }

        self.apply_descriptor(position).await
    }

    /// Reads a descriptor's fields and seals the previous entry with them. `data_end` is the stream position at which
    /// the entry's compressed data ended.
    async fn apply_descriptor(&mut self, data_end: u64) -> Result<()> {
        let Some(entry) = self.last_entry.as_mut() else {
            return Ok(());
        };

        let descriptor = DataDescriptor::from_reader(&mut self.stream, uses_zip64_descriptor(&entry.extra_fields)).await?;
        if entry.is_sealed() {
            tracing::trace!("discarded data descriptor of a sealed entry");
            return Ok(());
        }

        let header_length = entry.encryption.as_ref().map_or(0, |encryption| encryption.header_length());
        let compressed_size = descriptor.compressed_size.saturating_sub(header_length);

        entry.seal(Sizes {
            crc32: descriptor.crc,
            compressed_size,
            uncompressed_size: descriptor.uncompressed_size,
        });
        entry.data_start_position = Some(data_end.saturating_sub(compressed_size));

        tracing::debug!(
            filename = %entry.filename().to_string_lossy(),
            crc32 = descriptor.crc,
            compressed_size,
            uncompressed_size = descriptor.uncompressed_size,
            "sealed entry from data descriptor"
        );

        Ok(())
    }

    /// Parses the next record, first sealing the previous entry if needed.
    ///
    /// Returns `None` for records which produce no header (data descriptors and digital signatures).
    pub async fn parse_next(&mut self) -> Result<Option<ZipHeader>> {
        self.seal_previous().await?;

        let signature = read_u32(&mut self.stream).await?;
        let password = self.options.password.as_deref();

        match parse_record(&mut self.stream, signature, password).await? {
            Record::Header(ZipHeader::LocalEntry(mut entry)) => {
                entry.data_start_position = Some(self.stream.position());
                entry.has_data = self.has_data(&entry).await?;

                tracing::debug!(
                    filename = %entry.filename().to_string_lossy(),
                    compression = ?entry.compression(),
                    encrypted = entry.encryption.is_some(),
                    has_data = entry.has_data,
                    "parsed local entry"
                );

                self.last_entry = Some(entry.clone());
                Ok(Some(ZipHeader::LocalEntry(entry)))
            }
            Record::Header(header) => Ok(Some(header)),
            Record::DataDescriptor => {
                let data_end = self.stream.position().saturating_sub(4);
                self.apply_descriptor(data_end).await?;
                Ok(None)
            }
            Record::Nothing => Ok(None),
        }
    }

    /// Decides whether a freshly parsed entry carries any data.
    ///
    /// Entries with a known non-zero size do. Entries with a descriptor and no known size are checked by peeking at
    /// the next four bytes: data is present unless they form a record signature.
    async fn has_data(&mut self, entry: &LocalEntry) -> Result<bool> {
        if entry.has_data {
            return Ok(true);
        }
        if entry.is_sealed() {
            return Ok(false);
        }

        self.stream.start_recording();
        let mut peeked = [0; 4];
        let result = self.stream.read_exact(&mut peeked).await;
        self.stream.rewind();
        result?;

        Ok(!is_header_signature(u32::from_le_bytes(peeked)))
    }
}
