// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Wires the encryption and compression layers of an entry over the shared source.

use crate::base::read::io::{
    cipher::CipherReader, compressed::CompressedReader, entry::ZipEntryReader, rewind::RewindableStream,
};
use crate::error::{Result, ZipError};
use crate::header::{DataLocation, LocalEntry};
use crate::spec::Compression;

use futures_lite::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, SeekFrom};

/// Opens an entry produced by the streaming parser. The stream must be positioned at the entry's payload.
pub(crate) async fn open_streaming<R>(
    stream: RewindableStream<R>,
    entry: LocalEntry,
) -> Result<ZipEntryReader<RewindableStream<R>>>
where
    R: AsyncRead + Unpin,
{
    if entry.data_location != DataLocation::Streaming {
        return Err(ZipError::FeatureNotSupported("seekable entries cannot be opened over a streaming source"));
    }

    open(stream, entry).await
}

/// Opens an entry produced by the seekable parser, seeking to its payload first.
pub(crate) async fn open_seekable<R>(mut reader: R, entry: LocalEntry) -> Result<ZipEntryReader<R>>
where
    R: AsyncBufRead + AsyncSeek + Unpin,
{
    let DataLocation::Seekable { offset } = entry.data_location else {
        return Err(ZipError::FeatureNotSupported("streaming entries cannot be opened over a seekable source"));
    };

    reader.seek(SeekFrom::Start(offset)).await?;
    open(reader, entry).await
}

#[tracing::instrument(skip(reader, entry), fields(filename = %entry.filename().to_string_lossy()))]
async fn open<R>(reader: R, entry: LocalEntry) -> Result<ZipEntryReader<R>>
where
    R: AsyncBufRead + Unpin,
{
    if !entry.has_data {
        let reader = CipherReader::plain(reader.take(0));
        let reader = CompressedReader::new(reader, Compression::Stored, Some(0)).await?;
        return Ok(ZipEntryReader::new(reader, entry));
    }

    // A provisional entry without sizes relies on its decoder to find the end of the data.
    let sizes_known = entry.is_sealed() || entry.compressed_size() != 0;

    if !sizes_known && entry.compression() == Compression::Stored {
        return Err(ZipError::FeatureNotSupported("stored entries with a data descriptor and no known size"));
    }
    if !sizes_known && entry.encryption.is_some() {
        return Err(ZipError::EncryptionRequiresKnownSize);
    }

    let limit = if sizes_known { entry.compressed_size() } else { u64::MAX };
    let trailer_length = entry.encryption.as_ref().map_or(0, |encryption| encryption.trailer_length());
    let payload_length = limit.saturating_sub(trailer_length);

    let uncompressed_size = match sizes_known && !entry.flags().lzma_end_marker {
        true => Some(entry.uncompressed_size()),
        false => None,
    };

    tracing::debug!(limit, compression = ?entry.compression(), "opening entry");

    let reader = CipherReader::new(reader.take(limit), entry.encryption.as_ref(), payload_length)?;
    let reader = CompressedReader::new(reader, entry.compression(), uncompressed_size).await?;

    Ok(ZipEntryReader::new(reader, entry))
}
