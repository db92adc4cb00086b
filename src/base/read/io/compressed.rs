// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::spec::Compression;

use std::pin::Pin;
use std::task::{Context, Poll};

#[cfg(any(
    feature = "deflate",
    feature = "bzip2",
    feature = "zstd",
    feature = "lzma",
    feature = "xz",
    feature = "deflate64"
))]
use async_compression::futures::bufread;
#[cfg(feature = "lzma")]
use futures_lite::io::{AsyncReadExt, Chain, Cursor};
use futures_lite::io::{AsyncBufRead, AsyncRead};
use pin_project::pin_project;

/// A wrapping reader which holds concrete types for all respective compression method readers.
#[pin_project(project = CompressedReaderProj)]
pub(crate) enum CompressedReader<R> {
    Stored(#[pin] R),
    #[cfg(feature = "deflate")]
    Deflate(#[pin] bufread::DeflateDecoder<R>),
    #[cfg(feature = "deflate64")]
    Deflate64(#[pin] bufread::Deflate64Decoder<R>),
    #[cfg(feature = "bzip2")]
    Bz(#[pin] bufread::BzDecoder<R>),
    #[cfg(feature = "lzma")]
    Lzma(#[pin] bufread::LzmaDecoder<Chain<Cursor<Vec<u8>>, R>>),
    #[cfg(feature = "zstd")]
    Zstd(#[pin] bufread::ZstdDecoder<R>),
    #[cfg(feature = "xz")]
    Xz(#[pin] bufread::XzDecoder<R>),
}

impl<R> CompressedReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Constructs a new wrapping reader from a generic [`AsyncBufRead`] implementer.
    ///
    /// For LZMA, the ZIP-specific properties header is read from the start of the reader. `uncompressed_size` is
    /// `None` when the stream is terminated by an end-of-stream marker instead.
    #[cfg_attr(not(feature = "lzma"), allow(unused_variables, unused_mut))]
    pub(crate) async fn new(mut reader: R, compression: Compression, uncompressed_size: Option<u64>) -> Result<Self> {
        match compression {
            Compression::Stored => Ok(CompressedReader::Stored(reader)),
            #[cfg(feature = "deflate")]
            Compression::Deflate => Ok(CompressedReader::Deflate(bufread::DeflateDecoder::new(reader))),
            #[cfg(feature = "deflate64")]
            Compression::Deflate64 => Ok(CompressedReader::Deflate64(bufread::Deflate64Decoder::new(reader))),
            #[cfg(feature = "bzip2")]
            Compression::Bz => Ok(CompressedReader::Bz(bufread::BzDecoder::new(reader))),
            #[cfg(feature = "lzma")]
            Compression::Lzma => {
                let header = lzma_alone_header(&mut reader, uncompressed_size).await?;
                Ok(CompressedReader::Lzma(bufread::LzmaDecoder::new(Cursor::new(header).chain(reader))))
            }
            #[cfg(feature = "zstd")]
            Compression::Zstd => Ok(CompressedReader::Zstd(bufread::ZstdDecoder::new(reader))),
            #[cfg(feature = "xz")]
            Compression::Xz => Ok(CompressedReader::Xz(bufread::XzDecoder::new(reader))),
            other => Err(ZipError::CompressionNotSupported(other.into())),
        }
    }

    /// Consumes this reader and returns the inner value.
    pub(crate) fn into_inner(self) -> R {
        match self {
            CompressedReader::Stored(inner) => inner,
            #[cfg(feature = "deflate")]
            CompressedReader::Deflate(inner) => inner.into_inner(),
            #[cfg(feature = "deflate64")]
            CompressedReader::Deflate64(inner) => inner.into_inner(),
            #[cfg(feature = "bzip2")]
            CompressedReader::Bz(inner) => inner.into_inner(),
            #[cfg(feature = "lzma")]
            CompressedReader::Lzma(inner) => inner.into_inner().into_inner().1,
            #[cfg(feature = "zstd")]
            CompressedReader::Zstd(inner) => inner.into_inner(),
            #[cfg(feature = "xz")]
            CompressedReader::Xz(inner) => inner.into_inner(),
        }
    }
}

impl<R> CompressedReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Returns a pinned mutable reference to the reader beneath the decompressor.
    pub(crate) fn get_pin_mut(self: Pin<&mut Self>) -> Pin<&mut R> {
        match self.project() {
            CompressedReaderProj::Stored(inner) => inner,
            #[cfg(feature = "deflate")]
            CompressedReaderProj::Deflate(inner) => inner.get_pin_mut(),
            #[cfg(feature = "deflate64")]
            CompressedReaderProj::Deflate64(inner) => inner.get_pin_mut(),
            #[cfg(feature = "bzip2")]
            CompressedReaderProj::Bz(inner) => inner.get_pin_mut(),
            #[cfg(feature = "lzma")]
            CompressedReaderProj::Lzma(inner) => Pin::new(inner.get_pin_mut().get_mut().get_mut().1),
            #[cfg(feature = "zstd")]
            CompressedReaderProj::Zstd(inner) => inner.get_pin_mut(),
            #[cfg(feature = "xz")]
            CompressedReaderProj::Xz(inner) => inner.get_pin_mut(),
        }
    }
}

/// Reads the ZIP LZMA properties header and rebuilds it as an `.lzma` (LZMA-alone) header.
///
/// ZIP stores a 2-byte LZMA SDK version and a 2-byte properties length ahead of the properties themselves, whereas the
/// decoder expects the properties followed by the 8-byte uncompressed size (all ones when unknown).
#[cfg(feature = "lzma")]
async fn lzma_alone_header<R>(reader: &mut R, uncompressed_size: Option<u64>) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0; 4];
    reader.read_exact(&mut prefix).await?;
    let properties_length = u16::from_le_bytes([prefix[2], prefix[3]]) as usize;

    let mut header = vec![0; properties_length];
    reader.read_exact(&mut header).await?;
    header.extend_from_slice(&uncompressed_size.unwrap_or(u64::MAX).to_le_bytes());

    Ok(header)
}

impl<R> AsyncRead for CompressedReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        match self.project() {
            CompressedReaderProj::Stored(inner) => inner.poll_read(c, b),
            #[cfg(feature = "deflate")]
            CompressedReaderProj::Deflate(inner) => inner.poll_read(c, b),
            #[cfg(feature = "deflate64")]
            CompressedReaderProj::Deflate64(inner) => inner.poll_read(c, b),
            #[cfg(feature = "bzip2")]
            CompressedReaderProj::Bz(inner) => inner.poll_read(c, b),
            #[cfg(feature = "lzma")]
            CompressedReaderProj::Lzma(inner) => inner.poll_read(c, b),
            #[cfg(feature = "zstd")]
            CompressedReaderProj::Zstd(inner) => inner.poll_read(c, b),
            #[cfg(feature = "xz")]
            CompressedReaderProj::Xz(inner) => inner.poll_read(c, b),
        }
    }
}
