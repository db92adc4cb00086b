// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316>
//!
//! As with other ZIP libraries, we face the predicament that the end of central directory record may contain a
//! variable-length file comment. As a result, we cannot just make the assumption that the start of this record is
//! 18 bytes (the length of the EOCDR) offset from the end of the data - we must locate it ourselves.
//!
//! The signature is searched for one byte position at a time backwards from the last position it could start at,
//! bounded by a configurable number of positions. Rather than seeking and reading four bytes per position, the whole
//! searchable tail is read in once and searched in reverse.

use crate::error::{Result as ZipResult, ZipError};
use crate::spec::consts::{EOCDR_SIGNATURE, SIGNATURE_LENGTH};

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, SeekFrom};

/// Locate the `end of central directory record` offset, if one exists.
/// The returned offset excludes the signature (4 bytes).
///
/// `search_limit` is the number of candidate positions checked, starting at `length - 4` and moving backwards.
#[tracing::instrument(skip(reader))]
pub async fn eocdr<R>(mut reader: R, search_limit: usize) -> ZipResult<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let length = reader.seek(SeekFrom::End(0)).await?;
    if length < SIGNATURE_LENGTH as u64 {
        return Err(ZipError::DirectoryNotFound);
    }

    // The earliest candidate starts `search_limit - 1` bytes before the last, so the window spans the candidates plus
    // the trailing bytes of the final signature.
    let window = (search_limit as u64).saturating_add(SIGNATURE_LENGTH as u64 - 1).min(length);
    let position = length - window;

    let mut buffer = vec![0; window as usize];
    reader.seek(SeekFrom::Start(position)).await?;
    reader.read_exact(&mut buffer).await?;

    match reverse_search_buffer(&buffer, &EOCDR_SIGNATURE.to_le_bytes()) {
        Some(match_index) => {
            let offset = position + (match_index + 1) as u64;
            tracing::debug!(offset, "located end of central directory record");
            Ok(offset)
        }
        None => Err(ZipError::DirectoryNotFound),
    }
}

/// A naive reverse linear search along the buffer for the specified signature bytes.
///
/// Returns the index of the last byte of the match nearest the end of the buffer.
pub(crate) fn reverse_search_buffer(buffer: &[u8], signature: &[u8]) -> Option<usize> {
    'outer: for index in (0..buffer.len()).rev() {
        for (signature_index, signature_byte) in signature.iter().rev().enumerate() {
            if let Some(next_index) = index.checked_sub(signature_index) {
                if buffer[next_index] != *signature_byte {
                    continue 'outer;
                }
            } else {
                break 'outer;
            }
        }
        return Some(index);
    }
    None
}
