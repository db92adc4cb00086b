// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Parsers which turn record signatures and their following bytes into [`ZipHeader`]s.
//!
//! Two variants exist: [`StreamingHeaderParser`] walks the local file headers of a forward-only source, and
//! [`SeekableHeaderParser`] reads the central directory of a seekable source and re-parses local headers on demand.
//! The record readers here are shared by both; anything which depends on the source's position is left to the
//! variants.

pub mod seekable;
pub mod streaming;

pub use seekable::SeekableHeaderParser;
pub use streaming::StreamingHeaderParser;

use crate::base::read::io::{read_bytes, read_string};
use crate::crypto::{PkwareTraditionalCipher, WinzipAesKeys};
use crate::error::{Result, ZipError};
use crate::header::{
    DataLocation, DirectoryEnd, DirectoryEntry, EncryptionInfo, EntryMeta, EntrySizes, LocalEntry, Sizes, ZipHeader,
};
use crate::spec::consts::{
    CDH_SIGNATURE, DATA_DESCRIPTOR_SIGNATURE, DIGITAL_SIGNATURE_SIGNATURE, EOCDR_SIGNATURE, LFH_SIGNATURE,
    NON_ZIP64_MAX_SIZE, PKWARE_HEADER_LENGTH, SPLIT_MARKER_SIGNATURE, WINZIP_AES_VERIFY_LENGTH,
    ZIP64_EOCDL_LENGTH, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCDR_SIGNATURE,
};
use crate::spec::extra_field::{parse_extra_fields, winzip_aes_extra_field, zip64_extra_field, Zip64Presence};
use crate::spec::header::{
    CentralDirectoryRecord, EndOfCentralDirectoryHeader, ExtraField, LocalFileHeader, Zip64EndOfCentralDirectoryRecord,
};
use crate::spec::Compression;
use crate::string::ZipString;

use futures_lite::io::{AsyncRead, AsyncReadExt};

/// Returns whether a signature belongs to any record which may follow an entry's data.
pub(crate) fn is_header_signature(signature: u32) -> bool {
    matches!(
        signature,
        LFH_SIGNATURE
            | CDH_SIGNATURE
            | DATA_DESCRIPTOR_SIGNATURE
            | DIGITAL_SIGNATURE_SIGNATURE
            | EOCDR_SIGNATURE
            | SPLIT_MARKER_SIGNATURE
            | ZIP64_EOCDR_SIGNATURE
            | ZIP64_EOCDL_SIGNATURE
    )
}

/// The outcome of dispatching on a record signature, before any variant-specific handling.
pub(crate) enum Record {
    Header(ZipHeader),
    /// A data descriptor signature; its fields haven't been consumed.
    DataDescriptor,
    /// A record which produces no header (eg. a digital signature).
    Nothing,
}

/// Reads the record following `signature`, shared by both parser variants.
///
/// Local entries are returned without any position-dependent fields set. Data descriptors are left to the caller.
pub(crate) async fn parse_record<R>(reader: &mut R, signature: u32, password: Option<&[u8]>) -> Result<Record>
where
    R: AsyncRead + Unpin,
{
    tracing::trace!(signature = format_args!("{signature:#x}"), "dispatching record");

    match signature {
        LFH_SIGNATURE => {
            let entry = read_local_entry(reader, password, None, DataLocation::Streaming).await?;
            Ok(Record::Header(ZipHeader::LocalEntry(entry)))
        }
        CDH_SIGNATURE => Ok(Record::Header(ZipHeader::DirectoryEntry(read_directory_entry(reader).await?))),
        DATA_DESCRIPTOR_SIGNATURE => Ok(Record::DataDescriptor),
        DIGITAL_SIGNATURE_SIGNATURE => {
            let mut length = [0; 2];
            reader.read_exact(&mut length).await?;
            read_bytes(&mut *reader, u16::from_le_bytes(length).into()).await?;
            Ok(Record::Nothing)
        }
        EOCDR_SIGNATURE => Ok(Record::Header(ZipHeader::DirectoryEnd(read_directory_end(reader).await?))),
        SPLIT_MARKER_SIGNATURE => Ok(Record::Header(ZipHeader::Split)),
        ZIP64_EOCDR_SIGNATURE => {
            let record = Zip64EndOfCentralDirectoryRecord::from_reader(reader).await?;
            skip_bytes(reader, record.extensible_data_length()).await?;
            Ok(Record::Header(ZipHeader::Ignore))
        }
        ZIP64_EOCDL_SIGNATURE => {
            read_bytes(&mut *reader, ZIP64_EOCDL_LENGTH).await?;
            Ok(Record::Header(ZipHeader::Ignore))
        }
        other => Err(ZipError::UnknownHeader(other)),
    }
}

async fn skip_bytes<R>(reader: &mut R, length: u64) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let skipped = futures_lite::io::copy(reader.take(length), futures_lite::io::sink()).await?;
    if skipped != length {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

/// Reads a local file header (after its signature) and loads the entry's encryption.
///
/// `known` holds sizes already known from the central directory, which take precedence over the local header's.
#[tracing::instrument(skip(reader, password))]
pub(crate) async fn read_local_entry<R>(
    reader: &mut R,
    password: Option<&[u8]>,
    known: Option<&Sizes>,
    data_location: DataLocation,
) -> Result<LocalEntry>
where
    R: AsyncRead + Unpin,
{
    let header = LocalFileHeader::from_reader(reader).await?;
    let filename = read_string(&mut *reader, header.file_name_length.into(), header.flags.filename_unicode).await?;
    let extra_field = read_bytes(&mut *reader, header.extra_field_length.into()).await?;

    let presence = Zip64Presence {
        uncompressed_size: header.uncompressed_size,
        compressed_size: header.compressed_size,
        lh_offset: None,
    };
    let extra_fields = parse_extra_fields(&extra_field, presence)?;

    let (compressed_size, uncompressed_size) = match zip64_extra_field(&extra_fields) {
        Some(zip64) if header.is_zip64() => (
            zip64.compressed_size.unwrap_or(header.compressed_size.into()),
            zip64.uncompressed_size.unwrap_or(header.uncompressed_size.into()),
        ),
        _ => (header.compressed_size.into(), header.uncompressed_size.into()),
    };

    let mut meta = EntryMeta {
        filename,
        flags: header.flags,
        compression: Compression::from(header.compression),
        last_mod_date: header.mod_date,
        last_mod_time: header.mod_time,
        extra_fields,
    };

    let mut sizes = match known {
        Some(known) => EntrySizes::Sealed(*known),
        None if header.flags.data_descriptor => {
            EntrySizes::Provisional(Sizes { crc32: header.crc, compressed_size, uncompressed_size })
        }
        None => EntrySizes::Sealed(Sizes { crc32: header.crc, compressed_size, uncompressed_size }),
    };

    let raw_compressed_size = sizes.sizes().compressed_size;
    let encryption = load_encryption(reader, &mut meta, &sizes, header.mod_time, password).await?;

    if let Some(encryption) = encryption.as_ref() {
        let adjusted = raw_compressed_size.saturating_sub(encryption.header_length());
        match &mut sizes {
            EntrySizes::Sealed(sizes) | EntrySizes::Provisional(sizes) => sizes.compressed_size = adjusted,
        }
    }

    Ok(LocalEntry {
        meta,
        sizes,
        encryption,
        data_location,
        has_data: raw_compressed_size != 0,
        data_start_position: None,
    })
}

/// Reads and verifies the encryption header which precedes an encrypted entry's data.
///
/// For WinZip AES entries, the entry's compression method is replaced with the actual method from the AES extra field.
async fn load_encryption<R>(
    reader: &mut R,
    meta: &mut EntryMeta,
    sizes: &EntrySizes,
    mod_time: u16,
    password: Option<&[u8]>,
) -> Result<Option<EncryptionInfo>>
where
    R: AsyncRead + Unpin,
{
    if !meta.flags.encrypted {
        return Ok(None);
    }

    if sizes.sizes().compressed_size == 0 {
        if !sizes.is_sealed() {
            return Err(ZipError::EncryptionRequiresKnownSize);
        }
        // Nothing follows the header, not even an encryption header.
        return Ok(None);
    }

    let password = password.ok_or(ZipError::PasswordRequired)?;

    if meta.compression != Compression::WinzipAes {
        let mut header = [0; PKWARE_HEADER_LENGTH];
        reader.read_exact(&mut header).await?;

        let crc = sizes.sizes().crc32;
        let cipher = PkwareTraditionalCipher::for_read(password, header, crc, mod_time, meta.flags.data_descriptor)?;
        return Ok(Some(EncryptionInfo::PkwareTraditional(cipher)));
    }

    let aes = *winzip_aes_extra_field(&meta.extra_fields)
        .ok_or(ZipError::InvalidExtraData("winzip aes entry is missing its aes extra field"))?;
    let actual = Compression::from(aes.compression);
    if actual == Compression::WinzipAes {
        return Err(ZipError::InvalidExtraData("winzip aes extra field names itself as the actual compression method"));
    }

    let salt = read_bytes(&mut *reader, aes.strength.salt_length()).await?;
    let mut verify_value = [0; WINZIP_AES_VERIFY_LENGTH];
    reader.read_exact(&mut verify_value).await?;

    let keys = WinzipAesKeys::for_read(password, &salt, verify_value, aes.strength)?;
    meta.compression = actual;

    Ok(Some(EncryptionInfo::WinzipAes { keys, vendor_version: aes.vendor_version }))
}

/// Reads a central directory file header (after its signature).
#[tracing::instrument(skip(reader))]
pub(crate) async fn read_directory_entry<R>(reader: &mut R) -> Result<DirectoryEntry>
where
    R: AsyncRead + Unpin,
{
    let header = CentralDirectoryRecord::from_reader(reader).await?;
    let filename = read_string(&mut *reader, header.file_name_length.into(), header.flags.filename_unicode).await?;
    let extra_field = read_bytes(&mut *reader, header.extra_field_length.into()).await?;
    let comment = read_string(&mut *reader, header.file_comment_length.into(), header.flags.filename_unicode).await?;

    let presence = Zip64Presence {
        uncompressed_size: header.uncompressed_size,
        compressed_size: header.compressed_size,
        lh_offset: Some(header.lh_offset),
    };
    let extra_fields = parse_extra_fields(&extra_field, presence)?;
    let zip64 = zip64_extra_field(&extra_fields);

    let sizes = Sizes {
        crc32: header.crc,
        compressed_size: zip64.and_then(|zip64| zip64.compressed_size).unwrap_or(header.compressed_size.into()),
        uncompressed_size: zip64.and_then(|zip64| zip64.uncompressed_size).unwrap_or(header.uncompressed_size.into()),
    };

    let relative_offset_of_local_header = match zip64.and_then(|zip64| zip64.relative_header_offset) {
        Some(offset) if header.lh_offset == NON_ZIP64_MAX_SIZE => offset,
        _ => header.lh_offset.into(),
    };

    Ok(DirectoryEntry {
        meta: EntryMeta {
            filename,
            flags: header.flags,
            compression: Compression::from(header.compression),
            last_mod_date: header.mod_date,
            last_mod_time: header.mod_time,
            extra_fields,
        },
        has_data: sizes.compressed_size != 0,
        sizes,
        relative_offset_of_local_header,
        comment,
        version_made_by: header.v_made_by,
        internal_file_attribute: header.inter_attr,
        external_file_attribute: header.exter_attr,
    })
}

/// Reads an end of central directory record (after its signature) and the archive comment which follows it.
pub(crate) async fn read_directory_end<R>(reader: &mut R) -> Result<DirectoryEnd>
where
    R: AsyncRead + Unpin,
{
    let header = EndOfCentralDirectoryHeader::from_reader(reader).await?;
    read_directory_end_comment(reader, &header).await
}

/// Reads the archive comment which follows an already-parsed end of central directory record.
pub(crate) async fn read_directory_end_comment<R>(
    reader: &mut R,
    header: &EndOfCentralDirectoryHeader,
) -> Result<DirectoryEnd>
where
    R: AsyncRead + Unpin,
{
    let comment = read_string(&mut *reader, header.file_comm_length.into(), false).await?;
    Ok(directory_end_from(header, comment))
}

fn directory_end_from(header: &EndOfCentralDirectoryHeader, comment: ZipString) -> DirectoryEnd {
    DirectoryEnd {
        directory_start_offset: header.cent_dir_offset.into(),
        entry_count: header.num_of_entries.into(),
        directory_size: header.size_cent_dir.into(),
        comment,
    }
}

/// Returns whether an entry's descriptor uses 64-bit sizes.
pub(crate) fn uses_zip64_descriptor(extra_fields: &[ExtraField]) -> bool {
    zip64_extra_field(extra_fields).is_some()
}
