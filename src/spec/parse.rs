// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::spec::consts::{
    CDH_LENGTH, DATA_DESCRIPTOR_LENGTH, EOCDR_LENGTH, LFH_LENGTH, NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE,
    ZIP64_DATA_DESCRIPTOR_LENGTH, ZIP64_EOCDL_LENGTH, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCDR_LENGTH,
};
use crate::spec::header::{
    CentralDirectoryRecord, DataDescriptor, EndOfCentralDirectoryHeader, GeneralPurposeFlag, LocalFileHeader,
    Zip64EndOfCentralDirectoryLocator, Zip64EndOfCentralDirectoryRecord,
};

use futures_lite::io::{AsyncRead, AsyncReadExt};

#[inline]
fn u16_at(value: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([value[index], value[index + 1]])
}

#[inline]
fn u32_at(value: &[u8], index: usize) -> u32 {
    u32::from_le_bytes([value[index], value[index + 1], value[index + 2], value[index + 3]])
}

#[inline]
fn u64_at(value: &[u8], index: usize) -> u64 {
    u64::from(u32_at(value, index)) | (u64::from(u32_at(value, index + 4)) << 32)
}

impl From<[u8; LFH_LENGTH]> for LocalFileHeader {
    fn from(value: [u8; LFH_LENGTH]) -> LocalFileHeader {
        LocalFileHeader {
            version: u16_at(&value, 0),
            flags: GeneralPurposeFlag::from(u16_at(&value, 2)),
            compression: u16_at(&value, 4),
            mod_time: u16_at(&value, 6),
            mod_date: u16_at(&value, 8),
            crc: u32_at(&value, 10),
            compressed_size: u32_at(&value, 14),
            uncompressed_size: u32_at(&value, 18),
            file_name_length: u16_at(&value, 22),
            extra_field_length: u16_at(&value, 24),
        }
    }
}

impl From<u16> for GeneralPurposeFlag {
    fn from(value: u16) -> GeneralPurposeFlag {
        let encrypted = !matches!(value & 0x1, 0);
        let lzma_end_marker = !matches!((value & 0x2) >> 1, 0);
        let data_descriptor = !matches!((value & 0x8) >> 3, 0);
        let filename_unicode = !matches!((value & 0x800) >> 11, 0);

        GeneralPurposeFlag { encrypted, lzma_end_marker, data_descriptor, filename_unicode }
    }
}

impl From<[u8; CDH_LENGTH]> for CentralDirectoryRecord {
    fn from(value: [u8; CDH_LENGTH]) -> CentralDirectoryRecord {
        CentralDirectoryRecord {
            v_made_by: u16_at(&value, 0),
            v_needed: u16_at(&value, 2),
            flags: GeneralPurposeFlag::from(u16_at(&value, 4)),
            compression: u16_at(&value, 6),
            mod_time: u16_at(&value, 8),
            mod_date: u16_at(&value, 10),
            crc: u32_at(&value, 12),
            compressed_size: u32_at(&value, 16),
            uncompressed_size: u32_at(&value, 20),
            file_name_length: u16_at(&value, 24),
            extra_field_length: u16_at(&value, 26),
            file_comment_length: u16_at(&value, 28),
            disk_start: u16_at(&value, 30),
            inter_attr: u16_at(&value, 32),
            exter_attr: u32_at(&value, 34),
            lh_offset: u32_at(&value, 38),
        }
    }
}

impl From<[u8; EOCDR_LENGTH]> for EndOfCentralDirectoryHeader {
    fn from(value: [u8; EOCDR_LENGTH]) -> EndOfCentralDirectoryHeader {
        EndOfCentralDirectoryHeader {
            disk_num: u16_at(&value, 0),
            start_cent_dir_disk: u16_at(&value, 2),
            num_of_entries_disk: u16_at(&value, 4),
            num_of_entries: u16_at(&value, 6),
            size_cent_dir: u32_at(&value, 8),
            cent_dir_offset: u32_at(&value, 12),
            file_comm_length: u16_at(&value, 16),
        }
    }
}

impl From<[u8; ZIP64_EOCDR_LENGTH]> for Zip64EndOfCentralDirectoryRecord {
    fn from(value: [u8; ZIP64_EOCDR_LENGTH]) -> Self {
        Self {
            size_of_zip64_end_of_cd_record: u64_at(&value, 0),
            version_made_by: u16_at(&value, 8),
            version_needed_to_extract: u16_at(&value, 10),
            disk_number: u32_at(&value, 12),
            disk_number_start_of_cd: u32_at(&value, 16),
            num_entries_in_directory_on_disk: u64_at(&value, 20),
            num_entries_in_directory: u64_at(&value, 28),
            directory_size: u64_at(&value, 36),
            offset_of_start_of_directory: u64_at(&value, 44),
        }
    }
}

impl From<[u8; ZIP64_EOCDL_LENGTH]> for Zip64EndOfCentralDirectoryLocator {
    fn from(value: [u8; ZIP64_EOCDL_LENGTH]) -> Self {
        Self {
            number_of_disk_with_start_of_zip64_end_of_central_directory: u32_at(&value, 0),
            relative_offset: u64_at(&value, 4),
            total_number_of_disks: u32_at(&value, 12),
        }
    }
}

impl LocalFileHeader {
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<LocalFileHeader> {
        let mut buffer: [u8; LFH_LENGTH] = [0; LFH_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(LocalFileHeader::from(buffer))
    }

    /// Returns whether either 32-bit size field defers to the Zip64 extended information extra field.
    pub fn is_zip64(&self) -> bool {
        self.compressed_size == NON_ZIP64_MAX_SIZE || self.uncompressed_size == NON_ZIP64_MAX_SIZE
    }
}

impl EndOfCentralDirectoryHeader {
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<EndOfCentralDirectoryHeader> {
        let mut buffer: [u8; EOCDR_LENGTH] = [0; EOCDR_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(EndOfCentralDirectoryHeader::from(buffer))
    }

    /// Returns whether the record describes an archive spanned or split across multiple disks.
    pub fn is_spanned(&self) -> bool {
        self.disk_num != self.start_cent_dir_disk || self.num_of_entries != self.num_of_entries_disk
    }

    /// Returns whether the entry count defers to the Zip64 end of central directory record.
    pub fn is_zip64(&self) -> bool {
        self.num_of_entries == NON_ZIP64_MAX_NUM_FILES || self.cent_dir_offset == NON_ZIP64_MAX_SIZE
    }
}

impl CentralDirectoryRecord {
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<CentralDirectoryRecord> {
        let mut buffer: [u8; CDH_LENGTH] = [0; CDH_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(CentralDirectoryRecord::from(buffer))
    }
}

impl Zip64EndOfCentralDirectoryRecord {
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Zip64EndOfCentralDirectoryRecord> {
        let mut buffer: [u8; ZIP64_EOCDR_LENGTH] = [0; ZIP64_EOCDR_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(Self::from(buffer))
    }

    /// Returns the length of the variable extensible data sector which follows the fixed fields.
    pub fn extensible_data_length(&self) -> u64 {
        // The stored size excludes the leading 12 bytes (signature & size field).
        self.size_of_zip64_end_of_cd_record.saturating_sub((ZIP64_EOCDR_LENGTH - 8) as u64)
    }
}

impl Zip64EndOfCentralDirectoryLocator {
    /// Read 20 bytes from the reader and attempt to parse a Zip64EndOfCentralDirectoryLocator.
    /// If the signature does not match, None is returned.
    pub async fn try_from_reader<R: AsyncRead + Unpin>(
        reader: &mut R,
    ) -> Result<Option<Zip64EndOfCentralDirectoryLocator>> {
        let signature = {
            let mut buffer = [0; 4];
            reader.read_exact(&mut buffer).await?;
            u32::from_le_bytes(buffer)
        };
        if signature != ZIP64_EOCDL_SIGNATURE {
            return Ok(None);
        }

        Ok(Some(Self::from_reader(reader).await?))
    }

    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Zip64EndOfCentralDirectoryLocator> {
        let mut buffer: [u8; ZIP64_EOCDL_LENGTH] = [0; ZIP64_EOCDL_LENGTH];
        reader.read_exact(&mut buffer).await?;
        Ok(Self::from(buffer))
    }
}

impl DataDescriptor {
    /// Reads the fields of a data descriptor which follow its (optional) signature.
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R, zip64: bool) -> Result<DataDescriptor> {
        if zip64 {
            let mut buffer = [0; ZIP64_DATA_DESCRIPTOR_LENGTH];
            reader.read_exact(&mut buffer).await?;

            return Ok(DataDescriptor {
                crc: u32_at(&buffer, 0),
                compressed_size: u64_at(&buffer, 4),
                uncompressed_size: u64_at(&buffer, 12),
            });
        }

        let mut buffer = [0; DATA_DESCRIPTOR_LENGTH];
        reader.read_exact(&mut buffer).await?;

        Ok(DataDescriptor {
            crc: u32_at(&buffer, 0),
            compressed_size: u32_at(&buffer, 4).into(),
            uncompressed_size: u32_at(&buffer, 8).into(),
        })
    }
}

/// Read a single little-endian u32 (typically a record signature).
pub(crate) async fn read_u32<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<u32> {
    let mut buffer = [0; 4];
    reader.read_exact(&mut buffer).await?;
    Ok(u32::from_le_bytes(buffer))
}

/// Assert that the next four-byte signature read by a reader matches the expected signature.
pub(crate) async fn assert_signature<R: AsyncRead + Unpin>(reader: &mut R, expected: u32) -> Result<()> {
    match read_u32(reader).await? {
        actual if actual == expected => Ok(()),
        actual => Err(ZipError::UnexpectedHeaderError(actual, expected)),
    }
}
