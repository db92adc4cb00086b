// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A header parser which reads the central directory of a seekable source.

use crate::base::read::io::locator;
use crate::base::read::parser::{parse_record, read_directory_end_comment, read_local_entry, Record};
use crate::error::{Result, ZipError};
use crate::header::{DataLocation, DirectoryEnd, DirectoryEntry, LocalEntry, ZipHeader};
use crate::opts::ReadOptions;
use crate::spec::consts::{LFH_SIGNATURE, SIGNATURE_LENGTH, ZIP64_EOCDL_LENGTH, ZIP64_EOCDR_SIGNATURE};
use crate::spec::header::{
    DataDescriptor, EndOfCentralDirectoryHeader, Zip64EndOfCentralDirectoryLocator, Zip64EndOfCentralDirectoryRecord,
};
use crate::spec::parse::{assert_signature, read_u32};

use futures_lite::io::{AsyncBufRead, AsyncSeek, AsyncSeekExt, SeekFrom};

/// A header parser over a seekable source.
pub struct SeekableHeaderParser<R> {
    reader: R,
    options: ReadOptions,
}

impl<R> SeekableHeaderParser<R>
where
    R: AsyncBufRead + AsyncSeek + Unpin,
{
    pub fn new(reader: R, options: ReadOptions) -> Self {
        Self { reader, options }
    }

    /// Returns a mutable reference to the inner seekable source.
    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Locates and reads the end of central directory record, following the Zip64 locator when one precedes it.
    #[tracing::instrument(skip(self))]
    pub async fn locate_end_of_central_directory(&mut self) -> Result<DirectoryEnd> {
        let eocdr_offset = locator::eocdr(&mut self.reader, self.options.eocdr_search_limit).await?;

        self.reader.seek(SeekFrom::Start(eocdr_offset)).await?;
        let header = EndOfCentralDirectoryHeader::from_reader(&mut self.reader).await?;
        if header.is_spanned() {
            return Err(ZipError::FeatureNotSupported("Spanned/split files"));
        }
        let mut end = read_directory_end_comment(&mut self.reader, &header).await?;

        // The Zip64 locator sits directly before the EOCDR (whose offset excludes its signature).
        let locator = match eocdr_offset.checked_sub((ZIP64_EOCDL_LENGTH + 2 * SIGNATURE_LENGTH) as u64) {
            Some(locator_offset) => {
                self.reader.seek(SeekFrom::Start(locator_offset)).await?;
                Zip64EndOfCentralDirectoryLocator::try_from_reader(&mut self.reader).await?
            }
            None => None,
        };

        let Some(locator) = locator else {
            if header.is_zip64() {
                tracing::debug!("end of central directory holds Zip64 sentinels without a locator");
            }
            return Ok(end);
        };

        self.reader.seek(SeekFrom::Start(locator.relative_offset)).await?;
        assert_signature(&mut self.reader, ZIP64_EOCDR_SIGNATURE).await?;
        let zip64 = Zip64EndOfCentralDirectoryRecord::from_reader(&mut self.reader).await?;

        if zip64.disk_number != zip64.disk_number_start_of_cd
            || zip64.num_entries_in_directory != zip64.num_entries_in_directory_on_disk
        {
            return Err(ZipError::FeatureNotSupported("Spanned/split files"));
        }

        end.directory_start_offset = zip64.offset_of_start_of_directory;
        end.entry_count = zip64.num_entries_in_directory;
        end.directory_size = zip64.directory_size;

        tracing::debug!(directory_start_offset = end.directory_start_offset, "followed zip64 locator");
        Ok(end)
    }

    /// Reads every central directory entry, stopping at the first record which isn't one.
    #[tracing::instrument(skip(self, end))]
    pub async fn read_directory(&mut self, end: &DirectoryEnd) -> Result<Vec<DirectoryEntry>> {
        self.reader.seek(SeekFrom::Start(end.directory_start_offset)).await?;

        let capacity = usize::try_from(end.entry_count).unwrap_or(0).min(u16::MAX as usize);
        let mut entries = Vec::with_capacity(capacity);

        while let Some(ZipHeader::DirectoryEntry(entry)) = self.parse_next().await? {
            entries.push(entry);
        }

        let found = entries.len() as u64;
        if found < end.entry_count {
            return Err(ZipError::DirectoryTruncated { expected: end.entry_count, found });
        }
        if found > end.entry_count {
            tracing::warn!(expected = end.entry_count, found, "central directory holds more entries than declared");
        }

        tracing::debug!(entries = entries.len(), "read central directory");
        Ok(entries)
    }

    /// Parses the record at the source's current position.
    ///
    /// Local entries produced here are located at the source's position after their header. Data descriptors are
    /// consumed and produce no header.
    pub async fn parse_next(&mut self) -> Result<Option<ZipHeader>> {
        let signature = read_u32(&mut self.reader).await?;
        let password = self.options.password.as_deref();

        match parse_record(&mut self.reader, signature, password).await? {
            Record::Header(ZipHeader::LocalEntry(mut entry)) => {
                let offset = self.reader.seek(SeekFrom::Current(0)).await?;
                entry.data_location = DataLocation::Seekable { offset };
                entry.data_start_position = Some(offset);
                Ok(Some(ZipHeader::LocalEntry(entry)))
            }
            Record::Header(header) => Ok(Some(header)),
            Record::DataDescriptor => {
                DataDescriptor::from_reader(&mut self.reader, false).await?;
                Ok(None)
            }
            Record::Nothing => Ok(None),
        }
    }

    /// Re-parses the local file header of a central directory entry.
    ///
    /// Encryption is loaded from the local header, whilst the CRC and sizes are taken from the directory entry since
    /// the local header may defer them to a data descriptor.
    #[tracing::instrument(skip(self, entry), fields(filename = %entry.filename().to_string_lossy()))]
    pub async fn load_local_header(&mut self, entry: &DirectoryEntry) -> Result<LocalEntry> {
        self.reader.seek(SeekFrom::Start(entry.relative_offset_of_local_header)).await?;
        assert_signature(&mut self.reader, LFH_SIGNATURE).await?;

        let password = self.options.password.as_deref();
        let mut local =
            read_local_entry(&mut self.reader, password, Some(&entry.sizes), DataLocation::Streaming).await?;

        let offset = self.reader.seek(SeekFrom::Current(0)).await?;
        local.data_location = DataLocation::Seekable { offset };
        local.data_start_position = Some(offset);
        local.has_data = entry.has_data;

        Ok(local)
    }
}
