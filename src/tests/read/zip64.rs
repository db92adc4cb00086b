// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// Copyright (c) 2023 Cognite AS
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::tests::fixture::{Descriptor, Fixture, FixtureEntry};
use crate::tests::init_logger;

use futures_lite::io::{AsyncReadExt, Cursor};

const ZIP64_ZIP_CONTENTS: &str = "Hello World!\n";

/// Tests opening and reading a zip64 archive via its central directory.
#[tokio::test]
async fn test_read_zip64_archive_seek() {
    use crate::base::read::seek::ZipFileReader;
    init_logger();

    let archive = Fixture::new()
        .entry(FixtureEntry::stored("-", ZIP64_ZIP_CONTENTS.as_bytes()))
        .entry(FixtureEntry::stored("second", b"more"))
        .zip64()
        .build()
        .await;

    let mut reader = ZipFileReader::new(Cursor::new(archive)).await.unwrap();

    assert_eq!(reader.directory_end().entry_count(), 2);
    assert_eq!(reader.entries().len(), 2);
    assert!(reader.entries()[1].relative_offset_of_local_header() > 0);

    let mut entry_reader = reader.reader_with_entry(0).await.unwrap();
    let mut read_data = String::new();
    entry_reader.read_to_string_checked(&mut read_data).await.expect("read failed");
    assert_eq!(read_data, ZIP64_ZIP_CONTENTS);

    let mut entry_reader = reader.reader_with_entry(1).await.unwrap();
    let mut read_data = String::new();
    entry_reader.read_to_string_checked(&mut read_data).await.expect("read failed");
    assert_eq!(read_data, "more");
}

/// Like test_read_zip64_archive_seek() but for the streaming version.
#[tokio::test]
async fn test_read_zip64_archive_stream() {
    use crate::base::read::stream::ZipFileReader;
    init_logger();

    let archive = Fixture::new().entry(FixtureEntry::stored("-", ZIP64_ZIP_CONTENTS.as_bytes())).zip64().build().await;

    let reader = ZipFileReader::new(archive.as_slice());
    let mut entry_reader = reader.next_with_entry().await.unwrap().unwrap();

    assert_eq!(entry_reader.reader().entry().uncompressed_size(), ZIP64_ZIP_CONTENTS.len() as u64);

    let mut read_data = String::new();
    entry_reader.reader().read_to_string(&mut read_data).await.expect("read failed");
    assert_eq!(read_data, ZIP64_ZIP_CONTENTS);

    let reader = entry_reader.done().await.unwrap();
    assert!(reader.next_with_entry().await.unwrap().is_none());
}

/// Entries with a Zip64 extra field are followed by a descriptor with 64-bit sizes.
#[cfg(feature = "deflate")]
#[tokio::test]
async fn test_read_zip64_descriptor_stream() {
    use crate::base::read::stream::ZipFileReader;

    let archive = Fixture::new()
        .entry(FixtureEntry::deflated("-", ZIP64_ZIP_CONTENTS.as_bytes()).descriptor(Descriptor::Signed))
        .entry(FixtureEntry::stored("second", b"more"))
        .zip64()
        .build()
        .await;

    let reader = ZipFileReader::new(archive.as_slice());
    let entry_reader = reader.next_with_entry().await.unwrap().unwrap();
    let reader = entry_reader.skip().await.unwrap();

    let sealed = reader.last_entry().unwrap();
    assert_eq!(sealed.uncompressed_size(), ZIP64_ZIP_CONTENTS.len() as u64);
    assert_eq!(sealed.crc32(), crc32fast::hash(ZIP64_ZIP_CONTENTS.as_bytes()));

    let mut entry_reader = reader.next_with_entry().await.unwrap().unwrap();
    let mut read_data = String::new();
    entry_reader.reader().read_to_string_checked(&mut read_data).await.unwrap();
    assert_eq!(read_data, "more");
}
