// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::stream::ZipFileReader;
use crate::error::ZipError;
use crate::spec::consts::DATA_DESCRIPTOR_SIGNATURE;
use crate::tests::fixture::{Descriptor, Fixture, FixtureEntry};
use crate::tests::init_logger;

use futures_lite::io::AsyncReadExt;

const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt...";

/// Reads every entry of an archive, returning the filenames and contents in order.
async fn read_all(archive: &[u8]) -> crate::error::Result<Vec<(String, Vec<u8>)>> {
    let mut zip = ZipFileReader::new(archive);
    let mut read = Vec::new();

    while let Some(mut entry) = zip.next_with_entry().await? {
        let filename = entry.reader().entry().filename().to_string_lossy();
        let mut data = Vec::new();
        entry.reader().read_to_end_checked(&mut data).await?;

        read.push((filename, data));
        zip = entry.done().await?;
    }

    Ok(read)
}

#[tokio::test]
async fn stored_entries() {
    init_logger();
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("a.txt", b"hello"))
        .entry(FixtureEntry::stored("dir/", b""))
        .entry(FixtureEntry::stored("b.txt", LOREM))
        .build()
        .await;

    let read = read_all(&archive).await.unwrap();

    assert_eq!(read.len(), 3);
    assert_eq!(read[0], ("a.txt".to_string(), b"hello".to_vec()));
    assert_eq!(read[1], ("dir/".to_string(), Vec::new()));
    assert_eq!(read[2], ("b.txt".to_string(), LOREM.to_vec()));
}

#[cfg(feature = "deflate")]
#[tokio::test]
async fn descriptor_seals_previous_entry() {
    init_logger();
    let archive = Fixture::new()
        .entry(FixtureEntry::deflated("a.txt", LOREM).descriptor(Descriptor::Signed))
        .entry(FixtureEntry::stored("b.txt", b"hello"))
        .build()
        .await;

    let zip = ZipFileReader::new(archive.as_slice());
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();

    // Nothing is known about the entry until its descriptor has been read.
    assert!(!entry.reader().entry().is_sealed());
    assert_eq!(entry.reader().entry().crc32(), 0);
    assert_eq!(entry.reader().entry().compressed_size(), 0);

    let mut data = Vec::new();
    entry.reader().read_to_end_checked(&mut data).await.unwrap();
    assert_eq!(data, LOREM);

    let zip = entry.done().await.unwrap();
    let sealed = zip.last_entry().expect("no previous entry");

    assert!(sealed.is_sealed());
    assert_eq!(sealed.crc32(), crc32fast::hash(LOREM));
    assert_eq!(sealed.uncompressed_size(), LOREM.len() as u64);
    assert!(sealed.compressed_size() > 0);
    assert_eq!(sealed.data_start_position(), Some(30 + 5));

    let mut entry = zip.next_with_entry().await.unwrap().unwrap();
    let mut data = String::new();
    entry.reader().read_to_string_checked(&mut data).await.unwrap();
    assert_eq!(data, "hello");

    let zip = entry.done().await.unwrap();
    assert!(zip.next_with_entry().await.unwrap().is_none());
}

#[cfg(feature = "deflate")]
#[tokio::test]
async fn descriptor_without_signature() {
    let archive = Fixture::new()
        .entry(FixtureEntry::deflated("a.txt", LOREM).descriptor(Descriptor::Unsigned))
        .entry(FixtureEntry::deflated("b.txt", b"hello hello hello").descriptor(Descriptor::Unsigned))
        .build()
        .await;

    let read = read_all(&archive).await.unwrap();

    assert_eq!(read[0].1, LOREM);
    assert_eq!(read[1].1, b"hello hello hello");
}

#[tokio::test]
async fn descriptor_with_sizes_in_header() {
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("a.txt", b"hello").descriptor(Descriptor::SignedWithSizes))
        .build()
        .await;

    let zip = ZipFileReader::new(archive.as_slice());
    let entry = zip.next_with_entry().await.unwrap().unwrap();
    let zip = entry.skip().await.unwrap();

    assert_eq!(zip.last_entry().unwrap().crc32(), crc32fast::hash(b"hello"));
}

#[tokio::test]
async fn empty_entry_with_descriptor() {
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("empty.txt", b"").descriptor(Descriptor::Signed))
        .entry(FixtureEntry::stored("a.txt", b"hello"))
        .build()
        .await;

    let zip = ZipFileReader::new(archive.as_slice());
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();
    assert!(!entry.reader().entry().has_data());

    let mut data = Vec::new();
    entry.reader().read_to_end_checked(&mut data).await.unwrap();
    assert!(data.is_empty());

    let zip = entry.done().await.unwrap();
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();
    assert_eq!(entry.reader().entry().filename(), "a.txt");

    let mut data = Vec::new();
    entry.reader().read_to_end_checked(&mut data).await.unwrap();
    assert_eq!(data, b"hello");
}

#[tokio::test]
async fn stored_entry_of_unknown_size() {
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("a.txt", b"hello").descriptor(Descriptor::Signed))
        .build()
        .await;

    let zip = ZipFileReader::new(archive.as_slice());
    assert!(matches!(zip.next_with_entry().await, Err(ZipError::FeatureNotSupported(_))));
}

#[tokio::test]
async fn corrupt_data_fails_crc_check() {
    let mut archive = Fixture::new().entry(FixtureEntry::stored("a.txt", b"hello")).build().await;
    archive[30 + 5] = b'j';

    let zip = ZipFileReader::new(archive.as_slice());
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();

    let mut data = Vec::new();
    let result = entry.reader().read_to_end_checked(&mut data).await;
    assert!(matches!(result, Err(ZipError::CRC32CheckError)));
    assert_eq!(data, b"jello");

    assert!(matches!(entry.done().await, Err(ZipError::CRC32CheckError)));
}

#[cfg(feature = "deflate")]
#[tokio::test]
async fn corrupt_descriptor_fails_crc_check() {
    let mut archive = Fixture::new()
        .entry(FixtureEntry::deflated("a.txt", LOREM).descriptor(Descriptor::Signed))
        .build()
        .await;

    let signature = DATA_DESCRIPTOR_SIGNATURE.to_le_bytes();
    let position = archive.windows(4).position(|window| window == signature).unwrap();
    archive[position + 4] ^= 0xFF;

    let zip = ZipFileReader::new(archive.as_slice());
    let entry = zip.next_with_entry().await.unwrap().unwrap();

    assert!(matches!(entry.skip().await, Err(ZipError::CRC32CheckError)));
}

#[tokio::test]
async fn done_before_eof() {
    let archive = Fixture::new().entry(FixtureEntry::stored("a.txt", b"hello")).build().await;

    let zip = ZipFileReader::new(archive.as_slice());
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();

    let mut partial = [0; 2];
    entry.reader().read_exact(&mut partial).await.unwrap();

    assert!(matches!(entry.done().await, Err(ZipError::EOFNotReached)));
}

#[tokio::test]
async fn entries_can_be_skipped() {
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("a.txt", LOREM))
        .entry(FixtureEntry::stored("b.txt", b"hello"))
        .build()
        .await;

    let mut zip = ZipFileReader::new(archive.as_slice());
    let mut filenames = Vec::new();

    while let Some(mut entry) = zip.next_with_entry().await.unwrap() {
        filenames.push(entry.reader().entry().filename().to_string_lossy());
        zip = entry.skip().await.unwrap();
    }

    assert_eq!(filenames, ["a.txt", "b.txt"]);
}

#[tokio::test]
async fn small_buffer_capacity() {
    let archive = Fixture::new()
        .entry(FixtureEntry::stored("a.txt", LOREM).descriptor(Descriptor::SignedWithSizes))
        .entry(FixtureEntry::stored("b.txt", b"hello"))
        .build()
        .await;

    let options = crate::opts::ReadOptions::new().buffer_capacity(3);
    let mut zip = ZipFileReader::with_options(archive.as_slice(), options);
    let mut read = Vec::new();

    while let Some(mut entry) = zip.next_with_entry().await.unwrap() {
        let mut data = Vec::new();
        entry.reader().read_to_end_checked(&mut data).await.unwrap();
        read.push(data);
        zip = entry.done().await.unwrap();
    }

    assert_eq!(read, [LOREM.to_vec(), b"hello".to_vec()]);
}

#[tokio::test]
async fn empty_input() {
    let zip = ZipFileReader::new(&[][..]);
    assert!(matches!(zip.next_with_entry().await, Err(ZipError::UpstreamReadError(_))));
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn tokio_source() {
    let archive = Fixture::new().entry(FixtureEntry::stored("a.txt", b"hello")).build().await;

    let zip = ZipFileReader::with_tokio(archive.as_slice());
    let mut entry = zip.next_with_entry().await.unwrap().unwrap();

    let mut data = Vec::new();
    entry.reader().read_to_end_checked(&mut data).await.unwrap();
    assert_eq!(data, b"hello");
}
