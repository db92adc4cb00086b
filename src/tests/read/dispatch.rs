// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::parser::{parse_record, Record};
use crate::error::ZipError;
use crate::header::ZipHeader;
use crate::spec::consts::{
    CDH_SIGNATURE, DATA_DESCRIPTOR_SIGNATURE, DIGITAL_SIGNATURE_SIGNATURE, EOCDR_SIGNATURE, LFH_SIGNATURE,
    SPLIT_MARKER_SIGNATURE, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCDR_SIGNATURE,
};
use crate::spec::parse::read_u32;
use crate::tests::fixture::{put_u16, put_u32, put_u64, Fixture, FixtureEntry};
use crate::tests::init_logger;

use futures_lite::io::{AsyncReadExt, Cursor};

/// Dispatches on the signature at the cursor's position.
async fn dispatch(cursor: &mut Cursor<Vec<u8>>) -> crate::error::Result<Record> {
    let signature = read_u32(cursor).await?;
    parse_record(cursor, signature, None).await
}

async fn single_entry_archive() -> Vec<u8> {
    Fixture::new().entry(FixtureEntry::stored("a.txt", b"hello").comment("first")).comment(b"archive").build().await
}

#[tokio::test]
async fn local_file_header() {
    init_logger();
    let mut cursor = Cursor::new(single_entry_archive().await);

    let Record::Header(ZipHeader::LocalEntry(entry)) = dispatch(&mut cursor).await.unwrap() else {
        panic!("expected a local entry");
    };

    assert_eq!(entry.filename(), "a.txt");
    assert_eq!(entry.compressed_size(), 5);
    assert_eq!(entry.uncompressed_size(), 5);
    assert_eq!(entry.crc32(), crc32fast::hash(b"hello"));
    assert!(entry.is_sealed());
    assert!(entry.has_data());

    let mut data = [0; 5];
    cursor.read_exact(&mut data).await.unwrap();
    assert_eq!(&data, b"hello");
}

#[tokio::test]
async fn central_directory_header() {
    let archive = single_entry_archive().await;
    let directory_start = 30 + 5 + 5;
    let mut cursor = Cursor::new(archive);
    cursor.set_position(directory_start);

    let Record::Header(ZipHeader::DirectoryEntry(entry)) = dispatch(&mut cursor).await.unwrap() else {
        panic!("expected a directory entry");
    };

    assert_eq!(entry.filename(), "a.txt");
    assert_eq!(entry.comment(), "first");
    assert_eq!(entry.relative_offset_of_local_header(), 0);
    assert_eq!(entry.external_file_attribute() >> 16, 0o100644);
    assert!(!entry.is_dir());
}

#[tokio::test]
async fn end_of_central_directory() {
    let mut data = Vec::new();
    put_u32(&mut data, EOCDR_SIGNATURE);
    put_u16(&mut data, 0);
    put_u16(&mut data, 0);
    put_u16(&mut data, 3);
    put_u16(&mut data, 3);
    put_u32(&mut data, 120);
    put_u32(&mut data, 400);
    put_u16(&mut data, 2);
    data.extend_from_slice(b"hi");

    let Record::Header(ZipHeader::DirectoryEnd(end)) = dispatch(&mut Cursor::new(data)).await.unwrap() else {
        panic!("expected the end of central directory");
    };

    assert_eq!(end.entry_count(), 3);
    assert_eq!(end.directory_size(), 120);
    assert_eq!(end.directory_start_offset(), 400);
    assert_eq!(end.comment(), "hi");
}

#[tokio::test]
async fn data_descriptor_is_left_to_the_caller() {
    let mut data = Vec::new();
    put_u32(&mut data, DATA_DESCRIPTOR_SIGNATURE);
    put_u32(&mut data, 0xAABBCCDD);

    let mut cursor = Cursor::new(data);
    assert!(matches!(dispatch(&mut cursor).await.unwrap(), Record::DataDescriptor));
    assert_eq!(cursor.position(), 4);
}

#[tokio::test]
async fn digital_signature_is_skipped() {
    let mut data = Vec::new();
    put_u32(&mut data, DIGITAL_SIGNATURE_SIGNATURE);
    put_u16(&mut data, 3);
    data.extend_from_slice(&[1, 2, 3]);
    put_u32(&mut data, LFH_SIGNATURE);

    let mut cursor = Cursor::new(data);
    assert!(matches!(dispatch(&mut cursor).await.unwrap(), Record::Nothing));
    assert_eq!(read_u32(&mut cursor).await.unwrap(), LFH_SIGNATURE);
}

#[tokio::test]
async fn split_marker() {
    let mut data = Vec::new();
    put_u32(&mut data, SPLIT_MARKER_SIGNATURE);

    assert!(matches!(dispatch(&mut Cursor::new(data)).await.unwrap(), Record::Header(ZipHeader::Split)));
}

#[tokio::test]
async fn zip64_end_of_central_directory_is_ignored() {
    let mut data = Vec::new();
    put_u32(&mut data, ZIP64_EOCDR_SIGNATURE);
    put_u64(&mut data, 44 + 6);
    put_u16(&mut data, 45);
    put_u16(&mut data, 45);
    put_u32(&mut data, 0);
    put_u32(&mut data, 0);
    put_u64(&mut data, 1);
    put_u64(&mut data, 1);
    put_u64(&mut data, 46);
    put_u64(&mut data, 0);
    data.extend_from_slice(&[0xEE; 6]);
    put_u32(&mut data, ZIP64_EOCDL_SIGNATURE);
    put_u32(&mut data, 0);
    put_u64(&mut data, 0);
    put_u32(&mut data, 1);

    let mut cursor = Cursor::new(data);
    assert!(matches!(dispatch(&mut cursor).await.unwrap(), Record::Header(ZipHeader::Ignore)));
    assert!(matches!(dispatch(&mut cursor).await.unwrap(), Record::Header(ZipHeader::Ignore)));
    assert_eq!(cursor.position(), cursor.get_ref().len() as u64);
}

#[tokio::test]
async fn unknown_signature() {
    let mut data = Vec::new();
    put_u32(&mut data, 0xDEADBEEF);

    match dispatch(&mut Cursor::new(data)).await {
        Err(ZipError::UnknownHeader(0xDEADBEEF)) => (),
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("expected an unknown header error"),
    }
}

#[tokio::test]
async fn encrypted_entry_without_password() {
    let mut archive = single_entry_archive().await;
    // Set the encrypted flag of the local file header.
    archive[6] |= 1;

    assert!(matches!(dispatch(&mut Cursor::new(archive)).await, Err(ZipError::PasswordRequired)));
}

#[tokio::test]
async fn truncated_header() {
    let mut data = Vec::new();
    put_u32(&mut data, CDH_SIGNATURE);
    data.extend_from_slice(&[0; 10]);

    let err = match dispatch(&mut Cursor::new(data)).await {
        Err(err) => err,
        Ok(_) => panic!("expected a truncated header to fail"),
    };
    assert!(matches!(err, ZipError::UpstreamReadError(_)));
}
