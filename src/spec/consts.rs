// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub const SIGNATURE_LENGTH: usize = 4;

// Local file header constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#437
pub const LFH_SIGNATURE: u32 = 0x4034b50;
pub const LFH_LENGTH: usize = 26;

// Central directory header constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4312
pub const CDH_SIGNATURE: u32 = 0x2014b50;
pub const CDH_LENGTH: usize = 42;

// End of central directory record constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316
pub const EOCDR_SIGNATURE: u32 = 0x6054b50;
pub const EOCDR_LENGTH: usize = 18;

// Zip64 end of central directory record & locator constants
//
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4314
pub const ZIP64_EOCDR_SIGNATURE: u32 = 0x06064b50;
pub const ZIP64_EOCDR_LENGTH: usize = 52;
// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4315
pub const ZIP64_EOCDL_SIGNATURE: u32 = 0x07064b50;
pub const ZIP64_EOCDL_LENGTH: usize = 16;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#439
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x8074b50;
pub const DATA_DESCRIPTOR_LENGTH: usize = 12;
pub const ZIP64_DATA_DESCRIPTOR_LENGTH: usize = 20;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4313
pub const DIGITAL_SIGNATURE_SIGNATURE: u32 = 0x05054b50;

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#8522
pub const SPLIT_MARKER_SIGNATURE: u32 = 0x30304b50;

/// The value stored in a 32-bit field when the real value lives within the Zip64 extended information extra field.
pub const NON_ZIP64_MAX_SIZE: u32 = 0xFFFFFFFF;
pub const NON_ZIP64_MAX_NUM_FILES: u16 = 0xFFFF;

/// The length of the PKWARE traditional encryption header which precedes encrypted entry data.
pub const PKWARE_HEADER_LENGTH: usize = 12;

// WinZip AES constants
//
// https://www.winzip.com/en/support/aes-encryption/
pub const WINZIP_AES_VENDOR_ID: u16 = 0x4541;
pub const WINZIP_AES_VERIFY_LENGTH: usize = 2;
pub const WINZIP_AES_AUTH_CODE_LENGTH: usize = 10;
pub const WINZIP_AES_KDF_ITERATIONS: u32 = 1000;
