// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Stream ciphers for the two encryption schemes supported when reading entries.

pub mod pkware;
pub mod winzip_aes;

pub use winzip_aes::{WinzipAesCipher, WinzipAesKeys};
pub use pkware::PkwareTraditionalCipher;
