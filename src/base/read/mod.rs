// Copyright (c) 2022-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading ZIP files.

pub(crate) mod decoder;
pub(crate) mod io;
pub mod parser;
pub mod seek;
pub mod stream;

// Re-exported as part of the public API.
pub use crate::base::read::io::entry::ZipEntryReader;
pub use crate::base::read::io::rewind::RewindableStream;
