// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which holds relevant error reporting structures/types.

use thiserror::Error;

/// A Result type alias over ZipError to minimise repetition.
pub type Result<V> = std::result::Result<V, ZipError>;

/// An enum of possible errors and their descriptions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("feature not supported: '{0}'")]
    FeatureNotSupported(&'static str),
    #[error("compression not supported: {0}")]
    CompressionNotSupported(u16),
    #[error("attempted to read a ZIP64 file whilst on a 32-bit target")]
    TargetZip64NotSupported,

    #[error("unable to locate the end of central directory record")]
    DirectoryNotFound,
    #[error("the central directory ended after {found} of {expected} entries")]
    DirectoryTruncated { expected: u64, found: u64 },
    #[error("encountered an unknown header signature: {0:#x}")]
    UnknownHeader(u32),
    #[error("Encountered an unexpected header (actual: {0:#x}, expected: {1:#x}).")]
    UnexpectedHeaderError(u32, u32),
    #[error("invalid extra field data: {0}")]
    InvalidExtraData(&'static str),
    #[error("encrypted entries cannot be read without a known compressed size")]
    EncryptionRequiresKnownSize,
    #[error("zip string is not valid UTF-8")]
    StringNotUtf8,

    #[error("a password is required to read an encrypted entry")]
    PasswordRequired,
    #[error("the supplied password is incorrect")]
    PasswordIncorrect,
    #[error("the authentication code of an encrypted entry did not match")]
    AuthenticationFailed,

    #[error("an upstream reader returned an error: {0}")]
    UpstreamReadError(#[source] std::io::Error),
    #[error("a computed CRC32 value did not match the expected value")]
    CRC32CheckError,
    #[error("entry index was out of bounds")]
    EntryIndexOutOfBounds,
    #[error("attempted to complete an entry before its EOF was reached")]
    EOFNotReached,
}

impl ZipError {
    /// Returns whether this error stems from malformed, unrecognised, or unsupported archive structures.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ZipError::FeatureNotSupported(_)
                | ZipError::CompressionNotSupported(_)
                | ZipError::TargetZip64NotSupported
                | ZipError::DirectoryNotFound
                | ZipError::DirectoryTruncated { .. }
                | ZipError::UnknownHeader(_)
                | ZipError::UnexpectedHeaderError(_, _)
                | ZipError::InvalidExtraData(_)
                | ZipError::EncryptionRequiresKnownSize
        )
    }

    /// Returns whether this error stems from a missing or incorrect password, or failed authentication.
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, ZipError::PasswordRequired | ZipError::PasswordIncorrect | ZipError::AuthenticationFailed)
    }
}

impl From<std::io::Error> for ZipError {
    /// Errors raised whilst polling an entry reader travel as an [`std::io::Error`] wrapping a [`ZipError`]; these are
    /// unwrapped here so that callers see the original variant.
    fn from(error: std::io::Error) -> Self {
        if !error.get_ref().is_some_and(|inner| inner.is::<ZipError>()) {
            return ZipError::UpstreamReadError(error);
        }

        match error.into_inner().map(|inner| inner.downcast::<ZipError>()) {
            Some(Ok(inner)) => *inner,
            _ => ZipError::UpstreamReadError(std::io::ErrorKind::InvalidData.into()),
        }
    }
}

impl From<ZipError> for std::io::Error {
    fn from(error: ZipError) -> Self {
        match error {
            ZipError::UpstreamReadError(inner) => inner,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
