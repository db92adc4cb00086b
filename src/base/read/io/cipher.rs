// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::base::read::io::poll_result_ok;
use crate::crypto::{PkwareTraditionalCipher, WinzipAesCipher};
use crate::error::Result;
use crate::header::EncryptionInfo;
use crate::spec::consts::WINZIP_AES_AUTH_CODE_LENGTH;

use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_lite::io::{AsyncBufRead, AsyncRead};
use pin_project::pin_project;

/// The buffer size used when decrypting, equal to 8KiB.
const BUFFER_SIZE: usize = 8 * 1024;

enum Decryptor {
    PkwareTraditional(PkwareTraditionalCipher),
    /// Taken once the authentication code has been verified.
    WinzipAes(Option<WinzipAesCipher>),
}

impl Decryptor {
    fn decrypt(&mut self, buffer: &mut [u8]) {
        match self {
            Decryptor::PkwareTraditional(cipher) => cipher.decrypt(buffer),
            Decryptor::WinzipAes(Some(cipher)) => cipher.decrypt(buffer),
            Decryptor::WinzipAes(None) => {}
        }
    }
}

/// A wrapping reader which removes an entry's encryption layer, or passes data through untouched.
///
/// When decrypting, exactly `payload_length` bytes are decrypted. For WinZip AES entries, the authentication code
/// which follows the payload is then read and verified before EOF is reported.
#[pin_project]
pub(crate) struct CipherReader<R> {
    #[pin]
    reader: R,
    decryptor: Option<Decryptor>,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    remaining: u64,
    auth_code: Vec<u8>,
}

impl<R> CipherReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Constructs a new wrapping reader which passes data through untouched.
    pub(crate) fn plain(reader: R) -> Self {
        Self { reader, decryptor: None, buffer: Vec::new(), pos: 0, filled: 0, remaining: 0, auth_code: Vec::new() }
    }

    /// Constructs a new wrapping reader for an entry's payload.
    pub(crate) fn new(reader: R, encryption: Option<&EncryptionInfo>, payload_length: u64) -> Result<Self> {
        let decryptor = match encryption {
            None => return Ok(Self::plain(reader)),
            Some(EncryptionInfo::PkwareTraditional(cipher)) => Decryptor::PkwareTraditional(*cipher),
            Some(EncryptionInfo::WinzipAes { keys, .. }) => Decryptor::WinzipAes(Some(WinzipAesCipher::new(keys)?)),
        };

        Ok(Self {
            reader,
            decryptor: Some(decryptor),
            buffer: vec![0; BUFFER_SIZE],
            pos: 0,
            filled: 0,
            remaining: payload_length,
            auth_code: Vec::with_capacity(WINZIP_AES_AUTH_CODE_LENGTH),
        })
    }

    /// Consumes this reader and returns the inner value.
    pub(crate) fn into_inner(self) -> R {
        self.reader
    }

    /// Reads any ciphertext left behind by the decompressor, along with the WinZip AES authentication code.
    ///
    /// Decoders which carry their own end marker stop polling before the payload is exhausted, so this must be driven
    /// once they report EOF for the authentication code to be verified and the source left at the next header.
    pub(crate) fn poll_finish(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        if self.decryptor.is_none() {
            return Poll::Ready(Ok(()));
        }

        loop {
            let length = poll_result_ok!(ready!(self.as_mut().poll_fill_buf(cx))).len();
            if length == 0 {
                return Poll::Ready(Ok(()));
            }

            tracing::trace!(length, "discarding ciphertext after end of compressed stream");
            self.as_mut().consume(length);
        }
    }
}

impl<R> AsyncBufRead for CipherReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        let mut this = self.project();

        let Some(decryptor) = this.decryptor.as_mut() else {
            return this.reader.poll_fill_buf(cx);
        };

        if *this.pos < *this.filled {
            return Poll::Ready(Ok(&this.buffer[*this.pos..*this.filled]));
        }

        if *this.remaining > 0 {
            let data = poll_result_ok!(ready!(this.reader.as_mut().poll_fill_buf(cx)));
            if data.is_empty() {
                return Poll::Ready(Err(ErrorKind::UnexpectedEof.into()));
            }

            let length = data.len().min(this.buffer.len()).min(usize::try_from(*this.remaining).unwrap_or(usize::MAX));
            this.buffer[..length].copy_from_slice(&data[..length]);
            this.reader.as_mut().consume(length);

            decryptor.decrypt(&mut this.buffer[..length]);
            *this.pos = 0;
            *this.filled = length;
            *this.remaining -= length as u64;

            return Poll::Ready(Ok(&this.buffer[..length]));
        }

        if let Decryptor::WinzipAes(cipher) = decryptor {
            if cipher.is_some() {
                while this.auth_code.len() < WINZIP_AES_AUTH_CODE_LENGTH {
                    let data = poll_result_ok!(ready!(this.reader.as_mut().poll_fill_buf(cx)));
                    if data.is_empty() {
                        return Poll::Ready(Err(ErrorKind::UnexpectedEof.into()));
                    }

                    let length = data.len().min(WINZIP_AES_AUTH_CODE_LENGTH - this.auth_code.len());
                    this.auth_code.extend_from_slice(&data[..length]);
                    this.reader.as_mut().consume(length);
                }

                if let Some(cipher) = cipher.take() {
                    poll_result_ok!(cipher.verify_auth_code(this.auth_code).map_err(std::io::Error::from));
                }
            }
        }

        Poll::Ready(Ok(&[]))
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let this = self.project();

        if this.decryptor.is_none() {
            return this.reader.consume(amt);
        }

        *this.pos = (*this.pos + amt).min(*this.filled);
    }
}

impl<R> AsyncRead for CipherReader<R>
where
    R: AsyncBufRead + Unpin,
{
    fn poll_read(mut self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        if self.decryptor.is_none() {
            return self.project().reader.poll_read(c, b);
        }

        let available = poll_result_ok!(ready!(self.as_mut().poll_fill_buf(c)));
        let read = available.len().min(b.len());
        b[..read].copy_from_slice(&available[..read]);
        self.consume(read);

        Poll::Ready(Ok(read))
    }
}
