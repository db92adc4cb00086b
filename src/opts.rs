// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Options supplied when opening an archive for reading.

/// The number of byte positions searched backwards from the end of an archive for the end of central directory record.
pub const DEFAULT_EOCDR_SEARCH_LIMIT: usize = 1000;

/// The capacity of the buffer placed in front of a streaming source.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Options which apply to every entry of an archive.
///
/// ```
/// use async_unzip::opts::ReadOptions;
///
/// let options = ReadOptions::new().password("secret").eocdr_search_limit(4096);
/// assert_eq!(options.get_eocdr_search_limit(), 4096);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub(crate) password: Option<Vec<u8>>,
    pub(crate) eocdr_search_limit: usize,
    pub(crate) buffer_capacity: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { password: None, eocdr_search_limit: DEFAULT_EOCDR_SEARCH_LIMIT, buffer_capacity: DEFAULT_BUFFER_CAPACITY }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password used for all encrypted entries.
    pub fn password(mut self, password: impl AsRef<[u8]>) -> Self {
        self.password = Some(password.as_ref().to_vec());
        self
    }

    /// Sets how many byte positions are searched for the end of central directory record.
    ///
    /// Archives with a trailing comment longer than this limit won't be located.
    pub fn eocdr_search_limit(mut self, limit: usize) -> Self {
        self.eocdr_search_limit = limit;
        self
    }

    /// Sets the capacity of the buffer placed in front of a streaming source.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn get_password(&self) -> Option<&[u8]> {
        self.password.as_deref()
    }

    pub fn get_eocdr_search_limit(&self) -> usize {
        self.eocdr_search_limit
    }

    pub fn get_buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

impl std::fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("eocdr_search_limit", &self.eocdr_search_limit)
            .field("buffer_capacity", &self.buffer_capacity)
            .finish()
    }
}
