use thiserror::Error;

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that abort an extraction as a whole.
///
/// Individual records or descriptors that fail to decode are skipped and
/// reported through the extraction's `unresolved` list instead; only the
/// structural failures below are fatal.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The markup contains no decodable flight push statements
    #[error("Unable to parse Next.js flight chunks from preview HTML")]
    NoFlightChunks,

    /// The decoded payload holds no file descriptor records
    #[error("No file descriptors found in preview payload")]
    NoFileDescriptors,

    /// Descriptors were found but every data pointer dangled
    #[error("Found file descriptors but could not resolve any file content references: {}", unresolved.join(", "))]
    NoResolvedFiles {
        /// `name ($ref)` diagnostics, in descriptor order
        unresolved: Vec<String>,
    },
}
