use packed_struct::PackingError;

use crate::checksum;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no layout registered for structure version {0}")]
    UnknownVersion(u8),

    #[error("layout for structure version {0} does not begin with a u8 version field")]
    MalformedLayout(u8),

    #[error("record truncated (needed {needed} bytes, {available} available)")]
    TruncatedInput { needed: usize, available: usize },

    #[error(
        "checksum mismatch (recorded: 0x{}, computed: 0x{})",
        hex::encode(.recorded),
        hex::encode(.computed)
    )]
    ChecksumMismatch {
        recorded: checksum::Array,
        computed: checksum::Array,
    },

    #[error("field `{0}` has no value")]
    MissingValue(&'static str),

    #[error("value {value} does not fit field `{field}`")]
    ValueOutOfRange { field: &'static str, value: u64 },
}

impl From<Error> for PackingError {
    fn from(e: Error) -> Self {
        match e {
            Error::TruncatedInput {
                ..
            } => PackingError::BufferTooSmall,
            Error::UnknownVersion(_) | Error::ChecksumMismatch {
                ..
            } => PackingError::InvalidValue,
            Error::MalformedLayout(_) | Error::MissingValue(_) | Error::ValueOutOfRange {
                ..
            } => PackingError::InternalError,
        }
    }
}
