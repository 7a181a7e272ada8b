//! Versioned binary records: fixed-layout configuration structures exchanged with sensor
//! devices, each closed by a checksum.
//!
//! ```text
//! offset 0      : structure version (u8)
//! offset 1..N-1 : fields in the version's layout order, little-endian
//! offset N..N+1 : checksum over bytes [0, N)
//! ```

pub mod checksum;
mod definition;
pub mod devices;
mod error;
pub mod field;
mod layout;
mod record;

pub use checksum::Checksum;
pub use definition::Definition;
pub use error::{
    Error,
    Result,
};
pub use field::{
    Field,
    FieldId,
};
pub use layout::Layout;
pub use record::{
    peek_version,
    FieldValue,
    Record,
    Snapshot,
    DEFAULT_VERSION,
};

#[doc(hidden)]
pub mod __private {
    pub use byteorder;
    pub use crc;
    pub use paste::paste;
    pub use smallvec;
}

// CRC-16/ARC: poly 0x8005 reflected, init 0, no final xor
impl_checksum!(pub StandardCRC, u16, ::crc::CRC_16_ARC);
