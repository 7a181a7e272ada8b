use bytes::{
    Buf,
    BufMut,
};

use crate::{
    Error,
    Result,
};

/// Index of a [`Field`] in its definition's field table.
pub type FieldId = usize;

/// A single fixed-width datum in a record, or a reserved gap.
///
/// Integer values are unset until they are either decoded or assigned. All
/// integers travel little-endian.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    UInt8 {
        name:  &'static str,
        value: Option<u8>,
    },
    UInt16 {
        name:  &'static str,
        value: Option<u16>,
    },
    UInt32 {
        name:  &'static str,
        value: Option<u32>,
    },
    UInt64 {
        name:  &'static str,
        value: Option<u64>,
    },
    /// Padding that is always written as zeroes. Whatever is read into it is dropped.
    Reserved {
        name: &'static str,
        size: usize,
    },
}

impl Field {
    #[inline]
    pub const fn reserved(name: &'static str, size: usize) -> Self {
        Field::Reserved {
            name,
            size,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match *self {
            Field::UInt8 {
                name,
                ..
            }
            | Field::UInt16 {
                name,
                ..
            }
            | Field::UInt32 {
                name,
                ..
            }
            | Field::UInt64 {
                name,
                ..
            }
            | Field::Reserved {
                name,
                ..
            } => name,
        }
    }

    #[inline]
    pub const fn size_bytes(&self) -> usize {
        match self {
            Field::UInt8 {
                ..
            } => 1,
            Field::UInt16 {
                ..
            } => 2,
            Field::UInt32 {
                ..
            } => 4,
            Field::UInt64 {
                ..
            } => 8,
            Field::Reserved {
                size,
                ..
            } => *size,
        }
    }

    #[inline]
    pub const fn is_reserved(&self) -> bool {
        matches!(self, Field::Reserved { .. })
    }

    /// The current value widened to `u64`. Always `None` for reserved fields.
    pub fn value(&self) -> Option<u64> {
        match *self {
            Field::UInt8 {
                value, ..
            } => value.map(u64::from),
            Field::UInt16 {
                value, ..
            } => value.map(u64::from),
            Field::UInt32 {
                value, ..
            } => value.map(u64::from),
            Field::UInt64 {
                value, ..
            } => value,
            Field::Reserved {
                ..
            } => None,
        }
    }

    /// Set the value from a widened integer, failing if it doesn't fit this field's width.
    pub fn assign(&mut self, new: u64) -> Result<()> {
        let out_of_range = Error::ValueOutOfRange {
            field: self.name(),
            value: new,
        };

        match self {
            Field::UInt8 {
                value, ..
            } => *value = Some(u8::try_from(new).map_err(|_| out_of_range)?),
            Field::UInt16 {
                value, ..
            } => *value = Some(u16::try_from(new).map_err(|_| out_of_range)?),
            Field::UInt32 {
                value, ..
            } => *value = Some(u32::try_from(new).map_err(|_| out_of_range)?),
            Field::UInt64 {
                value, ..
            } => *value = Some(new),
            Field::Reserved {
                ..
            } => return Err(out_of_range),
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        match self {
            Field::UInt8 {
                value, ..
            } => *value = None,
            Field::UInt16 {
                value, ..
            } => *value = None,
            Field::UInt32 {
                value, ..
            } => *value = None,
            Field::UInt64 {
                value, ..
            } => *value = None,
            Field::Reserved {
                ..
            } => {},
        }
    }

    pub fn write(&self, sink: &mut impl BufMut) -> Result<()> {
        let missing = || Error::MissingValue(self.name());

        match *self {
            Field::UInt8 {
                value, ..
            } => sink.put_u8(value.ok_or_else(missing)?),
            Field::UInt16 {
                value, ..
            } => sink.put_u16_le(value.ok_or_else(missing)?),
            Field::UInt32 {
                value, ..
            } => sink.put_u32_le(value.ok_or_else(missing)?),
            Field::UInt64 {
                value, ..
            } => sink.put_u64_le(value.ok_or_else(missing)?),
            Field::Reserved {
                size, ..
            } => sink.put_bytes(0, size),
        }

        Ok(())
    }

    pub fn read(&mut self, source: &mut impl Buf) -> Result<()> {
        let needed = self.size_bytes();

        if source.remaining() < needed {
            return Err(Error::TruncatedInput {
                needed,
                available: source.remaining(),
            });
        }

        match self {
            Field::UInt8 {
                value, ..
            } => *value = Some(source.get_u8()),
            Field::UInt16 {
                value, ..
            } => *value = Some(source.get_u16_le()),
            Field::UInt32 {
                value, ..
            } => *value = Some(source.get_u32_le()),
            Field::UInt64 {
                value, ..
            } => *value = Some(source.get_u64_le()),
            Field::Reserved {
                size, ..
            } => source.advance(*size),
        }

        Ok(())
    }
}

/// An unsigned integer type that can be stored in a [`Field`] of the same width.
pub trait Primitive: Copy + Sized + Into<u64> {
    fn field(name: &'static str) -> Field;

    /// Extract the value if `field` is of this width and set.
    fn load(field: &Field) -> Option<Self>;

    /// Store into `field`, which must be of this width.
    fn store(self, field: &mut Field) -> Result<()>;
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident) => {
        impl Primitive for $ty {
            #[inline]
            fn field(name: &'static str) -> Field {
                Field::$variant {
                    name,
                    value: None,
                }
            }

            #[inline]
            fn load(field: &Field) -> Option<Self> {
                match field {
                    Field::$variant {
                        value, ..
                    } => *value,
                    _ => None,
                }
            }

            #[inline]
            fn store(self, field: &mut Field) -> Result<()> {
                let name = field.name();

                match field {
                    Field::$variant {
                        value, ..
                    } => {
                        *value = Some(self);
                        Ok(())
                    },
                    _ => Err(Error::ValueOutOfRange {
                        field: name,
                        value: self.into(),
                    }),
                }
            }
        }
    };
}

impl_primitive!(u8, UInt8);
impl_primitive!(u16, UInt16);
impl_primitive!(u32, UInt32);
impl_primitive!(u64, UInt64);
