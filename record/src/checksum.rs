use bytes::{
    Buf,
    BufMut,
};

use crate::{
    Error,
    Result,
};

/// Checksum bytes in wire order.
pub type Array = smallvec::SmallVec<[u8; 8]>;

/// An integrity code computed over the encoded bytes of a record.
pub trait Checksum {
    type Output: num_traits::PrimInt;

    fn checksum(vals: &[u8]) -> Self::Output;

    /// The checksum of `vals`, serialized in the byte order it takes on the wire.
    fn checksum_array(vals: &[u8]) -> Array;
}

#[inline]
pub const fn size<T>() -> usize
where
    T: Checksum,
{
    std::mem::size_of::<T::Output>()
}

/// Consume a recorded checksum from the front of `source`.
pub fn read<CRC>(source: &mut impl Buf) -> Result<Array>
where
    CRC: Checksum,
{
    let needed = size::<CRC>();

    if source.remaining() < needed {
        return Err(Error::TruncatedInput {
            needed,
            available: source.remaining(),
        });
    }

    let mut ret = smallvec::smallvec![0u8; needed];
    source.copy_to_slice(&mut ret[..]);

    Ok(ret)
}

#[inline]
pub fn write(sink: &mut impl BufMut, value: &Array) {
    sink.put_slice(value.as_slice());
}

#[macro_export]
macro_rules! impl_checksum {
    ($vis:vis $name:ident, u8, $algo:expr) => {
        $crate::impl_checksum!($vis $name, u8, $algo, vals, {
            let mut ret = $crate::__private::smallvec::SmallVec::new();
            ret.push(Self::checksum(vals));

            ret
        });
    };

    ($vis:vis $name:ident, $ty:ty, $algo:expr) => {
        $crate::impl_checksum!($vis $name, $ty, $algo, $crate::__private::byteorder::LE);
    };

    ($vis:vis $name:ident, $ty:ty, $algo:expr, $endian:ty) => {
        $crate::impl_checksum!($vis $name, $ty, $algo, vals, {
            $crate::__private::paste! {
                let mut ret = $crate::__private::smallvec::smallvec![0u8; ::std::mem::size_of::<$ty>()];

                <$endian as $crate::__private::byteorder::ByteOrder>::[< write_ $ty >](&mut ret[..], Self::checksum(vals));
                ret
            }
        });
    };

    ($vis:vis $name:ident, $ty:ty, $algo:expr, $vals:ident, $array_body:expr) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::checksum::Checksum for $name {
            type Output = $ty;

            fn checksum(vals: &[u8]) -> Self::Output {
                const INSTANCE: $crate::__private::crc::Crc<$ty> =
                    $crate::__private::crc::Crc::<$ty>::new(&$algo);

                INSTANCE.checksum(vals)
            }

            fn checksum_array($vals: &[u8]) -> $crate::checksum::Array {
                $array_body
            }
        }
    };
}
