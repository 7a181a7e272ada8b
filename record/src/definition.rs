use crate::{
    Field,
    FieldId,
    Layout,
};

/// A concrete record type: its field table and the layout of every structure version it knows.
///
/// Layouts refer to fields by handle, so a field shared between versions is a single entry in
/// the table and a value assigned to it is visible whichever layout is used to pack.
///
/// Definitions are normally declared with [`record_definition!`](crate::record_definition).
pub trait Definition {
    /// Record type name, for diagnostics.
    const NAME: &'static str;

    /// The field carrying the structure version. Always written from the record's version when
    /// packing.
    const VERSION_FIELD: FieldId;

    /// Every structure version with a registered layout, ascending.
    fn versions() -> &'static [u8];

    fn layout_for(version: u8) -> Option<Layout>;

    fn fields(&self) -> &[Field];
    fn fields_mut(&mut self) -> &mut [Field];
}

/// Declare a [`Definition`] as a data table.
///
/// Generates the struct, a `Default` impl with every value unset, a `FieldId` constant per field
/// (the field name uppercased) and a getter/setter pair for every integer field. Reserved fields
/// are declared as `reserved(<size>)` and get no accessors.
///
/// The version field must be a `u8`, and every layout must begin with it.
///
/// ```
/// sensorcfg_record::record_definition! {
///     pub struct Probe {
///         version: u8,
///         _pad: reserved(1),
///         serial: u32,
///     }
///
///     version = version;
///
///     layouts {
///         1 => [version, _pad, serial],
///         2 => [version, serial],
///     }
/// }
///
/// let mut probe = Probe::default();
/// probe.set_serial(7).unwrap();
/// assert_eq!(probe.serial(), Some(7));
/// ```
///
/// A layout that doesn't lead with the version field is rejected at compile time:
///
/// ```compile_fail
/// sensorcfg_record::record_definition! {
///     struct Backwards {
///         version: u8,
///         serial: u32,
///     }
///
///     version = version;
///
///     layouts {
///         1 => [serial, version],
///     }
/// }
/// ```
///
/// as is a version field wider than one byte:
///
/// ```compile_fail
/// sensorcfg_record::record_definition! {
///     struct Wide {
///         version: u16,
///         serial: u32,
///     }
///
///     version = version;
///
///     layouts {
///         1 => [version, serial],
///     }
/// }
/// ```
///
/// or an empty layout:
///
/// ```compile_fail
/// sensorcfg_record::record_definition! {
///     struct Empty {
///         version: u8,
///     }
///
///     version = version;
///
///     layouts {
///         1 => [],
///     }
/// }
/// ```
#[macro_export]
macro_rules! record_definition {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $field:ident : $kind:ident $( ( $size:literal ) )? ),+ $(,)?
        }

        version = $version_field:ident;

        layouts {
            $( $version:literal => [ $first:ident $( , $member:ident )* $(,)? ] ),+ $(,)?
        }
    ) => {
        $crate::__private::paste! {
            #[allow(non_camel_case_types, dead_code, clippy::enum_variant_names)]
            #[derive(Clone, Copy)]
            enum [< $name Slot >] {
                $( $field ),+
            }

            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            $vis struct $name {
                fields: ::std::vec::Vec<$crate::Field>,
            }

            #[allow(dead_code)]
            impl $name {
                $(
                    pub const [< $field:upper >]: $crate::FieldId = [< $name Slot >]::$field as usize;
                )+

                $(
                    $crate::__accessors!($field : $kind $( ( $size ) )?);
                )+
            }

            const _: () = {
                const WIDTHS: &[::std::option::Option<usize>] =
                    &[$( $crate::__width!($kind $( ( $size ) )?) ),+];

                let version = [< $name Slot >]::$version_field as usize;

                ::std::assert!(
                    ::std::matches!(WIDTHS[version], ::std::option::Option::Some(1)),
                    "the version field must be a u8"
                );

                $(
                    ::std::assert!(
                        [< $name Slot >]::$first as usize == version,
                        "every layout must begin with the version field"
                    );
                )+
            };

            impl ::std::default::Default for $name {
                fn default() -> Self {
                    Self {
                        fields: ::std::vec![
                            $( $crate::__field!($field : $kind $( ( $size ) )?) ),+
                        ],
                    }
                }
            }

            impl $crate::Definition for $name {
                const NAME: &'static str = ::std::stringify!($name);
                const VERSION_FIELD: $crate::FieldId = [< $name Slot >]::$version_field as usize;

                #[inline]
                fn versions() -> &'static [u8] {
                    &[$( $version ),+]
                }

                fn layout_for(version: u8) -> ::std::option::Option<$crate::Layout> {
                    match version {
                        $(
                            $version => {
                                const FIELDS: &[$crate::FieldId] = &[
                                    [< $name Slot >]::$first as usize,
                                    $( [< $name Slot >]::$member as usize ),*
                                ];

                                ::std::option::Option::Some($crate::Layout::new($version, FIELDS))
                            },
                        )+
                        _ => ::std::option::Option::None,
                    }
                }

                #[inline]
                fn fields(&self) -> &[$crate::Field] {
                    &self.fields
                }

                #[inline]
                fn fields_mut(&mut self) -> &mut [$crate::Field] {
                    &mut self.fields
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field {
    ($field:ident : reserved ( $size:literal )) => {
        $crate::Field::reserved(::std::stringify!($field), $size)
    };

    ($field:ident : $ty:ident) => {
        <$ty as $crate::field::Primitive>::field(::std::stringify!($field))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __width {
    (reserved ( $size:literal )) => {
        ::std::option::Option::None
    };

    ($ty:ident) => {
        ::std::option::Option::Some(::std::mem::size_of::<$ty>())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __accessors {
    ($field:ident : reserved ( $size:literal )) => {};

    ($field:ident : $ty:ident) => {
        $crate::__private::paste! {
            #[inline]
            pub fn $field(&self) -> ::std::option::Option<$ty> {
                <$ty as $crate::field::Primitive>::load(&self.fields[Self::[< $field:upper >]])
            }

            #[inline]
            pub fn [< set_ $field >](&mut self, value: $ty) -> $crate::Result<()> {
                <$ty as $crate::field::Primitive>::store(value, &mut self.fields[Self::[< $field:upper >]])
            }
        }
    };
}
