use std::{
    fmt::{
        Display,
        Formatter,
    },
    marker::PhantomData,
};

use bytes::{
    Bytes,
    BytesMut,
};
use packed_struct::{
    PackedStructSlice,
    PackingError,
    PackingResult,
};

use crate::{
    checksum,
    Checksum,
    Definition,
    Error,
    Field,
    Layout,
    Result,
    StandardCRC,
};

/// Structure version a record starts out with before anything is decoded into it.
pub const DEFAULT_VERSION: u8 = 1;

/// The structure version of an encoded record, without decoding anything else.
#[inline]
pub fn peek_version(bytes: &[u8]) -> Result<u8> {
    bytes.first().copied().ok_or(Error::TruncatedInput {
        needed:    1,
        available: 0,
    })
}

/// A record definition bound to the structure version it will be packed with.
///
/// `version` changes only on a successful [`decode`](Record::decode) or an explicit
/// [`set_version`](Record::set_version). Setting it between a decode and an encode migrates the
/// record to another layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<D, CRC = StandardCRC> {
    definition: D,
    version:    u8,
    _phantom:   PhantomData<CRC>,
}

impl<D, CRC> Record<D, CRC> {
    #[inline]
    pub fn from_definition(definition: D) -> Self {
        Self {
            definition,
            version: DEFAULT_VERSION,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    #[inline]
    pub fn definition(&self) -> &D {
        &self.definition
    }

    #[inline]
    pub fn definition_mut(&mut self) -> &mut D {
        &mut self.definition
    }

    #[inline]
    pub fn take(self) -> D {
        self.definition
    }
}

impl<D, CRC> Record<D, CRC>
where
    D: Default,
{
    #[inline]
    pub fn new() -> Self {
        Self::from_definition(D::default())
    }
}

impl<D, CRC> Default for Record<D, CRC>
where
    D: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, CRC> Record<D, CRC>
where
    D: Definition,
    CRC: Checksum,
{
    pub const CRC_SIZE: usize = checksum::size::<CRC>();

    /// The layout registered for `version`. It must lead with the version field.
    pub fn layout(version: u8) -> Result<Layout> {
        let layout = D::layout_for(version).ok_or(Error::UnknownVersion(version))?;

        if layout.fields().first() != Some(&D::VERSION_FIELD) {
            return Err(Error::MalformedLayout(version));
        }

        Ok(layout)
    }

    fn check_version_field(&self, version: u8) -> Result<()> {
        match self.definition.fields().get(D::VERSION_FIELD) {
            Some(Field::UInt8 {
                ..
            }) => Ok(()),
            _ => Err(Error::MalformedLayout(version)),
        }
    }

    /// Encoded size of a record of this type under `version`, checksum included.
    pub fn size_for_version(&self, version: u8) -> Result<usize> {
        let layout = Self::layout(version)?;

        Ok(layout.encoded_size::<CRC>(self.definition.fields()))
    }

    /// Unpack `bytes` into this record's fields.
    ///
    /// The layout is picked by the version in byte 0. On a checksum mismatch the fields have
    /// already been overwritten and must not be trusted; the version is only committed once the
    /// checksum has been verified. Bytes following the checksum are ignored.
    #[tracing::instrument(skip_all, fields(record = D::NAME, len = bytes.len()), err(Display))]
    pub fn decode(&mut self, bytes: &[u8]) -> Result<()> {
        let version = peek_version(bytes)?;
        let layout = Self::layout(version)?;
        self.check_version_field(version)?;

        let needed = layout.encoded_size::<CRC>(self.definition.fields());
        if bytes.len() < needed {
            return Err(Error::TruncatedInput {
                needed,
                available: bytes.len(),
            });
        }

        let mut cursor = bytes;

        let fields = self.definition.fields_mut();
        for &id in layout.fields() {
            fields[id].read(&mut cursor)?;
        }

        let payload_len = bytes.len() - cursor.len();
        let computed = CRC::checksum_array(&bytes[..payload_len]);
        let recorded = checksum::read::<CRC>(&mut cursor)?;

        if recorded != computed {
            tracing::error!(
                recorded = %hex::encode(&recorded),
                computed = %hex::encode(&computed),
                version,
                "record with invalid checksum"
            );

            return Err(Error::ChecksumMismatch {
                recorded,
                computed,
            });
        }

        if !cursor.is_empty() {
            tracing::debug!(trailing = cursor.len(), "ignoring bytes after checksum");
        }

        self.version = version;

        Ok(())
    }

    /// Pack the fields under the current version's layout and append the checksum.
    #[tracing::instrument(skip_all, fields(record = D::NAME, version = self.version), err(Display))]
    pub fn encode(&self) -> Result<Bytes> {
        let layout = Self::layout(self.version)?;
        self.check_version_field(self.version)?;

        let fields = self.definition.fields();

        let mut out = BytesMut::with_capacity(layout.encoded_size::<CRC>(fields));

        for &id in layout.fields() {
            let field = &fields[id];

            if id == D::VERSION_FIELD {
                let mut version = field.clone();
                version.assign(u64::from(self.version))?;
                version.write(&mut out)?;
            } else {
                field.write(&mut out)?;
            }
        }

        // the layout leads with a u8 version field, so byte 0 is already the version we packed with
        debug_assert_eq!(out.first(), Some(&self.version));

        let ck = CRC::checksum_array(&out);
        checksum::write(&mut out, &ck);

        Ok(out.freeze())
    }

    /// The named values of the current version's layout, as they would be packed. Reserved
    /// fields are left out.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let layout = Self::layout(self.version)?;
        let table = self.definition.fields();

        let fields = layout
            .fields()
            .iter()
            .map(|&id| (id, &table[id]))
            .filter(|(_, field)| !field.is_reserved())
            .map(|(id, field)| FieldValue {
                name:  field.name(),
                value: if id == D::VERSION_FIELD {
                    Some(u64::from(self.version))
                } else {
                    field.value()
                },
            })
            .collect();

        Ok(Snapshot {
            record: D::NAME,
            version: self.version,
            fields,
        })
    }
}

impl<D, CRC> AsRef<D> for Record<D, CRC> {
    fn as_ref(&self) -> &D {
        &self.definition
    }
}

impl<D, CRC> AsMut<D> for Record<D, CRC> {
    fn as_mut(&mut self) -> &mut D {
        &mut self.definition
    }
}

impl<D, CRC> PackedStructSlice for Record<D, CRC>
where
    D: Definition + Default,
    CRC: Checksum,
{
    fn pack_to_slice(&self, output: &mut [u8]) -> PackingResult<()> {
        let encoded = self.encode()?;

        if output.len() != encoded.len() {
            return Err(PackingError::BufferSizeMismatch {
                expected: encoded.len(),
                actual:   output.len(),
            });
        }

        output.copy_from_slice(&encoded);

        Ok(())
    }

    fn unpack_from_slice(src: &[u8]) -> PackingResult<Self> {
        let mut result = Self::new();
        result.decode(src)?;

        Ok(result)
    }

    fn packed_bytes_size(opt_self: Option<&Self>) -> PackingResult<usize> {
        let slf = opt_self.ok_or(PackingError::InstanceRequiredForSize)?;

        Ok(slf.size_for_version(slf.version)?)
    }
}

impl<D, CRC> Display for Record<D, CRC>
where
    D: Definition,
    CRC: Checksum,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.snapshot() {
            Ok(snapshot) => write!(f, "{snapshot}"),
            Err(_) => write!(f, "{} v{} <no layout>", D::NAME, self.version),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Snapshot {
    pub record:  &'static str,
    pub version: u8,
    pub fields:  Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldValue {
    pub name:  &'static str,
    pub value: Option<u64>,
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.record, self.version)?;

        for (i, FieldValue { name, value }) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };

            match value {
                Some(value) => write!(f, "{sep}{name} = {value:#x}")?,
                None => write!(f, "{sep}{name} = <unset>")?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    crate::record_definition! {
        /// Every field width, with `tag` shared by both versions at different offsets.
        struct Wide {
            version: u8,
            tag: u8,
            short: u16,
            long: u32,
            wide: u64,
            _gap: reserved(2),
        }

        version = version;

        layouts {
            3 => [version, tag, short, long, wide],
            4 => [version, _gap, wide, tag],
        }
    }

    type WideRecord = Record<Wide>;

    fn filled(tag: u8, short: u16, long: u32, wide: u64) -> WideRecord {
        let mut record = WideRecord::new();
        record.set_version(3);

        let def = record.definition_mut();
        def.set_tag(tag).unwrap();
        def.set_short(short).unwrap();
        def.set_long(long).unwrap();
        def.set_wide(wide).unwrap();

        record
    }

    #[test]
    fn fresh_record() {
        let record = WideRecord::new();

        assert_eq!(record.version(), DEFAULT_VERSION);
        assert_eq!(record.definition().tag(), None);
        assert_eq!(record.encode(), Err(Error::UnknownVersion(DEFAULT_VERSION)));
    }

    #[test]
    fn sizes() {
        let record = WideRecord::new();

        assert_eq!(record.size_for_version(3), Ok(1 + 1 + 2 + 4 + 8 + 2));
        assert_eq!(record.size_for_version(4), Ok(1 + 2 + 8 + 1 + 2));
        assert_eq!(record.size_for_version(1), Err(Error::UnknownVersion(1)));
        assert_eq!(Wide::versions(), &[3, 4]);
    }

    #[test]
    fn missing_value() {
        let mut record = WideRecord::new();
        record.set_version(4);
        record.definition_mut().set_tag(1).unwrap();

        assert_eq!(record.encode(), Err(Error::MissingValue("wide")));
    }

    #[test]
    fn version_field_follows_record() {
        // the version field is never assigned directly
        let mut record = filled(1, 2, 3, 4);
        assert_eq!(record.definition().version(), None);

        let encoded = record.encode().unwrap();
        assert_eq!(encoded[0], 3);

        record.set_version(4);
        let encoded = record.encode().unwrap();
        assert_eq!(encoded[0], 4);
        assert_eq!(encoded.len(), record.size_for_version(4).unwrap());
    }

    /// Hand-written definition whose layouts ignore the version field's place.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Misplaced {
        fields: Vec<Field>,
    }

    impl Default for Misplaced {
        fn default() -> Self {
            Self {
                fields: vec![
                    Field::UInt8 {
                        name:  "x",
                        value: Some(0xaa),
                    },
                    Field::UInt16 {
                        name:  "version",
                        value: None,
                    },
                ],
            }
        }
    }

    impl Definition for Misplaced {
        const NAME: &'static str = "Misplaced";
        const VERSION_FIELD: crate::FieldId = 1;

        fn versions() -> &'static [u8] {
            &[1, 2, 3]
        }

        fn layout_for(version: u8) -> Option<Layout> {
            match version {
                1 => Some(Layout::new(1, &[])),
                2 => Some(Layout::new(2, &[0, 1])),
                3 => Some(Layout::new(3, &[1, 0])),
                _ => None,
            }
        }

        fn fields(&self) -> &[Field] {
            &self.fields
        }

        fn fields_mut(&mut self) -> &mut [Field] {
            &mut self.fields
        }
    }

    #[test]
    fn layout_must_lead_with_version() {
        let mut record = Record::<Misplaced>::new();

        for version in [1, 2] {
            record.set_version(version);

            assert_eq!(record.encode(), Err(Error::MalformedLayout(version)));
            assert_eq!(Record::<Misplaced>::layout(version), Err(Error::MalformedLayout(version)));
        }

        let before = record.clone();
        assert_eq!(record.decode(&[2, 2, 0x80, 0xa1]), Err(Error::MalformedLayout(2)));
        assert_eq!(record, before);
    }

    #[test]
    fn version_field_must_be_u8() {
        let mut record = Record::<Misplaced>::new();
        record.set_version(3);

        assert_eq!(record.encode(), Err(Error::MalformedLayout(3)));
        assert_eq!(record.decode(&[3, 0, 0xaa, 0, 0]), Err(Error::MalformedLayout(3)));
        assert_eq!(record.definition().fields()[0].value(), Some(0xaa));
    }

    #[test]
    fn peek() {
        assert_eq!(peek_version(&[7, 1, 2]), Ok(7));
        assert_eq!(
            peek_version(&[]),
            Err(Error::TruncatedInput {
                needed:    1,
                available: 0,
            })
        );
    }

    #[test]
    fn unknown_version_reads_nothing() {
        let mut record = filled(1, 2, 3, 4);
        let before = record.clone();

        assert_eq!(record.decode(&[9; 32]), Err(Error::UnknownVersion(9)));
        assert_eq!(record, before);
    }

    #[test]
    fn truncated_reads_nothing() {
        let record = filled(0xaa, 2, 3, 4);
        let encoded = record.encode().unwrap();

        let mut other = WideRecord::new();

        for len in 1..encoded.len() {
            assert_eq!(
                other.decode(&encoded[..len]),
                Err(Error::TruncatedInput {
                    needed:    encoded.len(),
                    available: len,
                })
            );
            assert_eq!(other.definition().tag(), None);
        }
    }

    #[test]
    fn checksum_mismatch_keeps_version() {
        let record = filled(1, 2, 3, 4);
        let mut encoded = record.encode().unwrap().to_vec();

        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;

        let mut other = WideRecord::new();
        let result = other.decode(&encoded);

        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
        assert_eq!(other.version(), DEFAULT_VERSION);
    }

    #[test]
    fn trailing_bytes_ignored() {
        let record = filled(1, 2, 3, 4);
        let mut encoded = record.encode().unwrap().to_vec();
        encoded.extend_from_slice(&[0xde, 0xad]);

        let mut other = WideRecord::new();
        other.decode(&encoded).unwrap();

        assert_eq!(other.encode().unwrap(), &encoded[..encoded.len() - 2]);
    }

    #[test]
    fn packed_struct_interop() {
        let record = filled(1, 2, 3, 4);

        let packed = record.pack_to_vec().unwrap();
        assert_eq!(&packed[..], &record.encode().unwrap()[..]);

        let unpacked = WideRecord::unpack_from_slice(&packed).unwrap();
        assert_eq!(unpacked.version(), 3);
        assert_eq!(unpacked.definition().wide(), Some(4));

        assert_eq!(
            WideRecord::unpack_from_slice(&packed[..packed.len() - 1]),
            Err(PackingError::BufferTooSmall)
        );

        let mut short = [0u8; 4];
        assert!(matches!(
            record.pack_to_slice(&mut short),
            Err(PackingError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_skips_reserved() {
        let mut record = filled(1, 2, 3, 4);
        record.set_version(4);

        let snapshot = record.snapshot().unwrap();
        let names = snapshot.fields.iter().map(|f| f.name).collect::<Vec<_>>();

        assert_eq!(names, vec!["version", "wide", "tag"]);
        assert_eq!(snapshot.to_string(), "Wide v4: version = 0x4, wide = 0x4, tag = 0x1");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["fields"][1]["value"], 4);
    }

    prop_compose! {
        fn wide_strategy()(
            version in prop_oneof![Just(3u8), Just(4u8)],
            tag in any::<u8>(),
            short in any::<u16>(),
            long in any::<u32>(),
            wide in any::<u64>()
        ) -> WideRecord {
            let mut record = filled(tag, short, long, wide);
            record.set_version(version);

            record
        }
    }

    proptest! {
        #[test]
        fn encode_decode_equivalence(record in wide_strategy()) {
            let encoded = record.encode().unwrap();
            assert_eq!(encoded.len(), record.size_for_version(record.version()).unwrap());

            let mut decoded = WideRecord::new();
            decoded.decode(&encoded).unwrap();

            assert_eq!(decoded.version(), record.version());

            let layout = WideRecord::layout(record.version()).unwrap();
            for &id in layout.fields() {
                if id == Wide::VERSION_FIELD {
                    assert_eq!(decoded.definition().version(), Some(record.version()));
                } else {
                    assert_eq!(
                        decoded.definition().fields()[id].value(),
                        record.definition().fields()[id].value()
                    );
                }
            }

            assert_eq!(decoded.encode().unwrap(), encoded);
        }

        #[test]
        fn decode_arbitrary_never_panics(data in any::<Vec<u8>>()) {
            let mut record = WideRecord::new();
            let _ = record.decode(&data);
        }
    }
}
