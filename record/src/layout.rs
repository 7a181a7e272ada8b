use crate::{
    checksum,
    Checksum,
    Field,
    FieldId,
};

/// The wire order of one structure version: handles into the owning definition's field table.
///
/// The checksum is never part of a layout; it always trails the last field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    version: u8,
    fields:  &'static [FieldId],
}

impl Layout {
    #[inline]
    pub const fn new(version: u8, fields: &'static [FieldId]) -> Self {
        Self {
            version,
            fields,
        }
    }

    #[inline]
    pub const fn version(&self) -> u8 {
        self.version
    }

    #[inline]
    pub const fn fields(&self) -> &'static [FieldId] {
        self.fields
    }

    /// Size of all fields, excluding the checksum.
    pub fn payload_size(&self, table: &[Field]) -> usize {
        self.fields.iter().map(|&id| table[id].size_bytes()).sum()
    }

    pub fn encoded_size<CRC>(&self, table: &[Field]) -> usize
    where
        CRC: Checksum,
    {
        self.payload_size(table) + checksum::size::<CRC>()
    }

    /// Each field paired with its byte offset in the encoded record.
    pub fn entries<'a>(&self, table: &'a [Field]) -> Vec<(usize, &'a Field)> {
        let mut offset = 0;

        self.fields
            .iter()
            .map(|&id| {
                let field = &table[id];
                let entry = (offset, field);

                offset += field.size_bytes();
                entry
            })
            .collect()
    }
}
