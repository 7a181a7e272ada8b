use sensorcfg::record::{
    devices::ConfigPof,
    Checksum,
    Error,
    Record,
};

sensorcfg::record::impl_checksum!(pub Ccitt, u16, crc::CRC_16_IBM_3740);

/// `ConfigPof` v1 with hw_number 0xcca1 and cpu_serial 0x89d4382e, without its checksum.
const PAYLOAD: [u8; 10] = [0x01, 0x00, 0xa1, 0xcc, 0x00, 0x00, 0x2e, 0x38, 0xd4, 0x89];

fn ccitt_record() -> eyre::Result<Record<ConfigPof, Ccitt>> {
    let mut record = Record::<ConfigPof, Ccitt>::new();

    record.definition_mut().set_hw_number(0xcca1)?;
    record.definition_mut().set_cpu_serial(0x89d4382e)?;

    Ok(record)
}

#[test]
fn check_value() {
    assert_eq!(Ccitt::checksum(b"123456789"), 0x29b1);
    assert_eq!(Ccitt::checksum_array(b"123456789").as_slice(), &[0xb1, 0x29]);
}

#[test]
fn encode_decode() -> eyre::Result<()> {
    let encoded = ccitt_record()?.encode()?;

    assert_eq!(&encoded[..10], &PAYLOAD[..]);
    assert_eq!(&encoded[10..], &[0x6a, 0x4b]);

    let mut decoded = Record::<ConfigPof, Ccitt>::new();
    decoded.decode(&encoded)?;

    assert_eq!(decoded.version(), 1);
    assert_eq!(decoded.definition().hw_number(), Some(0xcca1));
    assert_eq!(decoded.definition().cpu_serial(), Some(0x89d4382e));

    Ok(())
}

#[test]
fn migrate() -> eyre::Result<()> {
    let mut record = ccitt_record()?;
    record.set_version(2);

    let encoded = record.encode()?;
    assert_eq!(encoded.len(), record.size_for_version(2)?);

    let mut decoded = Record::<ConfigPof, Ccitt>::new();
    decoded.decode(&encoded)?;

    assert_eq!(decoded.version(), 2);
    assert_eq!(decoded.definition().hw_number(), Some(0xcca1));
    assert_eq!(decoded.definition().cpu_serial(), Some(0x89d4382e));

    Ok(())
}

#[test]
fn standard_checksum_rejects() -> eyre::Result<()> {
    let encoded = ccitt_record()?.encode()?;

    let mut standard = Record::<ConfigPof>::new();
    assert!(matches!(standard.decode(&encoded), Err(Error::ChecksumMismatch { .. })));

    Ok(())
}
