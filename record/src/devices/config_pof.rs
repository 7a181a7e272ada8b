crate::record_definition! {
    /// Hardware identification block of a sensor node.
    ///
    /// Version 2 moved the CPU serial in front of the hardware number; both versions are 12 bytes
    /// on the wire.
    pub struct ConfigPof {
        version: u8,
        _reserved_0: reserved(1),
        hw_number: u16,
        _reserved_1: reserved(2),
        cpu_serial: u32,
        _reserved_2: reserved(3),
    }

    version = version;

    layouts {
        1 => [version, _reserved_0, hw_number, _reserved_1, cpu_serial],
        2 => [version, cpu_serial, hw_number, _reserved_2],
    }
}
