use std::io::Read;

use base64::Engine;

#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub struct Input {
    #[structopt(
        long,
        help = "interpret stdin as hex (can be space and/or newline separated, does not strip 0x)"
    )]
    hex: bool,

    #[structopt(long, help = "interpret stdin as base64")]
    base64: bool,
}

impl Input {
    pub fn read(&self, mut r: impl Read) -> eyre::Result<Vec<u8>> {
        let mut buf = vec![];
        r.read_to_end(&mut buf)?;

        self.parse(buf)
    }

    fn parse(&self, buf: Vec<u8>) -> eyre::Result<Vec<u8>> {
        let result = match self {
            Input {
                hex: true,
                ..
            } => {
                let s = String::from_utf8(buf)?;
                hex::decode(s.trim().replace(&[' ', '\t', '\n', '\r'][..], ""))?
            },
            Input {
                base64: true,
                ..
            } => {
                let s = String::from_utf8(buf)?;
                base64::engine::general_purpose::STANDARD.decode(s.trim())?
            },
            _ => buf,
        };

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const RECORD: [u8; 12] = [0x01, 0x00, 0xa1, 0xcc, 0x00, 0x00, 0x2e, 0x38, 0xd4, 0x89, 0x80, 0x3e];

    fn input(hex: bool, base64: bool) -> Input {
        Input {
            hex,
            base64,
        }
    }

    #[test]
    fn raw() -> eyre::Result<()> {
        assert_eq!(input(false, false).read(&RECORD[..])?, RECORD);
        Ok(())
    }

    #[test]
    fn hex_with_whitespace() -> eyre::Result<()> {
        let text = "01 00 a1 cc\n00 00 2e 38\td4 89 80 3e\r\n";

        assert_eq!(input(true, false).read(text.as_bytes())?, RECORD);
        Ok(())
    }

    #[test]
    fn base64_input() -> eyre::Result<()> {
        let text = base64::engine::general_purpose::STANDARD.encode(RECORD);

        assert_eq!(input(false, true).read(format!("{text}\n").as_bytes())?, RECORD);
        Ok(())
    }

    #[test]
    fn bad_hex() {
        assert!(input(true, false).read("0x01".as_bytes()).is_err());
    }
}
