use std::str::FromStr;

use crate::input::Input;

#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
#[structopt(about = "inspect and migrate versioned device configuration records")]
pub struct Options {
    #[structopt(
        long,
        default_value = "config-pof",
        possible_values = &RecordKind::VARIANTS,
        help = "record definition to interpret input as"
    )]
    pub kind: RecordKind,

    #[structopt(long, help = "multi-line log output")]
    pub pretty: bool,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, structopt::StructOpt)]
pub enum Command {
    #[structopt(about = "decode one record from stdin and print its fields")]
    Decode {
        #[structopt(flatten)]
        input: Input,

        #[structopt(long, help = "print the decoded fields as json")]
        json: bool,
    },

    #[structopt(about = "decode one record from stdin and re-encode it under another version")]
    Migrate {
        #[structopt(flatten)]
        input: Input,

        #[structopt(long, help = "structure version to encode with")]
        to: u8,
    },

    #[structopt(about = "print the wire layout of a structure version")]
    Layout {
        #[structopt(required = true)]
        version: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    ConfigPof,
}

impl RecordKind {
    pub const VARIANTS: [&'static str; 1] = ["config-pof"];
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config-pof" => Ok(RecordKind::ConfigPof),
            other => Err(format!("unknown record kind: {other}")),
        }
    }
}
