use std::io;

use structopt::StructOpt;
use tap::Pipe;

use sensorcfg::{
    build,
    record::{
        checksum,
        devices::ConfigPof,
        Definition,
        Record,
        StandardCRC,
    },
};

mod input;
mod options;

pub use options::{
    Command,
    Options,
    RecordKind,
};

fn main() -> eyre::Result<()> {
    let options: Options = Options::from_args();

    sensorcfg::trace::init(options.pretty);

    tracing::debug!(
        application = build::PACKAGE,
        version = build::VERSION,
        build_commit = build::COMMIT_HASH,
        built_at = build::BUILD_TIMESTAMP,
        kind = ?options.kind,
        "tracing subsystem initialized"
    );

    let result = match options.kind {
        RecordKind::ConfigPof => run::<ConfigPof>(&options.command),
    };

    util::trace_catch!(result, kind = ?options.kind, "command failed");

    result
}

fn run<D>(command: &Command) -> eyre::Result<()>
where
    D: Definition + Default,
{
    match command {
        Command::Decode {
            input,
            json,
        } => {
            let record = input.read(io::stdin().lock())?.pipe(|buf| decode::<D>(&buf))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&record.snapshot()?)?);
            } else {
                println!("{record}");
            }
        },

        Command::Migrate {
            input,
            to,
        } => {
            let mut record = input.read(io::stdin().lock())?.pipe(|buf| decode::<D>(&buf))?;
            let from = record.version();

            record.set_version(*to);
            let encoded = record.encode()?;

            tracing::info!(from, to, len = encoded.len(), "migrated record");
            println!("{}", hex::encode(encoded));
        },

        Command::Layout {
            version,
        } => {
            let record = Record::<D>::new();
            let layout = Record::<D>::layout(*version)?;
            let entries = layout.entries(record.definition().fields());

            println!("{} v{} ({} bytes)", D::NAME, version, record.size_for_version(*version)?);

            for (offset, field) in &entries {
                println!("{offset:>4} {:>3}  {}", field.size_bytes(), field.name());
            }

            println!(
                "{:>4} {:>3}  <checksum>",
                layout.payload_size(record.definition().fields()),
                checksum::size::<StandardCRC>()
            );
        },
    }

    Ok(())
}

fn decode<D>(buf: &[u8]) -> eyre::Result<Record<D>>
where
    D: Definition + Default,
{
    let mut record = Record::<D>::new();
    record.decode(buf)?;

    Ok(record)
}
