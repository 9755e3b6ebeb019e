//! Command-line front end: `mid2seq <input.mid> <output.seq>`.

use mid2seq::Seq;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("usage: {0} <input.mid> <output.seq>")]
    Usage(String),

    #[error("error opening midi file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error converting {}: {source}", .path.display())]
    Transcode {
        path: PathBuf,
        #[source]
        source: mid2seq::Error,
    },

    #[error("error writing seq file {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn convert(input: &Path, output: &Path) -> Result<(), CliError> {
    let midi = fs::read(input).map_err(|source| CliError::OpenInput {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(path = %input.display(), bytes = midi.len(), "read midi file");

    let seq = Seq::from_smf(&midi).map_err(|source| CliError::Transcode {
        path: input.to_path_buf(),
        source,
    })?;
    info!(
        events = seq.events.iter().filter(|ev| !ev.is_suppressed()).count(),
        tempo_map = seq.tempo_map.is_some(),
        bytes = seq.encoded_len(),
        "transcoded"
    );

    //Only touch the output once the whole song transcoded successfully
    seq.save(output).map_err(|source| CliError::WriteOutput {
        path: output.to_path_buf(),
        source,
    })
}

fn run() -> Result<(), CliError> {
    let args = env::args_os().collect::<Vec<_>>();
    if args.len() != 3 {
        let program = args
            .first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mid2seq".to_string());
        return Err(CliError::Usage(program));
    }
    convert(args[1].as_ref(), args[2].as_ref())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => {
            println!("Conversion complete.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(1)
        }
    }
}
