pub mod diff;
pub mod info;
pub mod strings;

use std::path::Path;

use apkres_arsc::{
    DecodeOptions, ResourceTable, ResourceTableDecoder, SurrogatePolicy, TraceEvent,
};
use clap::ValueEnum;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

#[derive(clap::Subcommand)]
pub enum ArscCommands {
    /// Compare the string pools of two resource tables
    Diff(diff::DiffArgs),
    /// Show the structure of a resource table
    Info(info::InfoArgs),
    /// Print the global strings of a resource table
    Strings(strings::StringsArgs),
}

impl ArscCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            ArscCommands::Diff(diff) => diff.handle(),
            ArscCommands::Info(info) => info.handle(),
            ArscCommands::Strings(strings) => strings.handle(),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum Format {
    #[default]
    Text,
    Json,
}

/// Read a resource table from disk and decode it.
pub(crate) fn load(
    path: &Path,
    strict: bool,
    trace: Option<&dyn Fn(&TraceEvent)>,
) -> Result<ResourceTable> {
    info!("reading {}", path.display());

    let buffer = std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    let surrogates = if strict {
        SurrogatePolicy::Strict
    } else {
        SurrogatePolicy::Replace
    };
    let options = DecodeOptions::builder().surrogates(surrogates).build();
    let mut decoder = ResourceTableDecoder::new(options);
    if let Some(trace) = trace {
        decoder = decoder.with_trace(trace);
    }

    decoder
        .decode(&buffer)
        .context(format!("decoding {}", path.display()))
}
