use std::cell::Cell;
use std::path::PathBuf;

use apkres_arsc::{StringEnd, TraceEvent};
use clap::Args;
use miette::{IntoDiagnostic, Result};
use tracing::warn;

use super::{load, Format};

#[derive(Args)]
pub struct StringsArgs {
    /// An input resource table
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail on unpaired UTF-16 surrogates instead of replacing them
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl StringsArgs {
    pub fn handle(&self) -> Result<()> {
        let unterminated = Cell::new(0usize);
        let trace: &dyn Fn(&TraceEvent) = &|event| {
            if let TraceEvent::String {
                end: StringEnd::Boundary,
                ..
            } = event
            {
                unterminated.set(unterminated.get() + 1);
            }
        };

        let table = load(&self.file, self.strict, Some(trace))?;
        if unterminated.get() > 0 {
            warn!(
                "{} strings ran into the end of the pool and may be incomplete",
                unterminated.get()
            );
        }

        let pool = table.string_pool();
        match self.format {
            Format::Text => {
                for (i, string) in pool.iter().enumerate() {
                    println!("{i}: {string}");
                }
            }
            Format::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(pool.strings()).into_diagnostic()?
                );
            }
        }

        Ok(())
    }
}
