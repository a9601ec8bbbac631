use std::path::PathBuf;

use clap::Args;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;

use super::{load, Format};

#[derive(Args)]
pub struct InfoArgs {
    /// An input resource table
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let table = load(&self.file, false, None)?;

        if self.format == Format::Json {
            println!("{}", serde_json::to_string_pretty(&table).into_diagnostic()?);
            return Ok(());
        }

        let header = table.header();
        println!(
            "{} {} (header {} bytes, total {} bytes)",
            "table:".bold(),
            header.chunk_type,
            header.header_size,
            header.total_size
        );

        let pool = table.string_pool();
        println!(
            "{} {} strings, {} styles, {}{}",
            "string pool:".bold(),
            pool.len(),
            pool.style_count(),
            if pool.is_utf8() { "UTF-8" } else { "UTF-16" },
            if pool.is_sorted() { ", sorted" } else { "" }
        );

        println!(
            "{} {} declared, {} found",
            "packages:".bold(),
            table.package_count(),
            table.packages().len()
        );
        for package in table.packages() {
            println!(
                "  * {} at {:#x}, {} bytes",
                package.header.chunk_type,
                package.offset,
                package.header.total_size
            );
        }

        Ok(())
    }
}
