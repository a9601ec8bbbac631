use clap::Args;
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use std::{collections::HashSet, fmt::Display, path::PathBuf};

use apkres_arsc::{ResourceTable, StringPool};

use super::load;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Change {
    Comparison(String, String, String),
    Added(String),
    Removed(String),
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(v) => {
                writeln!(f, "✅ {}", v.green())
            }
            Change::Removed(v) => {
                writeln!(f, "❌ {}", v.red())
            }
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
        }
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input resource table
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input resource table
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,
}

impl DiffArgs {
    fn handle_header(&self, left: &ResourceTable, right: &ResourceTable) -> Vec<Change> {
        let mut result = Vec::new();

        if left.package_count() != right.package_count() {
            result.push(Change::Comparison(
                "packages".into(),
                left.package_count().to_string(),
                right.package_count().to_string(),
            ));
        }

        let (left_pool, right_pool) = (left.string_pool(), right.string_pool());
        if left_pool.is_utf8() != right_pool.is_utf8() {
            result.push(Change::Comparison(
                "encoding".into(),
                encoding(left_pool).into(),
                encoding(right_pool).into(),
            ));
        }

        if left_pool.len() != right_pool.len() {
            result.push(Change::Comparison(
                "strings".into(),
                left_pool.len().to_string(),
                right_pool.len().to_string(),
            ));
        }

        result
    }

    fn handle_strings(&self, left: &StringPool, right: &StringPool) -> Vec<Change> {
        let left_strings = left.iter().collect::<HashSet<_>>();
        let right_strings = right.iter().collect::<HashSet<_>>();

        let added = right_strings
            .difference(&left_strings)
            .map(|s| Change::Added(s.to_string()));

        let removed = left_strings
            .difference(&right_strings)
            .map(|s| Change::Removed(s.to_string()));

        added.chain(removed).sorted().collect()
    }

    pub fn handle(&self) -> Result<()> {
        let left = load(&self.left, false, None)?;
        let right = load(&self.right, false, None)?;

        let mut changes = self.handle_header(&left, &right);
        changes.extend(self.handle_strings(left.string_pool(), right.string_pool()));

        if changes.is_empty() {
            println!("string pools are identical");
            return Ok(());
        }

        println!(
            "🔃 {} vs {}",
            self.left.display().blue(),
            self.right.display().blue()
        );
        print!("{}", changes.iter().join(""));

        Ok(())
    }
}

fn encoding(pool: &StringPool) -> &'static str {
    if pool.is_utf8() {
        "UTF-8"
    } else {
        "UTF-16"
    }
}
