use std::path::PathBuf;

use clap::{Parser, Subcommand};
use veil_core::IndicatorKind;

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Log sanitization and threat-intelligence lookups for SOC workflows", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mask sensitive data in log text (stdin when no file is given)
    Redact {
        /// Read the log text from this file instead of stdin
        file: Option<PathBuf>,

        /// Mask private IPs and system accounts too
        #[arg(long)]
        no_preserve_context: bool,

        /// Substring to always leave untouched (repeatable)
        #[arg(long)]
        whitelist: Vec<String>,

        /// Substring to always mask, case-insensitive (repeatable)
        #[arg(long)]
        blacklist: Vec<String>,
    },

    /// Check indicators against the configured reputation sources
    Verify {
        /// Indicator kind: ip, url or hash
        #[arg(value_enum)]
        kind: KindArg,

        /// Indicators to check
        items: Vec<String>,

        /// Read indicators from this file, one per line
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    Ip,
    Url,
    Hash,
}

impl From<KindArg> for IndicatorKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ip => IndicatorKind::Ip,
            KindArg::Url => IndicatorKind::Url,
            KindArg::Hash => IndicatorKind::Hash,
        }
    }
}
