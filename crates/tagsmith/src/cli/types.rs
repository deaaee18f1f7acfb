//! CLI enum types shared by the tagging commands.

use clap::ValueEnum;
use tagsmith_core::OutputFormat as CoreOutputFormat;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
    /// `filename,tags` / `url,tags` rows
    Csv,
}

impl OutputFormat {
    /// Resolve the format: command line first, then the `[output]` config value.
    pub fn resolve(cli: Option<Self>, configured: &str) -> CoreOutputFormat {
        match cli {
            Some(format) => format.into(),
            None => CoreOutputFormat::parse(configured).unwrap_or_else(|| {
                tracing::warn!("Unknown output format {configured:?} in config, using json");
                CoreOutputFormat::Json
            }),
        }
    }
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
            OutputFormat::Csv => CoreOutputFormat::Csv,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
