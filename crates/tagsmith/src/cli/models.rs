//! The `tagsmith models` command for locating and checking the tagger model.

use clap::{Args, Subcommand};
use tagsmith_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Show where the model and tag catalog are expected
    Path,

    /// Load the model and catalog and verify they agree on the tag count
    Check,
}

/// Execute the models command.
pub fn execute(args: ModelsArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Path => {
            println!("Model directory: {}", config.model_dir().display());
            println!("  Model:         {}", status_line(&config.model_path()));
            println!("  Tag catalog:   {}", status_line(&config.catalog_path()));
        }

        ModelsCommand::Check => {
            let processor = super::load_processor(&config)?;
            let tags = processor.catalog().len();
            println!("Tag catalog: {tags} tags");
            println!("Model:       {tags} outputs, matches catalog");
        }
    }

    Ok(())
}

fn status_line(path: &std::path::Path) -> String {
    let status = if path.exists() {
        "ready"
    } else {
        "not installed"
    };
    format!("{:50} {}", path.display(), status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("tags.json");
        std::fs::write(&present, "{}").unwrap();

        assert!(status_line(&present).ends_with("ready"));
        assert!(status_line(&dir.path().join("model.onnx")).ends_with("not installed"));
    }

    #[test]
    fn test_check_fails_without_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.model_dir = dir.path().to_path_buf();

        let args = ModelsArgs {
            command: ModelsCommand::Check,
        };
        let err = execute(args, config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Tag catalog"));
        assert!(message.contains("tagsmith models path"));
    }
}
