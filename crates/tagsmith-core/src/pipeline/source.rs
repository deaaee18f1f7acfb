//! Where an input image comes from: a local path or an http(s) URL.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single input to the tagger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Classify a command-line or list-file entry.
    ///
    /// Anything starting with `http://` or `https://` is a URL, everything else
    /// is treated as a path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if is_url(input) {
            ImageSource::Url(input.to_string())
        } else {
            ImageSource::File(PathBuf::from(input))
        }
    }

    /// Parse a list of inputs, one per line. Blank lines and `#` comments are skipped.
    pub fn parse_list(content: &str) -> Vec<Self> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Self::parse)
            .collect()
    }

    /// Read and parse a list file.
    pub fn read_list(path: &Path) -> std::io::Result<Vec<Self>> {
        Ok(Self::parse_list(&std::fs::read_to_string(path)?))
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ImageSource::Url(_))
    }

    /// The full input as given (path or URL).
    pub fn input(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Url(url) => url.clone(),
        }
    }

    /// Short name: the file name for paths, the last URL path segment for URLs.
    pub fn file_name(&self) -> String {
        match self {
            ImageSource::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
            ImageSource::Url(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url.as_str());
                let rest = without_query
                    .split_once("://")
                    .map_or(without_query, |(_, rest)| rest);
                rest.split_once('/')
                    .and_then(|(_, path)| path.rsplit('/').find(|s| !s.is_empty()))
                    .unwrap_or("unknown")
                    .to_string()
            }
        }
    }

    /// File stem used for caption sidecars.
    pub fn stem(&self) -> String {
        let name = self.file_name();
        match Path::new(&name).file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => name,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::File(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => f.write_str(url),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::File(path)
    }
}

/// Whether a string is an http(s) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
