//! Tag catalog loading.
//!
//! The catalog is a JSON object keyed by tag identifier. Only the keys and their
//! order matter: key position `i` is the tag for score `i` of the model output.
//! Values (tag metadata) are ignored.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::ConfigError;

/// A single catalog tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTag {
    /// Raw identifier (may contain underscores)
    pub name: String,
    /// Display name (underscores replaced with spaces)
    pub display_name: String,
}

impl CatalogTag {
    fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let display_name = name.replace('_', " ");
        Self { name, display_name }
    }
}

/// Read-only, ordered tag catalog. Shared across requests once loaded.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tags: Vec<CatalogTag>,
}

impl TagCatalog {
    /// Load the catalog from a JSON file.
    ///
    /// Fails if the file is unreadable, not a JSON object, or empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Catalog {
            path: path.to_path_buf(),
            message: format!("Failed to read: {e}"),
        })?;
        let catalog = Self::from_json_str(&content).map_err(|message| ConfigError::Catalog {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::info!("Loaded tag catalog: {} tags from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a catalog from JSON text, keeping key order.
    fn from_json_str(content: &str) -> Result<Self, String> {
        let entries: IndexMap<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| format!("Not a JSON object of tags: {e}"))?;
        Self::from_names(entries.into_keys()).map_err(|e| e.to_string())
    }

    /// Build a catalog from tag identifiers in ordinal order.
    ///
    /// Display names key the score map of a report, so two identifiers that
    /// collapse to the same display name (`a_b` and `a b`) are rejected.
    pub fn from_names<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<CatalogTag> = names.into_iter().map(CatalogTag::new).collect();
        if tags.is_empty() {
            return Err(ConfigError::ValidationError(
                "tag catalog is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(tags.len());
        if let Some(dup) = tags.iter().find(|t| !seen.insert(t.display_name.as_str())) {
            return Err(ConfigError::ValidationError(format!(
                "tag catalog has more than one tag displayed as {:?}",
                dup.display_name
            )));
        }

        Ok(Self { tags })
    }

    /// Check that the catalog covers exactly the model's output ordinals.
    pub fn ensure_width(&self, model_width: usize) -> Result<(), ConfigError> {
        if self.tags.len() != model_width {
            return Err(ConfigError::CatalogMismatch {
                catalog: self.tags.len(),
                model: model_width,
            });
        }
        Ok(())
    }

    /// Get all tags in ordinal order.
    pub fn all_tags(&self) -> &[CatalogTag] {
        &self.tags
    }

    /// Tag at the given ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&CatalogTag> {
        self.tags.get(ordinal)
    }

    /// Display name at the given ordinal.
    pub fn display_name(&self, ordinal: usize) -> Option<&str> {
        self.tags.get(ordinal).map(|t| t.display_name.as_str())
    }

    /// Number of tags in the catalog.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_replace_every_underscore() {
        let catalog = TagCatalog::from_names(["tag_a", "long_tag_name", "plain"]).unwrap();
        assert_eq!(catalog.display_name(0), Some("tag a"));
        assert_eq!(catalog.display_name(1), Some("long tag name"));
        assert_eq!(catalog.display_name(2), Some("plain"));
        assert_eq!(catalog.display_name(3), None);
    }

    #[test]
    fn test_json_keeps_insertion_order() {
        let catalog =
            TagCatalog::from_json_str(r#"{"zebra": 1, "apple_pie": {"n": 2}, "mango": null}"#)
                .unwrap();
        let names: Vec<&str> = catalog.all_tags().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "apple_pie", "mango"]);
        assert_eq!(catalog.display_name(1), Some("apple pie"));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(TagCatalog::from_json_str("{}").is_err());
        assert!(TagCatalog::from_names(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_colliding_display_names_are_rejected() {
        let err = TagCatalog::from_names(["a_b", "c", "a b"]).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("\"a b\""));
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let err = TagCatalog::from_json_str(r#"["a", "b"]"#).unwrap_err();
        assert!(err.contains("JSON object"));
    }

    #[test]
    fn test_ensure_width() {
        let catalog = TagCatalog::from_names(["a", "b", "c"]).unwrap();
        assert!(catalog.ensure_width(3).is_ok());
        let err = catalog.ensure_width(9083).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CatalogMismatch {
                catalog: 3,
                model: 9083
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        std::fs::write(&path, r#"{"tag_a": 0, "tag_b": 0, "tag_c": 0}"#).unwrap();

        let catalog = TagCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(2).unwrap().display_name, "tag c");
    }

    #[test]
    fn test_load_missing_file_is_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TagCatalog::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Catalog { .. }));
    }
}
