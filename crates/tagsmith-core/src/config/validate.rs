//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

fn in_unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.preprocess.height == 0 || self.preprocess.width == 0 {
            return Err(ConfigError::ValidationError(
                "preprocess.height and preprocess.width must be > 0".into(),
            ));
        }
        if self.preprocess.std.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ConfigError::ValidationError(
                "preprocess.std values must be finite and non-zero".into(),
            ));
        }
        if !self.preprocess.background.rgb().into_iter().all(in_unit_range) {
            return Err(ConfigError::ValidationError(
                "preprocess.background must be between 0.0 and 1.0".into(),
            ));
        }
        if self.tagging.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "tagging.top_k must be > 0".into(),
            ));
        }
        if !in_unit_range(self.tagging.threshold) {
            return Err(ConfigError::ValidationError(
                "tagging.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.batch.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "batch.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0
            || self.limits.infer_timeout_ms == 0
            || self.limits.fetch_timeout_ms == 0
        {
            return Err(ConfigError::ValidationError(
                "limits.*_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
