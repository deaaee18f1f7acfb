//! Input validation before decoding.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Cheap checks that reject inputs before the decoder sees them.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check a local file exists and is within the size limit, without reading it.
    pub fn check_file(&self, path: &Path) -> PipelineResult<()> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            input: path.display().to_string(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        self.check_size(&path.display().to_string(), metadata.len())
    }

    /// Check an in-memory input: size limit, then image magic bytes.
    pub fn check_bytes(&self, input: &str, bytes: &[u8]) -> PipelineResult<()> {
        self.check_size(input, bytes.len() as u64)?;

        if bytes.len() < 4 {
            return Err(PipelineError::Decode {
                input: input.to_string(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !is_valid_image_header(bytes) {
            return Err(PipelineError::Decode {
                input: input.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    fn check_size(&self, input: &str, len: u64) -> PipelineResult<()> {
        let max_bytes = self.limits.max_file_size_mb * BYTES_PER_MB;
        if len > max_bytes {
            return Err(PipelineError::FileTooLarge {
                input: input.to_string(),
                size_mb: len / BYTES_PER_MB,
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }
}

/// Check if the leading bytes match a known image format.
fn is_valid_image_header(header: &[u8]) -> bool {
    match header {
        // JPEG
        [0xFF, 0xD8, 0xFF, ..] => true,
        // PNG
        [0x89, b'P', b'N', b'G', ..] => true,
        // GIF
        [b'G', b'I', b'F', b'8', ..] => true,
        // WebP: RIFF....WEBP
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => true,
        // BMP
        [b'B', b'M', ..] => true,
        // TIFF, little- and big-endian
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => true,
        // AVIF/HEIF: ftyp box at offset 4
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_known_formats() {
        assert!(is_valid_image_header(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]));
        assert!(is_valid_image_header(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]));
        assert!(is_valid_image_header(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(is_valid_image_header(b"BM\0\0\0\0"));
        assert!(is_valid_image_header(&[b'I', b'I', 0x2A, 0x00]));
        assert!(is_valid_image_header(&[b'M', b'M', 0x00, 0x2A]));
    }

    #[test]
    fn test_magic_bytes_rejected() {
        assert!(!is_valid_image_header(&[0; 12]));
        assert!(!is_valid_image_header(b"RIFF\0\0\0\0WAVE"));
        assert!(!is_valid_image_header(&[b'I', b'I', 0x00, 0x00]));
        assert!(!is_valid_image_header(b"<html>"));
    }

    #[test]
    fn test_check_bytes_too_small() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.check_bytes("tiny.png", &[0x89]).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_check_file_missing() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator
            .check_file(Path::new("/no/such/image.png"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_check_file_too_large() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();

        let err = Validator::new(limits).check_file(&path).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FileTooLarge {
                size_mb: 2,
                max_mb: 1,
                ..
            }
        ));
    }
}
