//! Request precondition checks, run before any job exists.

use crate::error::ValidationError;
use crate::job::EncodeRequest;

/// Bounds of the resolution-scale control.
pub const MIN_SCALE_PERCENT: u32 = 25;
pub const MAX_SCALE_PERCENT: u32 = 100;

/// Validates user input synchronously, before any process is spawned.
///
/// A request that passes here can still fail later (unreadable media,
/// infeasible target size); those failures surface through the job's
/// terminal event instead.
pub fn validate_request(request: &EncodeRequest) -> Result<(), ValidationError> {
    if !request.input_path.exists() {
        return Err(ValidationError::InputNotFound {
            path: request.input_path.clone(),
        });
    }
    if !request.input_path.is_file() {
        return Err(ValidationError::InputNotAFile {
            path: request.input_path.clone(),
        });
    }

    if !request.target_size_mb.is_finite() || request.target_size_mb <= 0.0 {
        return Err(ValidationError::InvalidTargetSize {
            value: request.target_size_mb,
        });
    }

    if !(MIN_SCALE_PERCENT..=MAX_SCALE_PERCENT).contains(&request.scale_percent) {
        return Err(ValidationError::ScaleOutOfRange {
            value: request.scale_percent,
            min: MIN_SCALE_PERCENT,
            max: MAX_SCALE_PERCENT,
        });
    }

    if request.target_fps == 0 {
        return Err(ValidationError::InvalidFrameRate);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_request(input_path: PathBuf) -> EncodeRequest {
        EncodeRequest {
            input_path,
            target_size_mb: 10.0,
            scale_percent: 100,
            target_fps: 24,
        }
    }

    fn existing_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        std::fs::write(&path, b"x").unwrap();
        (dir, path)
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let (_dir, path) = existing_file();
        assert!(validate_request(&valid_request(path)).is_ok());
    }

    #[test]
    fn rejects_missing_input() {
        let request = valid_request(PathBuf::from("/no/such/video.mp4"));
        assert!(matches!(
            validate_request(&request),
            Err(ValidationError::InputNotFound { .. })
        ));
    }

    #[test]
    fn rejects_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let request = valid_request(dir.path().to_path_buf());
        assert!(matches!(
            validate_request(&request),
            Err(ValidationError::InputNotAFile { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_sizes() {
        let (_dir, path) = existing_file();
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut request = valid_request(path.clone());
            request.target_size_mb = bad;
            assert!(matches!(
                validate_request(&request),
                Err(ValidationError::InvalidTargetSize { .. })
            ));
        }
    }

    #[test]
    fn rejects_scale_outside_slider_range() {
        let (_dir, path) = existing_file();
        for bad in [0, 24, 101] {
            let mut request = valid_request(path.clone());
            request.scale_percent = bad;
            assert!(matches!(
                validate_request(&request),
                Err(ValidationError::ScaleOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_zero_fps() {
        let (_dir, path) = existing_file();
        let mut request = valid_request(path);
        request.target_fps = 0;
        assert!(matches!(
            validate_request(&request),
            Err(ValidationError::InvalidFrameRate)
        ));
    }
}
