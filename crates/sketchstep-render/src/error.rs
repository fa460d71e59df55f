//! Errors raised while rendering or saving a step image.

use std::path::PathBuf;

/// Errors that can occur while rendering a step.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The canvas pixel buffer could not be created.
    #[error("cannot allocate a {width}x{height} canvas")]
    CanvasAllocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The output directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The image could not be encoded or written.
    #[error("cannot write image {}: {source}", path.display())]
    Encode {
        /// File that failed.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_error_names_size() {
        let err = RenderError::CanvasAllocation {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "cannot allocate a 0x10 canvas");
    }

    #[test]
    fn create_dir_error_names_path() {
        let err = RenderError::CreateDir {
            path: PathBuf::from("/no/such"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("cannot create directory /no/such"));
    }
}
