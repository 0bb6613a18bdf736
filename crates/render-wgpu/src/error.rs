use planefield_assets::MeshError;

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No usable adapter or device. The renderer stays uninitialized.
    #[error("GPU unavailable: {0}")]
    UnsupportedPlatform(String),
    /// Buffer, texture or pipeline creation failed; the object is unusable.
    #[error("GPU resource creation failed: {0}")]
    ResourceCreation(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The frame could not acquire a surface texture and was skipped.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl From<MeshError> for RenderError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidParameter(msg) => Self::InvalidParameter(msg),
        }
    }
}

impl RenderError {
    /// The device or its memory is gone; rendering cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Surface(wgpu::SurfaceError::OutOfMemory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_out_of_memory_is_fatal() {
        use wgpu::SurfaceError::*;
        assert!(RenderError::from(OutOfMemory).is_fatal());
        for err in [Lost, Outdated, Timeout, Other] {
            assert!(!RenderError::from(err.clone()).is_fatal(), "{err:?}");
        }
    }

    #[test]
    fn non_surface_errors_are_not_fatal() {
        assert!(!RenderError::UnsupportedPlatform("no adapter".into()).is_fatal());
        assert!(!RenderError::ResourceCreation("bad texture".into()).is_fatal());
        assert!(!RenderError::InvalidParameter("zero segments".into()).is_fatal());
    }

    #[test]
    fn mesh_error_becomes_invalid_parameter() {
        let err = RenderError::from(MeshError::InvalidParameter("0x1 segments".into()));
        assert!(matches!(&err, RenderError::InvalidParameter(msg) if msg == "0x1 segments"));
        assert_eq!(err.to_string(), "invalid parameter: 0x1 segments");
    }
}
