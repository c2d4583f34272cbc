pub type FragmentaResult<T> = Result<T, FragmentaError>;

#[derive(thiserror::Error, Debug)]
pub enum FragmentaError {
    #[error("invalid fragment set: {0}")]
    InvalidFragmentSet(String),

    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FragmentaError {
    pub fn invalid_fragment_set(msg: impl Into<String>) -> Self {
        Self::InvalidFragmentSet(msg.into())
    }

    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FragmentaError::invalid_fragment_set("x")
                .to_string()
                .contains("invalid fragment set:")
        );
        assert!(
            FragmentaError::surface_unavailable("x")
                .to_string()
                .contains("surface unavailable:")
        );
        assert!(
            FragmentaError::manifest("x")
                .to_string()
                .contains("manifest error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FragmentaError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
