use std::collections::HashMap;

use crate::{AssetId, SampleBuffer};

/// Why a clip's source could not be used for mixing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("no decoded audio for asset '{0}'")]
    Missing(AssetId),

    #[error("failed to decode asset '{asset}': {reason}")]
    Decode { asset: AssetId, reason: String },

    #[error("asset '{0}' decoded to an empty buffer")]
    Empty(AssetId),
}

/// Resolves asset ids to decoded audio.
///
/// Implementations hand out shared buffers; callers treat them as read-only.
pub trait SourceProvider {
    fn source(&self, asset: &AssetId) -> Result<SampleBuffer, SourceError>;
}

impl SourceProvider for HashMap<AssetId, SampleBuffer> {
    fn source(&self, asset: &AssetId) -> Result<SampleBuffer, SourceError> {
        self.get(asset)
            .cloned()
            .ok_or_else(|| SourceError::Missing(asset.clone()))
    }
}

impl<P: SourceProvider + ?Sized> SourceProvider for &P {
    fn source(&self, asset: &AssetId) -> Result<SampleBuffer, SourceError> {
        (**self).source(asset)
    }
}
