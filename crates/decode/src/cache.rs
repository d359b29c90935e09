use std::collections::HashMap;
use std::path::Path;

use podmix_transport::{AssetId, SampleBuffer, SourceError, SourceProvider};

use crate::decode_file;

/// Outcome of loading one asset.
#[derive(Debug, Clone)]
pub enum CachedAsset {
    Ready(SampleBuffer),
    Failed(String),
}

/// Decoded audio keyed by asset id.
///
/// Each asset is decoded at most once. Failures are remembered alongside the
/// successes so that a mix can report which clips were skipped and why.
#[derive(Debug, Default)]
pub struct AudioCache {
    entries: HashMap<AssetId, CachedAsset>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` under `asset` unless it is already decoded.
    ///
    /// Decode errors are recorded and returned. A recorded failure does not
    /// stick: the next `load` of the same asset decodes the file again.
    pub fn load(&mut self, asset: AssetId, path: &Path) -> Result<SampleBuffer, SourceError> {
        match self.entries.get(&asset) {
            Some(entry @ CachedAsset::Ready(_)) => return entry_to_result(&asset, entry),
            Some(CachedAsset::Failed(_)) => {
                log::debug!("retrying decode of {} ({})", asset, path.display());
            }
            None => {}
        }

        let entry = match decode_file(path) {
            Ok(buffer) => CachedAsset::Ready(buffer),
            Err(e) => {
                log::warn!("could not decode {} ({}): {:#}", asset, path.display(), e);
                CachedAsset::Failed(format!("{e:#}"))
            }
        };
        let result = entry_to_result(&asset, &entry);
        self.entries.insert(asset, entry);
        result
    }

    /// Register an already decoded buffer.
    pub fn insert(&mut self, asset: AssetId, buffer: SampleBuffer) {
        self.entries.insert(asset, CachedAsset::Ready(buffer));
    }

    /// Record that an asset could not be decoded by an external collaborator.
    pub fn insert_failure(&mut self, asset: AssetId, reason: impl Into<String>) {
        self.entries.insert(asset, CachedAsset::Failed(reason.into()));
    }

    pub fn remove(&mut self, asset: &AssetId) -> Option<CachedAsset> {
        self.entries.remove(asset)
    }

    pub fn get(&self, asset: &AssetId) -> Option<&SampleBuffer> {
        match self.entries.get(asset) {
            Some(CachedAsset::Ready(buffer)) => Some(buffer),
            _ => None,
        }
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.entries.contains_key(asset)
    }

    /// Assets that failed to decode, with their error messages.
    pub fn failures(&self) -> impl Iterator<Item = (&AssetId, &str)> {
        self.entries.iter().filter_map(|(asset, entry)| match entry {
            CachedAsset::Failed(reason) => Some((asset, reason.as_str())),
            CachedAsset::Ready(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_to_result(asset: &AssetId, entry: &CachedAsset) -> Result<SampleBuffer, SourceError> {
    match entry {
        CachedAsset::Ready(buffer) if buffer.is_empty() => Err(SourceError::Empty(asset.clone())),
        CachedAsset::Ready(buffer) => Ok(buffer.clone()),
        CachedAsset::Failed(reason) => Err(SourceError::Decode {
            asset: asset.clone(),
            reason: reason.clone(),
        }),
    }
}

impl SourceProvider for AudioCache {
    fn source(&self, asset: &AssetId) -> Result<SampleBuffer, SourceError> {
        match self.entries.get(asset) {
            Some(entry) => entry_to_result(asset, entry),
            None => Err(SourceError::Missing(asset.clone())),
        }
    }
}
