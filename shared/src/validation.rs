//! Per-batch size quota for newly picked images.
//!
//! Only the incoming batch is measured. Images already in the selection do
//! not count towards the quota, so the total selection size is unbounded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::PickedAsset;

pub const BATCH_TOO_LARGE_MESSAGE: &str = "Total image size can not exceed 5MB";

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("batch of {total_bytes} bytes exceeds quota of {limit_bytes} bytes")]
pub struct BatchTooLarge {
    pub total_bytes: u64,
    pub limit_bytes: u64,
}

/// Sum of the reported sizes. Assets without a size contribute nothing.
#[must_use]
pub fn batch_size_bytes(assets: &[PickedAsset]) -> u64 {
    assets
        .iter()
        .filter_map(|asset| asset.file_size)
        .fold(0u64, u64::saturating_add)
}

/// Rejects the batch when its aggregate size is strictly above `limit_bytes`.
pub fn validate_batch(assets: &[PickedAsset], limit_bytes: u64) -> Result<u64, BatchTooLarge> {
    let total_bytes = batch_size_bytes(assets);
    if total_bytes > limit_bytes {
        return Err(BatchTooLarge {
            total_bytes,
            limit_bytes,
        });
    }
    Ok(total_bytes)
}
