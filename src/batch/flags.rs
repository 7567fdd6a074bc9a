//! Chain-level feature toggles consulted during finalization

/// Source of consensus parameters that move the commitment slot
pub trait FeatureFlags: Send + Sync {
    /// Number of slots in front of the commitment at `height` (0 or 1)
    fn commit_slot_offset(&self, height: u64) -> usize;
}

/// Vote extensions switched on from a configured height
///
/// Once enabled, the vote-extension transaction takes slot 0 and pushes the
/// commitment to slot 1. An enable height of 0 means never enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteExtensionSchedule {
    pub enable_height: u64,
}

impl VoteExtensionSchedule {
    pub fn new(enable_height: u64) -> Self {
        Self { enable_height }
    }
}

impl FeatureFlags for VoteExtensionSchedule {
    fn commit_slot_offset(&self, height: u64) -> usize {
        if self.enable_height != 0 && height > self.enable_height {
            1
        } else {
            0
        }
    }
}

/// Chains without vote extensions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVoteExtensions;

impl FeatureFlags for NoVoteExtensions {
    fn commit_slot_offset(&self, _height: u64) -> usize {
        0
    }
}
