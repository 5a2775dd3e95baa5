//! Remote Tier Adapter
//!
//! Placeholder client for a network-backed persistent tier. It mirrors
//! the durable tier's contract so a peer cache can be swapped into the
//! durable slot via [`PersistentTier`], but no wire protocol is spoken
//! yet: every probe is a miss and every write a no-op, matching the
//! degraded behavior of an unreachable peer.

use tracing::trace;

use crate::cache::{CacheEntry, PersistentTier, PersistentUsage};

// == Remote Tier Adapter ==
/// Stub client for a remote cache peer.
// TODO: replace the no-op bodies with a real wire client once the peer
// protocol is settled.
#[derive(Debug)]
pub struct RemoteTierAdapter {
    endpoint: String,
}

impl RemoteTierAdapter {
    /// Creates an adapter pointed at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured peer endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PersistentTier for RemoteTierAdapter {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        trace!("remote tier probe for '{}' against {}", key, self.endpoint);
        None
    }

    fn set(&self, key: &str, _entry: &CacheEntry) {
        trace!("remote tier write for '{}' against {}", key, self.endpoint);
    }

    fn invalidate(&self, _pattern: Option<&str>, _tags: Option<&[String]>) -> u64 {
        0
    }

    fn clear(&self) {}

    fn cleanup_expired(&self) -> u64 {
        0
    }

    fn usage(&self) -> PersistentUsage {
        PersistentUsage::default()
    }
}
