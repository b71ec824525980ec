// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Exactly-once gate for terminal tool events.
//!
//! The same completed call is routinely delivered more than once (re-renders,
//! reconnects).  A [`Fingerprint`] identifies one logical completion by tool
//! name, serialized args and a digest of the result; the [`Deduplicator`]
//! remembers fingerprints in a bounded LRU for the lifetime of a session.

use std::num::NonZeroUsize;

use delve_config::{FingerprintMode, SessionConfig};
use delve_tools::ToolEvent;
use lru::LruCache;
use sha2::{Digest as _, Sha256};
use tracing::debug;

/// Field separator fed to the hasher between components.
const SEP: &[u8] = &[0x1f];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(event: &ToolEvent, mode: FingerprintMode, prefix_chars: usize) -> Self {
        let args = event.args.to_string();
        let result = match &event.result {
            None => "absent".to_string(),
            Some(value) => {
                let serialized = value.to_string();
                match mode {
                    FingerprintMode::Sha256 => hex::encode(Sha256::digest(serialized.as_bytes())),
                    FingerprintMode::Prefix => {
                        let prefix: String = serialized.chars().take(prefix_chars).collect();
                        format!("{}:{prefix}", serialized.len())
                    }
                }
            }
        };
        let mut hasher = Sha256::new();
        hasher.update(event.name.as_bytes());
        hasher.update(SEP);
        hasher.update(args.as_bytes());
        hasher.update(SEP);
        hasher.update(result.as_bytes());
        Fingerprint(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Outcome of running one event through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// First sighting of a terminal event; may be projected.
    Novel,
    /// Terminal event already seen; render only.
    Duplicate,
    /// Non-terminal event; never recorded, always rendered.
    Passthrough,
}

#[derive(Debug)]
pub struct Deduplicator {
    seen: LruCache<Fingerprint, ()>,
    mode: FingerprintMode,
    prefix_chars: usize,
}

impl Deduplicator {
    pub fn new(capacity: usize, mode: FingerprintMode, prefix_chars: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { seen: LruCache::new(cap), mode, prefix_chars }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.dedup_capacity, config.fingerprint, config.fingerprint_prefix_chars)
    }

    pub fn check(&mut self, event: &ToolEvent) -> Verdict {
        if !event.is_terminal() {
            return Verdict::Passthrough;
        }
        let fp = Fingerprint::of(event, self.mode, self.prefix_chars);
        // `get` refreshes recency so a frequently replayed event stays resident.
        if self.seen.get(&fp).is_some() {
            debug!(tool = %event.name, fingerprint = %fp.to_hex(), "duplicate terminal event");
            return Verdict::Duplicate;
        }
        if let Some((evicted, ())) = self.seen.push(fp, ()) {
            debug!(evicted = %evicted.to_hex(), cap = self.seen.cap().get(), "dedup set full; evicted oldest fingerprint");
        }
        Verdict::Novel
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forget every fingerprint (session end / restart).
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
