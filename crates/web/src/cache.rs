//! Explicit memo cache for the pipeline
//!
//! A single-slot cache keyed by a blake3 hash of the pipeline inputs:
//! repeated interactions with unchanged inputs reuse the previous output,
//! and any input change invalidates the slot. Purely an optimization; the
//! pipeline is correct without it.

use parking_lot::RwLock;
use std::sync::Arc;

/// Content hash over the pipeline inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoKey([u8; 32]);

impl MemoKey {
    /// Hash a sequence of input byte slices. Each part is length-prefixed so
    /// part boundaries cannot alias.
    pub fn compute(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }
}

/// Single-entry keyed memo slot.
pub struct MemoCache<T> {
    slot: RwLock<Option<(MemoKey, Arc<T>)>>,
}

impl<T> MemoCache<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn get(&self, key: &MemoKey) -> Option<Arc<T>> {
        let slot = self.slot.read();
        match slot.as_ref() {
            Some((stored, value)) if stored == key => Some(Arc::clone(value)),
            _ => None,
        }
    }

    pub fn put(&self, key: MemoKey, value: Arc<T>) {
        *self.slot.write() = Some((key, value));
    }
}

impl<T> Default for MemoCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss() {
        let cache = MemoCache::new();
        let key_a = MemoKey::compute(&[b"input-a"]);
        let key_b = MemoKey::compute(&[b"input-b"]);

        assert!(cache.get(&key_a).is_none());

        cache.put(key_a, Arc::new(42u64));
        assert_eq!(*cache.get(&key_a).unwrap(), 42);
        assert!(cache.get(&key_b).is_none());
    }

    #[test]
    fn test_new_key_evicts_old_entry() {
        let cache = MemoCache::new();
        let key_a = MemoKey::compute(&[b"input-a"]);
        let key_b = MemoKey::compute(&[b"input-b"]);

        cache.put(key_a, Arc::new(1u64));
        cache.put(key_b, Arc::new(2u64));

        assert!(cache.get(&key_a).is_none());
        assert_eq!(*cache.get(&key_b).unwrap(), 2);
    }

    #[test]
    fn test_length_prefix_prevents_aliasing() {
        let joined = MemoKey::compute(&[b"ab", b"c"]);
        let split = MemoKey::compute(&[b"a", b"bc"]);
        assert_ne!(joined, split);
    }
}
