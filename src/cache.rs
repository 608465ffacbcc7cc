//! Operation cache for predicate computations.
//!
//! Memoizes the results of `and`, `or`, `not` and `restrict` keyed by the
//! identities of their operands. Keys are only meaningful within the solver
//! that produced the operands.

use std::collections::HashMap;

use crate::reference::Ref;

/// Operation types for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    And,
    Or,
    Not,
    Restrict { ordinal: u32, value: bool },
}

/// Cache key for predicate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub op: OpType,
    pub f: Ref,
    pub g: Ref,
}

impl CacheKey {
    /// Create a key for a commutative operation, normalizing operand order.
    pub fn commutative(op: OpType, f: Ref, g: Ref) -> Self {
        let (f, g) = if f <= g { (f, g) } else { (g, f) };
        Self { op, f, g }
    }

    /// Create a key for a unary operation.
    pub fn unary(op: OpType, f: Ref) -> Self {
        Self { op, f, g: Ref::ZERO }
    }
}

/// A cache backed by [HashMap], counting hits and misses.
#[derive(Debug, Default)]
pub struct Cache {
    map: HashMap<CacheKey, Ref>,
    hits: usize,
    misses: usize,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up a key in the cache.
    #[inline]
    pub fn get(&mut self, key: &CacheKey) -> Option<Ref> {
        match self.map.get(key) {
            Some(&v) => {
                self.hits += 1;
                Some(v)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    #[inline]
    pub fn insert(&mut self, key: CacheKey, value: Ref) {
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commutative_key() {
        let k1 = CacheKey::commutative(OpType::And, Ref::new(3), Ref::new(7));
        let k2 = CacheKey::commutative(OpType::And, Ref::new(7), Ref::new(3));
        assert_eq!(k1, k2);

        let k3 = CacheKey::commutative(OpType::Or, Ref::new(3), Ref::new(7));
        assert_ne!(k1, k3);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = Cache::new();
        let key = CacheKey::unary(OpType::Not, Ref::new(5));

        assert_eq!(cache.get(&key), None);
        cache.insert(key, Ref::new(6));
        assert_eq!(cache.get(&key), Some(Ref::new(6)));

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_restrict_keys_differ_by_value() {
        let mut cache = Cache::with_capacity(4);
        let f = Ref::new(9);
        let k0 = CacheKey::unary(OpType::Restrict { ordinal: 2, value: false }, f);
        let k1 = CacheKey::unary(OpType::Restrict { ordinal: 2, value: true }, f);
        cache.insert(k0, Ref::ZERO);
        cache.insert(k1, Ref::ONE);
        assert_eq!(cache.get(&k0), Some(Ref::ZERO));
        assert_eq!(cache.get(&k1), Some(Ref::ONE));
        assert_eq!(cache.len(), 2);
    }
}
