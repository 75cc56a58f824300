//! Round-robin API key rotation.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed set of API keys handed out in rotation.
///
/// The cursor advances atomically, so concurrent callers each receive a
/// distinct position in the sequence.
pub struct ApiKeyPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl ApiKeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Return the key at the cursor and advance it by one (mod len).
    pub fn next_key(&self) -> Option<&str> {
        let len = self.keys.len();
        if len == 0 {
            return None;
        }
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(previous) | Err(previous) => previous,
        };
        self.keys.get(index).map(String::as_str)
    }
}

/// Custom Debug implementation to keep key material out of logs.
impl fmt::Debug for ApiKeyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyPool")
            .field("keys", &self.keys.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pool(keys: &[&str]) -> ApiKeyPool {
        ApiKeyPool::new(keys.iter().map(|k| k.to_string()).collect())
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        assert_eq!(ApiKeyPool::empty().next_key(), None);
    }

    #[test]
    fn test_round_robin_order() {
        let pool = pool(&["k1", "k2", "k3"]);
        let seen: Vec<_> = (0..6).filter_map(|_| pool.next_key()).collect();
        assert_eq!(seen, vec!["k1", "k2", "k3", "k1", "k2", "k3"]);
    }

    #[test]
    fn test_concurrent_rotation_is_fair() {
        let pool = Arc::new(pool(&["k1", "k2", "k3"]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    (0..30)
                        .filter_map(|_| pool.next_key().map(String::from))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                *counts.entry(key).or_default() += 1;
            }
        }
        // 240 draws over 3 keys: every key exactly 80 times
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|&n| n == 80));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug_str = format!("{:?}", pool(&["secret-key"]));
        assert!(!debug_str.contains("secret-key"));
    }
}
