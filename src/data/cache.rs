use crate::engines::evaluation::Diagnostics;
use std::collections::HashMap;
use std::sync::Mutex;

/// Diagnostics keyed by canonical formula string.
///
/// Evaluation is a pure function of the formula, so repeated formulas
/// (elites, no-op mutations) are scored once.
pub struct DiagnosticsCache {
    data: Mutex<HashMap<String, Diagnostics>>,
    capacity: usize,
}

impl DiagnosticsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Diagnostics> {
        let data = self.data.lock().ok()?;
        data.get(key).cloned()
    }

    pub fn set(&self, key: String, value: Diagnostics) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(mut data) = self.data.lock() {
            if data.len() >= self.capacity {
                // A simple eviction strategy: clear the cache when full.
                data.clear();
            }
            data.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
