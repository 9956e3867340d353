//! Process-wide cache of resolved questions
//!
//! Maps exact question text to the last successfully resolved SQL. The map
//! is bounded: when the capacity is exceeded the oldest entry (by first
//! insertion) is evicted. Concurrent resolution of the same question may
//! overwrite an entry last-write-wins; losing that race only costs a
//! redundant provider call.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub struct QueryCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    map: HashMap<String, String>,
    order: VecDeque<String>,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Look up the SQL previously resolved for this exact question text.
    pub fn get(&self, question: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.get(question).cloned()
    }

    /// Record the SQL resolved for a question, overwriting any prior entry.
    pub fn insert(&self, question: &str, sql: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.map.insert(question.to_string(), sql.to_string()).is_none() {
            inner.order.push_back(question.to_string());
            while inner.map.len() > self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.map.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
