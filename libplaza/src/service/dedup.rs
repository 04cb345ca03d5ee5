//! Bounded memory of recently dispatched request ids

use std::collections::{HashSet, VecDeque};

/// Remembers the last `window` request ids, oldest evicted first
#[derive(Debug, Clone)]
pub struct RequestLog {
    window: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RequestLog {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Record `request_id`. Returns false if it is still within the window.
    ///
    /// A zero window never remembers anything.
    pub fn record(&mut self, request_id: &str) -> bool {
        if self.window == 0 {
            return true;
        }
        if self.seen.contains(request_id) {
            return false;
        }
        if self.order.len() == self.window {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(request_id.to_string());
        self.seen.insert(request_id.to_string());
        true
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.seen.contains(request_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
