use std::collections::VecDeque;

/// Most recent distinct queries, newest first.
#[derive(Debug, Clone)]
pub struct RecentSearches {
    queries: VecDeque<String>,
    capacity: usize,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            queries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Move `query` to the front, dropping the oldest entry past capacity.
    pub fn push(&mut self, query: &str) {
        if self.capacity == 0 {
            return;
        }
        self.queries.retain(|q| q != query);
        self.queries.push_front(query.to_string());
        self.queries.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
