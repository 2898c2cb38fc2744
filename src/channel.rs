use std::collections::VecDeque;

/// Unbounded FIFO of integers connecting a machine to its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    queue: VecDeque<i64>,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: i64) {
        self.queue.push_back(value);
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Remove every queued value, oldest first.
    pub fn drain(&mut self) -> Vec<i64> {
        self.queue.drain(..).collect()
    }
}

impl Extend<i64> for Channel {
    fn extend<T: IntoIterator<Item = i64>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}
