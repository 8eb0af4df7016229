use std::fmt;

/// Fixed-capacity ring; pushing past capacity overwrites the oldest item.
#[derive(Clone, PartialEq)]
pub struct CircularBuffer<T> {
    buffer: Vec<T>,
    write_pos: usize,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity),
            write_pos: 0,
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
        } else {
            self.buffer[self.write_pos] = item;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let head = if self.buffer.len() < self.capacity {
            0
        } else {
            self.write_pos
        };
        self.buffer[head..].iter().chain(&self.buffer[..head])
    }

    pub fn last(&self) -> Option<&T> {
        if self.buffer.is_empty() {
            return None;
        }
        let idx = (self.write_pos + self.capacity - 1) % self.capacity;
        self.buffer.get(idx)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
