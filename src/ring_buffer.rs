use std::fmt;
use std::iter::FusedIterator;

use log::trace;

use crate::error::{Error, Result};

/// Fixed-capacity ring buffer with overwrite-on-full semantics
///
/// - Storage is allocated once, at construction, and never resized
/// - Live elements occupy `[head, head + len) mod capacity`
/// - Pushing into a full buffer silently evicts the oldest element
///
/// The buffer is not internally synchronized: mutation needs `&mut self`,
/// so sharing it between threads requires an external lock.
#[derive(Clone)]
pub struct RingBuffer<T> {
    /// Slot storage; slots outside the live range hold `None`
    data: Box<[Option<T>]>,
    /// Fixed number of slots
    capacity: usize,
    /// Index of the oldest live element
    head: usize,
    /// Index where the next element will be written
    tail: usize,
    /// Number of live elements
    count: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer holding at most `capacity` elements
    ///
    /// # Arguments
    /// * `capacity` - Number of slots to allocate
    ///
    /// # Returns
    /// * `Ok(RingBuffer)` on success
    /// * `Err(Error::InvalidArgument)` if capacity is 0
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be > 0"));
        }

        let data = (0..capacity)
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(RingBuffer {
            data,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    /// Append an element at the back
    ///
    /// When the buffer is full the oldest element is overwritten and
    /// returned; otherwise returns `None`.
    pub fn push_back(&mut self, item: T) -> Option<T> {
        let evicted = self.data[self.tail].replace(item);

        if self.count < self.capacity {
            self.count += 1;
        } else {
            // Full: the slot we just wrote was the head.
            self.head = (self.head + 1) % self.capacity;
            trace!("ring buffer full (capacity {}), evicted oldest", self.capacity);
        }
        self.tail = (self.tail + 1) % self.capacity;

        evicted
    }

    /// Remove and return the oldest element
    ///
    /// # Returns
    /// * `Err(Error::EmptyBuffer)` if no live elements exist
    pub fn pop_front(&mut self) -> Result<T> {
        if self.count == 0 {
            return Err(Error::EmptyBuffer);
        }

        let item = self.data[self.head].take().ok_or(Error::EmptyBuffer)?;
        self.head = (self.head + 1) % self.capacity;
        self.count -= 1;

        Ok(item)
    }

    /// Oldest live element
    pub fn front(&self) -> Result<&T> {
        self.get(0).ok_or(Error::EmptyBuffer)
    }

    /// Most recently pushed live element
    pub fn back(&self) -> Result<&T> {
        if self.count == 0 {
            return Err(Error::EmptyBuffer);
        }
        let index = (self.tail + self.capacity - 1) % self.capacity;
        self.data[index].as_ref().ok_or(Error::EmptyBuffer)
    }

    /// Live element at `offset` from the oldest, or `None` past the end
    pub fn get(&self, offset: usize) -> Option<&T> {
        if offset >= self.count {
            return None;
        }
        self.data[(self.head + offset) % self.capacity].as_ref()
    }

    /// Drop every live element and reset the cursors
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Number of live elements
    pub fn size(&self) -> usize {
        self.count
    }

    /// Alias of [`size`](Self::size)
    pub fn len(&self) -> usize {
        self.count
    }

    /// Fixed number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer holds no live elements
    pub fn empty(&self) -> bool {
        self.count == 0
    }

    /// Alias of [`empty`](Self::empty)
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if the next push will evict
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Iterate live elements from oldest to newest
    ///
    /// Every call starts over from the current head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            offset: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over the live elements of a [`RingBuffer`]
///
/// Holds a logical offset and a shared borrow of the buffer; elements are
/// looked up as `data[(head + offset) % capacity]`. The buffer must not be
/// mutated while an iteration is in progress, which the borrow enforces.
#[derive(Debug)]
pub struct Iter<'a, T> {
    buffer: &'a RingBuffer<T>,
    offset: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            buffer: self.buffer,
            offset: self.offset,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.offset)?;
        self.offset += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.count.saturating_sub(self.offset);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Push(i32),
        Pop,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<i32>().prop_map(Op::Push), Just(Op::Pop)]
    }

    proptest! {
        /// Only the last `capacity` pushes survive, oldest first
        #[test]
        fn prop_last_capacity_pushes_survive(
            capacity in 1usize..64,
            values in prop::collection::vec(any::<u32>(), 0..300)
        ) {
            let mut rb = RingBuffer::new(capacity).unwrap();
            for &v in &values {
                rb.push_back(v);
            }

            let keep = values.len().min(capacity);
            let expected = &values[values.len() - keep..];
            let actual: Vec<u32> = rb.iter().copied().collect();
            prop_assert_eq!(&actual[..], expected);
            prop_assert_eq!(rb.size(), keep);
        }

        /// Arbitrary push/pop interleavings behave like a bounded deque
        #[test]
        fn prop_matches_bounded_deque(
            capacity in 1usize..16,
            ops in prop::collection::vec(op(), 0..200)
        ) {
            use std::collections::VecDeque;

            let mut rb = RingBuffer::new(capacity).unwrap();
            let mut model = VecDeque::new();

            for op in ops {
                match op {
                    Op::Push(v) => {
                        let evicted = rb.push_back(v);
                        let expected = if model.len() == capacity {
                            model.pop_front()
                        } else {
                            None
                        };
                        model.push_back(v);
                        prop_assert_eq!(evicted, expected);
                    }
                    Op::Pop => match model.pop_front() {
                        Some(v) => {
                            prop_assert_eq!(rb.pop_front().unwrap(), v);
                        }
                        None => {
                            prop_assert!(matches!(rb.pop_front(), Err(Error::EmptyBuffer)));
                        }
                    },
                }

                prop_assert_eq!(rb.size(), model.len());
                prop_assert_eq!(rb.front().ok(), model.front());
                prop_assert_eq!(rb.back().ok(), model.back());
                prop_assert!(rb.iter().eq(model.iter()));
            }
        }
    }
}
