//! # ringfork - Bounded buffering and fork-join mapping
//!
//! Two independent building blocks for bounded data processing.
//!
//! ## Design
//!
//! - [`RingBuffer`]: fixed-capacity circular buffer; pushing past capacity
//!   silently evicts the oldest element
//! - Iteration walks the live elements oldest-to-newest through an
//!   index cursor that borrows the buffer
//! - [`ParallelMapper`]: applies a function to a slice on a fixed number of
//!   scoped threads, statically partitioning the index range
//! - Each map call spawns and joins its own workers; nothing outlives the call
//! - Failures in the mapped function are first-error-wins
//!
//! ## Example
//!
//! ```
//! use ringfork::{ParallelMapper, RingBuffer};
//!
//! // Keep the five most recent readings
//! let mut readings = RingBuffer::new(5).unwrap();
//! for t in [23.5, 24.1, 23.8, 25.2, 24.7, 26.1] {
//!     readings.push_back(t);
//! }
//! assert_eq!(*readings.front().unwrap(), 24.1);
//! assert_eq!(*readings.back().unwrap(), 26.1);
//!
//! // Brighten pixels on four threads
//! let pixels: Vec<i32> = (0..1000).collect();
//! let mapper = ParallelMapper::new(4);
//! let brightened = mapper.map(&pixels, |p| (p + 50).clamp(0, 255)).unwrap();
//! assert_eq!(brightened[0], 50);
//! assert_eq!(brightened[999], 255);
//! ```

#![warn(missing_docs)]

mod error;
mod parallel;
mod ring_buffer;

pub use error::{BoxError, Error, Result, WorkerPanic};
pub use parallel::{partition, ParallelMapper};
pub use ring_buffer::{Iter, RingBuffer};
