// Defines the fixed-capacity ring buffer holding the controller's past errors and outputs
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::vec;
use alloc::vec::Vec;

use num_traits::Float;

/// A fixed-capacity ring buffer of scalar samples, always holding exactly `len` values.
///
/// The buffer starts zero-seeded, so the recurrence has well-defined `t-1` terms on the very
/// first compute. Pushing a new sample overwrites the oldest one; the capacity never changes
/// after construction. Named accessors ([`History::latest`] and [`History::previous`]) replace
/// raw back-indexing, which is where off-by-one bugs in incremental controllers like to live.
#[derive(Clone, Debug, PartialEq)]
pub struct History<F> {
    buf: Vec<F>,
    head: usize,
}

impl<F: Float> History<F> {
    /// Creates a buffer of `len` zeros. `len` must be at least one.
    pub fn zeroed(len: usize) -> Self {
        assert!(len > 0, "history length must be at least one");
        History {
            buf: vec![F::zero(); len],
            head: len - 1,
        }
    }

    /// Returns the fixed number of samples held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always false; the buffer is born full of zeros.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Appends a sample, dropping the oldest one.
    pub fn push(&mut self, value: F) {
        self.head = (self.head + 1) % self.buf.len();
        self.buf[self.head] = value;
    }

    /// Returns the most recently pushed sample (or a seed zero before any push).
    pub fn latest(&self) -> F {
        self.buf[self.head]
    }

    /// Returns the sample pushed before the latest one.
    ///
    /// With a length-one buffer only the newest sample is retained, so this returns the same
    /// value as [`History::latest`].
    pub fn previous(&self) -> F {
        let len = self.buf.len();
        self.buf[(self.head + len - 1) % len]
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn test_starts_zero_seeded() {
        let history = History::<f64>::zeroed(3);
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest(), 0.0);
        assert_eq!(history.previous(), 0.0);
    }

    #[test]
    fn test_push_rotates_oldest_out() {
        let mut history = History::zeroed(2);
        history.push(1.0);
        assert_eq!(history.latest(), 1.0);
        assert_eq!(history.previous(), 0.0);

        history.push(2.0);
        assert_eq!(history.latest(), 2.0);
        assert_eq!(history.previous(), 1.0);

        history.push(3.0);
        assert_eq!(history.latest(), 3.0);
        assert_eq!(history.previous(), 2.0);
    }

    #[test]
    fn test_length_one_retains_newest_only() {
        let mut history = History::zeroed(1);
        history.push(5.0);
        assert_eq!(history.latest(), 5.0);
        assert_eq!(history.previous(), 5.0);
    }

    #[test]
    #[should_panic(expected = "history length must be at least one")]
    fn test_zero_length_is_rejected() {
        let _ = History::<f64>::zeroed(0);
    }
}
