// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Integer-index views over shared buffers.
//!
//! An [`Index`] is the `(buffer, offset, length)` triple that list offsets,
//! parents and starts vectors travel in. Indices come in three widths
//! (`Index32`, `IndexU32`, `Index64`), and every consumer interprets
//! positions relative to the view's window, never the underlying buffer.

use std::fmt;

use crate::buffer::Buffer;
use crate::datatypes::OffsetSizeTrait;

/// A length-checked window into a buffer of offsets or positions.
#[derive(Clone)]
pub struct Index<O: OffsetSizeTrait> {
    data: Buffer<O>,
    offset: usize,
    length: usize,
}

pub type Index32 = Index<i32>;
pub type IndexU32 = Index<u32>;
pub type Index64 = Index<i64>;

impl<O: OffsetSizeTrait> Index<O> {
    /// Returns the number of positions in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the window as a slice; all kernel access goes through this.
    #[inline]
    pub fn values(&self) -> &[O] {
        &self.data.as_slice()[self.offset..self.offset + self.length]
    }

    /// Returns the position at `i`, which must be within the window.
    #[inline]
    pub fn get(&self, i: usize) -> O {
        self.values()[i]
    }

    /// Returns a narrower view over the same buffer without copying.
    ///
    /// `offset + length` must not exceed this view's length.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        assert!(
            offset + length <= self.length,
            "index slice [{}, {}) exceeds length {}",
            offset,
            offset + length,
            self.length
        );
        Self {
            data: self.data.clone(),
            offset: self.offset + offset,
            length,
        }
    }

    /// Widens the window into the canonical 64-bit form, copying into a
    /// fresh buffer.
    pub fn to_index64(&self) -> Index64 {
        Index64::from(self.values().iter().map(|v| v.to_i64()).collect::<Vec<i64>>())
    }
}

impl Index64 {
    /// An all-zero index of the given length, the top-level parents vector
    /// of every reduction.
    pub fn zeros(length: usize) -> Self {
        Self::from(vec![0i64; length])
    }
}

impl<O: OffsetSizeTrait> From<Vec<O>> for Index<O> {
    fn from(values: Vec<O>) -> Self {
        let length = values.len();
        Self {
            data: Buffer::from(values),
            offset: 0,
            length,
        }
    }
}

impl<O: OffsetSizeTrait> fmt::Debug for Index<O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Index").field("values", &self.values()).finish()
    }
}

impl<O: OffsetSizeTrait> PartialEq for Index<O> {
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_window() {
        let index = Index64::from(vec![0, 3, 3, 5, 6]);
        assert_eq!(index.len(), 5);
        assert_eq!(index.get(1), 3);
        assert_eq!(index.values(), &[0, 3, 3, 5, 6]);
    }

    #[test]
    fn test_index_slice_shares_buffer() {
        let index = Index64::from(vec![0, 3, 3, 5, 6]);
        let sliced = index.slice(1, 3);
        assert_eq!(sliced.values(), &[3, 3, 5]);
        let nested = sliced.slice(1, 2);
        assert_eq!(nested.values(), &[3, 5]);
    }

    #[test]
    #[should_panic(expected = "exceeds length")]
    fn test_index_slice_out_of_window() {
        let index = Index64::from(vec![0i64, 1]);
        index.slice(1, 2);
    }

    #[test]
    fn test_index_widening() {
        let index = Index32::from(vec![0i32, 2, 4]);
        assert_eq!(index.to_index64().values(), &[0i64, 2, 4]);
        let unsigned = IndexU32::from(vec![0u32, 7]);
        assert_eq!(unsigned.to_index64().values(), &[0i64, 7]);
    }

    #[test]
    fn test_zeros() {
        assert_eq!(Index64::zeros(3).values(), &[0, 0, 0]);
    }
}
