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

//! An immutable, reference-counted buffer of typed values.
//!
//! `Buffer<T>` is the lowest storage abstraction of this crate: layouts and
//! index views borrow it by cheap clone and carry their own
//! `(offset, length)` windows, so slicing never copies values.

use std::fmt;
use std::sync::Arc;

/// A contiguous, immutable run of values shared by reference count.
#[derive(Clone)]
pub struct Buffer<T> {
    data: Arc<Vec<T>>,
}

impl<T> Buffer<T> {
    /// Returns the number of values in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the buffer holds zero values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the values as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> From<Vec<T>> for Buffer<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            data: Arc::new(values),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Buffer").field("data", &self.data).finish()
    }
}

impl<T: PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_from_vec() {
        let buffer = Buffer::from(vec![1i64, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_empty());
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_buffer_clone_shares_storage() {
        let buffer = Buffer::from(vec![1i32, 2]);
        let other = buffer.clone();
        assert_eq!(buffer, other);
        assert_eq!(buffer.as_slice().as_ptr(), other.as_slice().as_ptr());
    }
}
