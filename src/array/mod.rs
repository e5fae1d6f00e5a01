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

//! The layout tree of jagged arrays.
//!
//! Every node of a nested layout implements [`Content`]: flat value leaves
//! ([`PrimitiveArray`]), offset-encoded jagged lists ([`ListOffsetArray`]),
//! the starts/stops form non-local reductions produce ([`ListArray`]),
//! equal-size lists ([`RegularArray`]), the two indirection layers
//! ([`IndexedOptionArray`], [`ByteMaskedArray`]) and positional tuples
//! ([`RecordArray`]). Contents hold their children by [`ContentRef`] and
//! only point downward.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::compute::kernels::list as list_kernels;
use crate::compute::reducers::Reducer;
use crate::error::Result;
use crate::index::Index64;

mod indexed;
mod list;
mod masked;
mod primitive;
mod record;
mod regular;

pub use indexed::IndexedOptionArray;
pub use list::{ListArray, ListOffsetArray, ListOffsetArray32, ListOffsetArray64, ListOffsetArrayU32};
pub use masked::ByteMaskedArray;
pub use primitive::{
    BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array,
    PrimitiveArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
pub use record::RecordArray;
pub use regular::RegularArray;

/// Reference-counted handle to a dynamically-typed layout node.
pub type ContentRef = Arc<dyn Content>;

/// A node of a nested layout.
///
/// The `*_next` methods are the recursive steps of reductions and sorts:
/// they receive the target axis as `negaxis` (depth counted from the
/// leaves, so `negaxis == 1` is the innermost axis), the flat `parents`
/// vector grouping this level's elements into `outlength` output groups,
/// and the per-group `starts` positions that positional reducers need.
/// User-facing entry points live in [`crate::compute`].
pub trait Content: fmt::Debug + Send + Sync {
    /// Returns the layout as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Layout class name used in error messages.
    fn classname(&self) -> &'static str;

    /// Number of elements at this level.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth including this layer; a leaf is 1. Indirection layers
    /// are transparent.
    fn purelist_depth(&self) -> i64;

    /// `(branches, depth)`: whether subtree depths disagree, and the
    /// maximum depth.
    fn branch_depth(&self) -> (bool, i64);

    /// Selects elements by an integer index, producing a new content of the
    /// index's length. Fails on out-of-range positions.
    fn carry(&self, index: &Index64) -> Result<ContentRef>;

    /// A view of elements `[start, stop)`; bounds are the caller's
    /// responsibility.
    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef;

    /// Recursive structural validation; returns a description of the first
    /// violated invariant, or `None`.
    fn validity_error(&self, path: &str) -> Option<String>;

    fn reduce_next(
        &self,
        reducer: &dyn Reducer,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        mask: bool,
        keepdims: bool,
    ) -> Result<ContentRef>;

    fn sort_next(
        &self,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        ascending: bool,
        stable: bool,
        keepdims: bool,
    ) -> Result<ContentRef>;

    fn argsort_next(
        &self,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        ascending: bool,
        stable: bool,
        keepdims: bool,
    ) -> Result<ContentRef>;

    /// Per-sublist element counts at `axis` (non-negative, resolved by the
    /// caller); `depth` is this layer's axis position.
    fn num(&self, axis: i64, depth: i64) -> Result<ContentRef>;

    /// Removes one nesting level at `axis`, returning the offsets that were
    /// dissolved (empty when the result needs none) and the flattened
    /// content.
    fn offsets_and_flattened(&self, axis: i64, depth: i64) -> Result<(Index64, ContentRef)>;

    /// Pads sublists at `axis` to at least `target` with missing values.
    fn rpad(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef>;

    /// Pads and clips sublists at `axis` to exactly `target`.
    fn rpad_and_clip(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef>;

    /// Lexicographic n-tuples of distinct elements per sublist at `axis`.
    fn combinations(
        &self,
        n: usize,
        replacement: bool,
        axis: i64,
        depth: i64,
    ) -> Result<ContentRef>;

    /// Position of every element within its sublist at `axis`.
    fn local_index(&self, axis: i64, depth: i64) -> Result<ContentRef>;
}

/// Pads the outermost dimension of any content: keeps positions `0..len`
/// and appends missing entries, or clips to exactly `target`.
pub(crate) fn rpad_axis0(content: ContentRef, target: usize, clip: bool) -> Result<ContentRef> {
    let length = if clip { target } else { target.max(content.len()) };
    let mut toindex = vec![0i64; length];
    list_kernels::rpad_axis0(&mut toindex, content.len());
    IndexedOptionArray::try_new(Index64::from(toindex), content)
        .map(|array| array.simplify())?
}

/// Tuples of the whole array: the axis == depth case of `combinations`.
/// Every tuple member is a carry of the full content.
pub(crate) fn combinations_axis0(
    content: ContentRef,
    n: usize,
    replacement: bool,
) -> Result<ContentRef> {
    if n < 1 {
        return Err(crate::error::JaggedError::InvalidArgumentError(
            "in combinations, 'n' must be at least 1".to_string(),
        ));
    }
    let starts = [0i64];
    let stops = [content.len() as i64];
    let mut tooffsets = vec![0i64; 2];
    let total =
        list_kernels::combinations_length(&mut tooffsets, &starts, &stops, n, replacement);

    let mut carries = vec![vec![0i64; total as usize]; n];
    {
        let mut tocarry: Vec<&mut [i64]> =
            carries.iter_mut().map(|buffer| buffer.as_mut_slice()).collect();
        list_kernels::combinations(&mut tocarry, &starts, &stops, n, replacement);
    }

    let mut fields = Vec::with_capacity(n);
    for carry in carries {
        fields.push(content.carry(&Index64::from(carry))?);
    }
    Ok(Arc::new(RecordArray::try_new(fields, total as usize)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpad_axis0_pads_and_clips() {
        let content: ContentRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
        let padded = rpad_axis0(content.clone(), 5, false).unwrap();
        let padded = padded.as_any().downcast_ref::<IndexedOptionArray>().unwrap();
        assert_eq!(padded.index().values(), &[0, 1, 2, -1, -1]);

        let clipped = rpad_axis0(content, 2, true).unwrap();
        let clipped = clipped.as_any().downcast_ref::<IndexedOptionArray>().unwrap();
        assert_eq!(clipped.index().values(), &[0, 1]);
    }

    #[test]
    fn test_combinations_axis0() {
        let content: ContentRef = Arc::new(Int64Array::from(vec![10, 20, 30]));
        let tuples = combinations_axis0(content, 2, false).unwrap();
        let record = tuples.as_any().downcast_ref::<RecordArray>().unwrap();
        assert_eq!(record.len(), 3);
        let field0 = record.field(0);
        let first = field0.as_any().downcast_ref::<Int64Array>().unwrap();
        let field1 = record.field(1);
        let second = field1.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(first.values(), &[10, 10, 20]);
        assert_eq!(second.values(), &[20, 30, 30]);
    }
}
