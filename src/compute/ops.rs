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

//! User-facing operations on jagged arrays.
//!
//! Axes may be negative (counted from the innermost dimension, numpy
//! style). Reductions bootstrap the recursion with a single output group
//! (all of the top level's elements get parent 0) and unwrap the length-1
//! outer list the orchestration hands back.

use crate::array::{Content, ContentRef, ListArray, ListOffsetArray64, RegularArray};
use crate::compute::kernels::list as list_kernels;
use crate::compute::reducers::{
    ArgMax, ArgMin, Count, CountNonzero, Max, Min, Prod, Reducer, Sum,
};
use crate::error::{JaggedError, Result};
use crate::index::Index64;

/// Resolves a possibly negative axis against the array's depth, returning
/// `(axis, depth)` with the axis non-negative.
fn wrap_axis(content: &dyn Content, axis: i64) -> Result<(i64, i64)> {
    let (branches, _) = content.branch_depth();
    if branches {
        return Err(JaggedError::InvalidArgumentError(
            "axis is ambiguous for arrays whose records branch to different depths".to_string(),
        ));
    }
    let depth = content.purelist_depth();
    let toaxis = if axis < 0 { depth + axis } else { axis };
    if toaxis < 0 || toaxis >= depth {
        return Err(JaggedError::InvalidArgumentError(format!(
            "axis {} exceeds the depth of this array ({})",
            axis, depth
        )));
    }
    Ok((toaxis, depth))
}

// The recursion returns a list of length 1 (the bootstrap group); the
// user-facing result is its only sublist. Flat results pass through.
fn unwrap_outer(out: ContentRef) -> ContentRef {
    if let Some(list) = out.as_any().downcast_ref::<ListOffsetArray64>() {
        let start = list.offsets().get(0) as usize;
        let stop = list.offsets().get(1) as usize;
        list.content().getitem_range_nowrap(start, stop)
    } else if let Some(list) = out.as_any().downcast_ref::<ListArray>() {
        let start = list.starts().get(0) as usize;
        let stop = list.stops().get(0) as usize;
        list.content().getitem_range_nowrap(start, stop)
    } else if let Some(regular) = out.as_any().downcast_ref::<RegularArray>() {
        regular.content().getitem_range_nowrap(0, regular.size())
    } else {
        out
    }
}

fn bootstrap_parents(content: &dyn Content) -> Index64 {
    let mut parents = vec![0i64; content.len()];
    list_kernels::zero_parents(&mut parents);
    Index64::from(parents)
}

/// Reduces `content` along `axis` with an arbitrary [`Reducer`].
///
/// When `mask` is set, empty groups come back missing instead of holding
/// the reducer's identity; `keepdims` keeps the reduced axis as a length-1
/// regular dimension.
pub fn reduce(
    content: &ContentRef,
    reducer: &dyn Reducer,
    axis: i64,
    mask: bool,
    keepdims: bool,
) -> Result<ContentRef> {
    let (toaxis, depth) = wrap_axis(content.as_ref(), axis)?;
    let negaxis = depth - toaxis;
    let starts = Index64::from(vec![0]);
    let parents = bootstrap_parents(content.as_ref());
    let out = content.reduce_next(reducer, negaxis, &starts, &parents, 1, mask, keepdims)?;
    Ok(unwrap_outer(out))
}

/// Per-group sums along `axis`; empty groups produce 0.
pub fn sum(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &Sum, axis, mask, keepdims)
}

/// Per-group products along `axis`; empty groups produce 1.
pub fn prod(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &Prod, axis, mask, keepdims)
}

/// Per-group minima along `axis`; empty groups produce the type maximum
/// (+inf for floats). Use [`reduce`] with [`Min::with_initial`] to override
/// the identity.
pub fn min(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &Min::new(), axis, mask, keepdims)
}

/// Per-group maxima along `axis`; empty groups produce the type minimum
/// (-inf for floats).
pub fn max(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &Max::new(), axis, mask, keepdims)
}

/// Positions of per-group minima along `axis`; empty groups produce -1 (or
/// missing with `mask`).
pub fn argmin(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &ArgMin, axis, mask, keepdims)
}

/// Positions of per-group maxima along `axis`.
pub fn argmax(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &ArgMax, axis, mask, keepdims)
}

/// Per-group element counts along `axis`.
pub fn count(content: &ContentRef, axis: i64, mask: bool, keepdims: bool) -> Result<ContentRef> {
    reduce(content, &Count, axis, mask, keepdims)
}

/// Per-group nonzero counts along `axis`.
pub fn count_nonzero(
    content: &ContentRef,
    axis: i64,
    mask: bool,
    keepdims: bool,
) -> Result<ContentRef> {
    reduce(content, &CountNonzero, axis, mask, keepdims)
}

/// Sorts every group along `axis`, preserving the list structure.
pub fn sort(content: &ContentRef, axis: i64, ascending: bool, stable: bool) -> Result<ContentRef> {
    let (toaxis, depth) = wrap_axis(content.as_ref(), axis)?;
    let negaxis = depth - toaxis;
    let starts = Index64::from(vec![0]);
    let parents = bootstrap_parents(content.as_ref());
    content.sort_next(negaxis, &starts, &parents, 1, ascending, stable, false)
}

/// Sort order of every group along `axis`: positions within each sublist.
pub fn argsort(
    content: &ContentRef,
    axis: i64,
    ascending: bool,
    stable: bool,
) -> Result<ContentRef> {
    let (toaxis, depth) = wrap_axis(content.as_ref(), axis)?;
    let negaxis = depth - toaxis;
    let starts = Index64::from(vec![0]);
    let parents = bootstrap_parents(content.as_ref());
    content.argsort_next(negaxis, &starts, &parents, 1, ascending, stable, false)
}

/// Number of elements in each sublist at `axis`.
pub fn num(content: &ContentRef, axis: i64) -> Result<ContentRef> {
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    content.num(toaxis, 0)
}

/// Dissolves one nesting level at `axis` (which must not be 0).
pub fn flatten(content: &ContentRef, axis: i64) -> Result<ContentRef> {
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    let (_, flattened) = content.offsets_and_flattened(toaxis, 0)?;
    Ok(flattened)
}

/// Pads every sublist at `axis` to at least `target` with missing values.
pub fn rpad(content: &ContentRef, target: usize, axis: i64) -> Result<ContentRef> {
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    content.rpad(target, toaxis, 0)
}

/// Pads and clips every sublist at `axis` to exactly `target`.
pub fn rpad_and_clip(content: &ContentRef, target: usize, axis: i64) -> Result<ContentRef> {
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    content.rpad_and_clip(target, toaxis, 0)
}

/// Lexicographic n-tuples of distinct elements from each sublist at `axis`.
pub fn combinations(
    content: &ContentRef,
    n: usize,
    replacement: bool,
    axis: i64,
) -> Result<ContentRef> {
    if n < 1 {
        return Err(JaggedError::InvalidArgumentError(
            "in combinations, 'n' must be at least 1".to_string(),
        ));
    }
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    content.combinations(n, replacement, toaxis, 0)
}

/// Position of every element within its sublist at `axis`.
pub fn local_index(content: &ContentRef, axis: i64) -> Result<ContentRef> {
    let (toaxis, _) = wrap_axis(content.as_ref(), axis)?;
    content.local_index(toaxis, 0)
}
