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

//! A columnar engine for jagged (variable-length nested) arrays of primitive
//! numeric values.
//!
//! Nesting is encoded by integer *offsets* into a flat content buffer rather
//! than by pointers: a [`ListOffsetArray`](array::ListOffsetArray) with
//! offsets `[0, 3, 3, 5]` over content `[1, 2, 3, 4, 5]` represents the
//! jagged array `[[1, 2, 3], [], [4, 5]]`. Layouts compose, so a
//! list-of-list-of-floats is a `ListOffsetArray` whose content is another
//! `ListOffsetArray` whose content is a
//! [`PrimitiveArray<f64>`](array::PrimitiveArray).
//!
//! ## Segmented reductions
//!
//! The crate's defining capability is reducing such arrays along a chosen
//! axis (sum, product, count, count-nonzero, min, max, argmin, argmax),
//! together with the group-wise transformations that share the same
//! machinery: sort, argsort, combinations, right-padding, and flattening.
//!
//! ```
//! use std::sync::Arc;
//! use jagged::array::{Content, ContentRef, Int64Array, ListOffsetArray64};
//! use jagged::compute::sum;
//! use jagged::index::Index64;
//!
//! # fn main() -> jagged::error::Result<()> {
//! let content: ContentRef = Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6]));
//! let offsets = Index64::from(vec![0, 3, 3, 5, 6]);
//! let list: ContentRef = Arc::new(ListOffsetArray64::try_new(offsets, content)?);
//!
//! let reduced = sum(&list, -1, false, false)?;
//! let values = reduced.as_any().downcast_ref::<Int64Array>().unwrap();
//! assert_eq!(values.values(), &[6, 0, 9, 6]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! * [`buffer`] and [`index`] hold the borrowed storage: a shared immutable
//!   value buffer plus `(buffer, offset, length)` integer-index views in
//!   three widths (i32, u32, i64).
//! * [`compute::kernels`] is the numerical kernel suite: typed elementwise
//!   reducers and the pure offset/parents/starts transformations that
//!   prepare one nesting level for reduction. Kernels operate on plain
//!   slices, never allocate, and never touch global state.
//! * [`array`] defines the [`Content`](array::Content) layouts and the
//!   recursive orchestration that walks a nested layout one level at a
//!   time, choosing between a *local* strategy (reduce within each sublist)
//!   and a *non-local* strategy (reduce across sublists grouped by an outer
//!   parent).
//! * [`compute`] exposes the user-facing operations.

#![allow(clippy::needless_range_loop)]

pub mod array;
pub mod buffer;
pub mod compute;
pub mod datatypes;
pub mod error;
pub mod index;
