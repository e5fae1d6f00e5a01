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

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{Content, ContentRef, ListOffsetArray64};
use crate::compute::reducers::Reducer;
use crate::error::{JaggedError, Result};
use crate::index::Index64;

/// A list whose sublists all share one `size`: the `keepdims` wrapper, the
/// `rpad_and_clip` output form, and the target of `to_regular`. Sublist `i`
/// spans `content[i * size..(i + 1) * size)`.
#[derive(Clone)]
pub struct RegularArray {
    content: ContentRef,
    size: usize,
    length: usize,
}

impl RegularArray {
    /// A regular list covering as much of the content as `size` divides.
    pub fn new(content: ContentRef, size: usize) -> Self {
        let length = if size == 0 { 0 } else { content.len() / size };
        Self {
            content,
            size,
            length,
        }
    }

    /// A regular list of explicit length, needed when `size` is 0.
    pub fn with_length(content: ContentRef, size: usize, length: usize) -> Self {
        Self {
            content,
            size,
            length,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn content(&self) -> ContentRef {
        self.content.clone()
    }

    /// The equivalent offset-encoded list: offsets `[0, size, 2*size, ...]`
    /// over the reachable content.
    pub fn to_list_offset_64(&self) -> ListOffsetArray64 {
        let offsets: Vec<i64> = (0..=self.length as i64)
            .map(|i| i * self.size as i64)
            .collect();
        let content = self
            .content
            .getitem_range_nowrap(0, self.length * self.size);
        ListOffsetArray64::new_unchecked(Index64::from(offsets), content)
    }
}

impl fmt::Debug for RegularArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RegularArray[size={}, length={}] -> {:?}",
            self.size, self.length, self.content
        )
    }
}

impl Content for RegularArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        "RegularArray"
    }

    fn len(&self) -> usize {
        self.length
    }

    fn purelist_depth(&self) -> i64 {
        self.content.purelist_depth() + 1
    }

    fn branch_depth(&self) -> (bool, i64) {
        let (branches, depth) = self.content.branch_depth();
        (branches, depth + 1)
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let mut nextcarry = Vec::with_capacity(index.len() * self.size);
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= self.length {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            for j in 0..self.size as i64 {
                nextcarry.push(position * self.size as i64 + j);
            }
        }
        let content = self.content.carry(&Index64::from(nextcarry))?;
        Ok(Arc::new(Self::with_length(content, self.size, index.len())))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.length);
        let content = self
            .content
            .getitem_range_nowrap(start * self.size, stop * self.size);
        Arc::new(Self::with_length(content, self.size, stop - start))
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        if self.length * self.size > self.content.len() {
            return Some(format!(
                "at {} ({}): length * size exceeds len(content)",
                path,
                self.classname()
            ));
        }
        self.content.validity_error(&format!("{}.content", path))
    }

    fn reduce_next(
        &self,
        reducer: &dyn Reducer,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        mask: bool,
        keepdims: bool,
    ) -> Result<ContentRef> {
        self.to_list_offset_64()
            .reduce_next(reducer, negaxis, starts, parents, outlength, mask, keepdims)
    }

    fn sort_next(
        &self,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        ascending: bool,
        stable: bool,
        keepdims: bool,
    ) -> Result<ContentRef> {
        self.to_list_offset_64().sort_next(
            negaxis, starts, parents, outlength, ascending, stable, keepdims,
        )
    }

    fn argsort_next(
        &self,
        negaxis: i64,
        starts: &Index64,
        parents: &Index64,
        outlength: usize,
        ascending: bool,
        stable: bool,
        keepdims: bool,
    ) -> Result<ContentRef> {
        self.to_list_offset_64().argsort_next(
            negaxis, starts, parents, outlength, ascending, stable, keepdims,
        )
    }

    fn num(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64().num(axis, depth)
    }

    fn offsets_and_flattened(&self, axis: i64, depth: i64) -> Result<(Index64, ContentRef)> {
        self.to_list_offset_64().offsets_and_flattened(axis, depth)
    }

    fn rpad(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64().rpad(target, axis, depth)
    }

    fn rpad_and_clip(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64().rpad_and_clip(target, axis, depth)
    }

    fn combinations(
        &self,
        n: usize,
        replacement: bool,
        axis: i64,
        depth: i64,
    ) -> Result<ContentRef> {
        self.to_list_offset_64()
            .combinations(n, replacement, axis, depth)
    }

    fn local_index(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64().local_index(axis, depth)
    }
}
