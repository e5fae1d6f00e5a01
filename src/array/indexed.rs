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

use super::{Content, ContentRef, ListOffsetArray64, RegularArray};
use crate::compute::kernels::indexed as kernels;
use crate::compute::reducers::Reducer;
use crate::error::{handle_kernel_error, JaggedError, Result};
use crate::index::Index64;

/// An indirection layer: element `i` is `content[index[i]]`, or missing
/// when `index[i]` is negative. Sits between list levels; reductions drop
/// the missing entries on the way down and re-attach them on the way up.
#[derive(Clone)]
pub struct IndexedOptionArray {
    index: Index64,
    content: ContentRef,
}

impl IndexedOptionArray {
    pub fn try_new(index: Index64, content: ContentRef) -> Result<Self> {
        for (i, &position) in index.values().iter().enumerate() {
            if position >= content.len() as i64 {
                return Err(JaggedError::StructuralError(format!(
                    "in IndexedOptionArray64: index out of range at i={}",
                    i
                )));
            }
        }
        Ok(Self { index, content })
    }

    pub(crate) fn new_unchecked(index: Index64, content: ContentRef) -> Self {
        Self { index, content }
    }

    pub fn index(&self) -> &Index64 {
        &self.index
    }

    pub fn content(&self) -> ContentRef {
        self.content.clone()
    }

    /// Collapses stacked option layers into one index; anything else is
    /// returned unchanged.
    pub fn simplify(&self) -> Result<ContentRef> {
        if let Some(inner) = self.content.as_any().downcast_ref::<IndexedOptionArray>() {
            let mut out = vec![0i64; self.index.len()];
            handle_kernel_error(
                kernels::index_simplify(&mut out, self.index.values(), inner.index.values()),
                self.classname(),
            )?;
            Ok(Arc::new(Self::new_unchecked(
                Index64::from(out),
                inner.content(),
            )))
        } else {
            Ok(Arc::new(self.clone()))
        }
    }
}

/// Re-attaches an option layer to a list that came back from a reduction
/// below an indirection: the result's per-group offsets are rebuilt from
/// this level's `starts`, and its content is wrapped with `outindex` so
/// missing inputs map to missing outputs.
pub(crate) fn wrap_reduced_option(
    out: ContentRef,
    outindex: Vec<i64>,
    starts: &Index64,
    classname: &str,
) -> Result<ContentRef> {
    let out = if let Some(regular) = out.as_any().downcast_ref::<RegularArray>() {
        Arc::new(regular.to_list_offset_64()) as ContentRef
    } else {
        out
    };
    let list = out
        .as_any()
        .downcast_ref::<ListOffsetArray64>()
        .ok_or_else(|| {
            JaggedError::StructuralError(format!(
                "in {}: reduction below an indirection expected a list result",
                classname
            ))
        })?;
    if !starts.is_empty() && starts.get(0) != 0 {
        return Err(JaggedError::StructuralError(format!(
            "in {}: reduction below an indirection expects starts that begin at zero",
            classname
        )));
    }

    let mut outoffsets = vec![0i64; starts.len() + 1];
    kernels::fix_offsets(&mut outoffsets, starts.values(), outindex.len());

    let inner =
        IndexedOptionArray::try_new(Index64::from(outindex), list.content())?.simplify()?;
    Ok(Arc::new(ListOffsetArray64::new_unchecked(
        Index64::from(outoffsets),
        inner,
    )))
}

impl fmt::Debug for IndexedOptionArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IndexedOptionArray64{:?} -> {:?}",
            self.index.values(),
            self.content
        )
    }
}

fn unsupported(operation: &str, classname: &str) -> JaggedError {
    JaggedError::ComputeError(format!(
        "{} is not supported through {}",
        operation, classname
    ))
}

impl Content for IndexedOptionArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        "IndexedOptionArray64"
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn purelist_depth(&self) -> i64 {
        self.content.purelist_depth()
    }

    fn branch_depth(&self) -> (bool, i64) {
        self.content.branch_depth()
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let own = self.index.values();
        let mut out = Vec::with_capacity(index.len());
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= own.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            out.push(own[position as usize]);
        }
        Ok(Arc::new(Self::new_unchecked(
            Index64::from(out),
            self.content.clone(),
        )))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.len());
        Arc::new(Self {
            index: self.index.slice(start, stop - start),
            content: self.content.clone(),
        })
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        for (i, &position) in self.index.values().iter().enumerate() {
            if position >= self.content.len() as i64 {
                return Some(format!(
                    "at {} ({}): index out of range at i={}",
                    path,
                    self.classname(),
                    i
                ));
            }
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
        if reducer.returns_positions() {
            return Err(JaggedError::ComputeError(format!(
                "{} is not supported through {}",
                reducer.name(),
                self.classname()
            )));
        }
        let index = self.index.values();
        let numnull = index.iter().filter(|&&position| position < 0).count();

        let mut nextcarry = vec![0i64; index.len() - numnull];
        let mut nextparents = vec![0i64; index.len() - numnull];
        let mut outindex = vec![0i64; index.len()];
        let kept = kernels::indexed_reduce_next(
            &mut nextcarry,
            &mut nextparents,
            &mut outindex,
            index,
            parents.values(),
        );
        debug_assert_eq!(kept, index.len() - numnull);

        let next = self.content.carry(&Index64::from(nextcarry))?;
        let out = next.reduce_next(
            reducer,
            negaxis,
            starts,
            &Index64::from(nextparents),
            outlength,
            mask,
            keepdims,
        )?;

        let (branches, depth) = self.branch_depth();
        if !branches && negaxis == depth {
            Ok(out)
        } else {
            wrap_reduced_option(out, outindex, starts, self.classname())
        }
    }

    fn sort_next(
        &self,
        _negaxis: i64,
        _starts: &Index64,
        _parents: &Index64,
        _outlength: usize,
        _ascending: bool,
        _stable: bool,
        _keepdims: bool,
    ) -> Result<ContentRef> {
        Err(unsupported("sort", self.classname()))
    }

    fn argsort_next(
        &self,
        _negaxis: i64,
        _starts: &Index64,
        _parents: &Index64,
        _outlength: usize,
        _ascending: bool,
        _stable: bool,
        _keepdims: bool,
    ) -> Result<ContentRef> {
        Err(unsupported("argsort", self.classname()))
    }

    fn num(&self, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("num", self.classname()))
    }

    fn offsets_and_flattened(&self, _axis: i64, _depth: i64) -> Result<(Index64, ContentRef)> {
        Err(unsupported("flatten", self.classname()))
    }

    fn rpad(&self, _target: usize, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("rpad", self.classname()))
    }

    fn rpad_and_clip(&self, _target: usize, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("rpad_and_clip", self.classname()))
    }

    fn combinations(
        &self,
        _n: usize,
        _replacement: bool,
        _axis: i64,
        _depth: i64,
    ) -> Result<ContentRef> {
        Err(unsupported("combinations", self.classname()))
    }

    fn local_index(&self, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("local_index", self.classname()))
    }
}
