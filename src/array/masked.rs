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

use super::indexed::wrap_reduced_option;
use super::{Content, ContentRef};
use crate::buffer::Buffer;
use crate::compute::kernels::indexed as kernels;
use crate::compute::reducers::Reducer;
use crate::error::{JaggedError, Result};
use crate::index::Index64;

/// A missing-value layer with one mask byte per element: element `i` is
/// valid when `(mask[i] != 0) == valid_when`. The content aligns
/// positionally with the mask, so the layer adds no indirection of its own.
#[derive(Clone)]
pub struct ByteMaskedArray {
    mask: Buffer<i8>,
    offset: usize,
    length: usize,
    content: ContentRef,
    valid_when: bool,
}

impl ByteMaskedArray {
    pub fn try_new(mask: Buffer<i8>, content: ContentRef, valid_when: bool) -> Result<Self> {
        if mask.len() > content.len() {
            return Err(JaggedError::StructuralError(format!(
                "in ByteMaskedArray: mask length ({}) exceeds content length ({})",
                mask.len(),
                content.len()
            )));
        }
        let length = mask.len();
        Ok(Self {
            mask,
            offset: 0,
            length,
            content,
            valid_when,
        })
    }

    /// The mask bytes of this array's window.
    pub fn mask(&self) -> &[i8] {
        &self.mask.as_slice()[self.offset..self.offset + self.length]
    }

    pub fn content(&self) -> ContentRef {
        self.content.clone()
    }

    pub fn valid_when(&self) -> bool {
        self.valid_when
    }

    /// Whether element `i` is present.
    pub fn is_valid(&self, i: usize) -> bool {
        (self.mask()[i] != 0) == self.valid_when
    }
}

impl fmt::Debug for ByteMaskedArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ByteMaskedArray[valid_when={}]{:?} -> {:?}",
            self.valid_when,
            self.mask(),
            self.content
        )
    }
}

fn unsupported(operation: &str) -> JaggedError {
    JaggedError::ComputeError(format!(
        "{} is not supported through ByteMaskedArray",
        operation
    ))
}

impl Content for ByteMaskedArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        "ByteMaskedArray"
    }

    fn len(&self) -> usize {
        self.length
    }

    fn purelist_depth(&self) -> i64 {
        self.content.purelist_depth()
    }

    fn branch_depth(&self) -> (bool, i64) {
        self.content.branch_depth()
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let mask = self.mask();
        let mut bytes = Vec::with_capacity(index.len());
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= mask.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            bytes.push(mask[position as usize]);
        }
        let content = self.content.carry(index)?;
        let length = bytes.len();
        Ok(Arc::new(Self {
            mask: Buffer::from(bytes),
            offset: 0,
            length,
            content,
            valid_when: self.valid_when,
        }))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.length);
        Arc::new(Self {
            mask: self.mask.clone(),
            offset: self.offset + start,
            length: stop - start,
            content: self.content.getitem_range_nowrap(start, stop),
            valid_when: self.valid_when,
        })
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        if self.length > self.content.len() {
            return Some(format!(
                "at {} ({}): mask length exceeds len(content)",
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
        if reducer.returns_positions() {
            return Err(JaggedError::ComputeError(format!(
                "{} is not supported through {}",
                reducer.name(),
                self.classname()
            )));
        }
        let bytes = self.mask();
        let numnull = bytes
            .iter()
            .filter(|&&byte| (byte != 0) != self.valid_when)
            .count();

        let mut nextcarry = vec![0i64; bytes.len() - numnull];
        let mut nextparents = vec![0i64; bytes.len() - numnull];
        let mut outindex = vec![0i64; bytes.len()];
        let kept = kernels::bytemasked_reduce_next(
            &mut nextcarry,
            &mut nextparents,
            &mut outindex,
            bytes,
            self.valid_when,
            parents.values(),
        );
        debug_assert_eq!(kept, bytes.len() - numnull);

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
        Err(unsupported("sort"))
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
        Err(unsupported("argsort"))
    }

    fn num(&self, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("num"))
    }

    fn offsets_and_flattened(&self, _axis: i64, _depth: i64) -> Result<(Index64, ContentRef)> {
        Err(unsupported("flatten"))
    }

    fn rpad(&self, _target: usize, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("rpad"))
    }

    fn rpad_and_clip(&self, _target: usize, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("rpad_and_clip"))
    }

    fn combinations(
        &self,
        _n: usize,
        _replacement: bool,
        _axis: i64,
        _depth: i64,
    ) -> Result<ContentRef> {
        Err(unsupported("combinations"))
    }

    fn local_index(&self, _axis: i64, _depth: i64) -> Result<ContentRef> {
        Err(unsupported("local_index"))
    }
}
