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

use super::{Content, ContentRef};
use crate::compute::reducers::Reducer;
use crate::error::{JaggedError, Result};
use crate::index::Index64;

/// A positional tuple of same-length contents; row `i` is
/// `(fields[0][i], fields[1][i], ...)`. This is the output form of
/// `combinations` and deliberately carries a minimal surface: it can be
/// carried and sliced, but it is not a reduction target.
#[derive(Clone)]
pub struct RecordArray {
    fields: Vec<ContentRef>,
    length: usize,
}

impl RecordArray {
    pub fn try_new(fields: Vec<ContentRef>, length: usize) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if field.len() < length {
                return Err(JaggedError::StructuralError(format!(
                    "in RecordArray: field {} is shorter ({}) than the record length ({})",
                    i,
                    field.len(),
                    length
                )));
            }
        }
        Ok(Self { fields, length })
    }

    pub fn n_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, i: usize) -> ContentRef {
        self.fields[i].clone()
    }

    pub fn fields(&self) -> &[ContentRef] {
        &self.fields
    }
}

impl fmt::Debug for RecordArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RecordArray[length={}]{:?}", self.length, self.fields)
    }
}

fn unsupported(operation: &str) -> JaggedError {
    JaggedError::ComputeError(format!("{} is not supported for RecordArray", operation))
}

impl Content for RecordArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        "RecordArray"
    }

    fn len(&self) -> usize {
        self.length
    }

    fn purelist_depth(&self) -> i64 {
        1
    }

    fn branch_depth(&self) -> (bool, i64) {
        let mut depth = None;
        let mut branches = false;
        for field in &self.fields {
            let (field_branches, field_depth) = field.branch_depth();
            branches |= field_branches;
            match depth {
                None => depth = Some(field_depth),
                Some(existing) => {
                    if existing != field_depth {
                        branches = true;
                        depth = Some(existing.max(field_depth));
                    }
                }
            }
        }
        (branches, depth.unwrap_or(1))
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            fields.push(field.getitem_range_nowrap(0, self.length).carry(index)?);
        }
        Ok(Arc::new(Self {
            fields,
            length: index.len(),
        }))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.length);
        let fields = self
            .fields
            .iter()
            .map(|field| field.getitem_range_nowrap(start, stop))
            .collect();
        Arc::new(Self {
            fields,
            length: stop - start,
        })
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.len() < self.length {
                return Some(format!(
                    "at {} ({}): field {} is shorter than the record length",
                    path,
                    self.classname(),
                    i
                ));
            }
            if let Some(error) = field.validity_error(&format!("{}.field({})", path, i)) {
                return Some(error);
            }
        }
        None
    }

    fn reduce_next(
        &self,
        _reducer: &dyn Reducer,
        _negaxis: i64,
        _starts: &Index64,
        _parents: &Index64,
        _outlength: usize,
        _mask: bool,
        _keepdims: bool,
    ) -> Result<ContentRef> {
        Err(unsupported("reduce"))
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
