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

//! The jagged list layers and their recursive orchestration.
//!
//! [`ListOffsetArray`] is the offset-encoded form, parameterized by offset
//! width; [`ListArray`] is the starts/stops form that non-local reductions
//! produce. All orchestration runs on the 64-bit compact canonical form:
//! narrower widths and non-zero-based offsets convert first, which
//! collapses the width × strategy combinations at the algorithm level.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{combinations_axis0, rpad_axis0, Content, ContentRef, IndexedOptionArray, RegularArray};
use crate::compute::kernels::list as kernels;
use crate::compute::reducers::Reducer;
use crate::datatypes::{DataType, OffsetSizeTrait};
use crate::error::{handle_kernel_error, JaggedError, Result};
use crate::index::{Index, Index64};

/// A jagged list encoded by offsets: sublist `i` spans
/// `content[offsets[i]..offsets[i + 1])`. Offsets are monotone
/// non-decreasing and need not start at zero.
#[derive(Clone)]
pub struct ListOffsetArray<O: OffsetSizeTrait> {
    offsets: Index<O>,
    content: ContentRef,
}

pub type ListOffsetArray32 = ListOffsetArray<i32>;
pub type ListOffsetArrayU32 = ListOffsetArray<u32>;
pub type ListOffsetArray64 = ListOffsetArray<i64>;

impl<O: OffsetSizeTrait> ListOffsetArray<O> {
    /// Validates the offsets against the content and builds the list.
    pub fn try_new(offsets: Index<O>, content: ContentRef) -> Result<Self> {
        if offsets.is_empty() {
            return Err(JaggedError::StructuralError(format!(
                "in {}: offsets must not be empty",
                Self::static_classname()
            )));
        }
        let array = Self { offsets, content };
        handle_kernel_error(
            kernels::listarray_validity(
                array.starts_slice(),
                array.stops_slice(),
                array.content.len(),
            ),
            array.classname(),
        )?;
        Ok(array)
    }

    pub(crate) fn new_unchecked(offsets: Index<O>, content: ContentRef) -> Self {
        debug_assert!(!offsets.is_empty());
        Self { offsets, content }
    }

    pub fn offsets(&self) -> &Index<O> {
        &self.offsets
    }

    pub fn content(&self) -> ContentRef {
        self.content.clone()
    }

    fn static_classname() -> &'static str {
        match O::DATA_TYPE {
            DataType::Int32 => "ListOffsetArray32",
            DataType::UInt32 => "ListOffsetArrayU32",
            DataType::Int64 => "ListOffsetArray64",
            _ => "ListOffsetArray",
        }
    }

    fn starts_slice(&self) -> &[O] {
        &self.offsets.values()[..self.offsets.len() - 1]
    }

    fn stops_slice(&self) -> &[O] {
        &self.offsets.values()[1..]
    }

    /// The offsets as canonical 64-bit values, avoiding a copy when the
    /// width is already 64-bit.
    fn offsets64(&self) -> Index64 {
        if let Some(offsets) = (&self.offsets as &dyn Any).downcast_ref::<Index64>() {
            offsets.clone()
        } else {
            self.offsets.to_index64()
        }
    }

    /// True when orchestration can run on these offsets directly.
    fn is_canonical(&self) -> bool {
        O::is_large() && self.offsets.get(0).to_i64() == 0
    }

    /// Zero-based 64-bit offsets: the original values when they already
    /// start at zero (or when `start_at_zero` is off), rebasing otherwise.
    pub fn compact_offsets64(&self, start_at_zero: bool) -> Index64 {
        if !start_at_zero || self.offsets.get(0).to_i64() == 0 {
            self.offsets64()
        } else {
            let mut out = vec![0i64; self.offsets.len()];
            kernels::compact_offsets(&mut out, self.offsets.values());
            Index64::from(out)
        }
    }

    /// Carries the content into the element order of zero-based target
    /// `offsets`; every sublist length must agree with the current ones.
    pub fn broadcast_tooffsets64(&self, offsets: &Index64) -> Result<ListOffsetArray64> {
        if offsets.is_empty() || offsets.get(0) != 0 {
            return Err(JaggedError::InvalidArgumentError(
                "broadcast_tooffsets64 can only be used with offsets that start at 0"
                    .to_string(),
            ));
        }
        if offsets.len() > self.offsets.len() {
            return Err(JaggedError::InvalidArgumentError(format!(
                "cannot broadcast {} of length {} to length {}",
                self.classname(),
                self.len(),
                offsets.len() - 1
            )));
        }
        let carrylen = offsets.get(offsets.len() - 1) as usize;
        let mut nextcarry = vec![0i64; carrylen];
        handle_kernel_error(
            kernels::broadcast_tooffsets(
                &mut nextcarry,
                offsets.values(),
                &self.starts_slice()[..offsets.len() - 1],
                &self.stops_slice()[..offsets.len() - 1],
                self.content.len(),
            ),
            self.classname(),
        )?;
        let nextcontent = self.content.carry(&Index64::from(nextcarry))?;
        Ok(ListOffsetArray64::new_unchecked(offsets.clone(), nextcontent))
    }

    /// The canonical form all orchestration runs in: 64-bit offsets,
    /// starting at zero when `start_at_zero` is set. Idempotent.
    pub fn to_list_offset_64(&self, start_at_zero: bool) -> Result<ListOffsetArray64> {
        if O::is_large() && (!start_at_zero || self.offsets.get(0).to_i64() == 0) {
            Ok(ListOffsetArray64::new_unchecked(
                self.offsets64(),
                self.content.clone(),
            ))
        } else {
            self.broadcast_tooffsets64(&self.compact_offsets64(start_at_zero))
        }
    }

    /// Converts to an equal-size list; fails when sublist lengths differ.
    pub fn to_regular(&self) -> Result<RegularArray> {
        let start = self.offsets.get(0).to_usize();
        let stop = self.offsets.get(self.offsets.len() - 1).to_usize();
        let content = self.content.getitem_range_nowrap(start, stop);
        let size = handle_kernel_error_value(
            kernels::to_regular_size(self.offsets.values()),
            self.classname(),
        )?;
        Ok(RegularArray::with_length(content, size as usize, self.len()))
    }
}

fn handle_kernel_error_value<T>(
    result: std::result::Result<T, crate::error::KernelError>,
    classname: &str,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            handle_kernel_error(Err(err), classname)?;
            unreachable!()
        }
    }
}

impl<O: OffsetSizeTrait> fmt::Debug for ListOffsetArray<O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{:?} -> {:?}",
            self.classname(),
            self.offsets.values(),
            self.content
        )
    }
}

impl<O: OffsetSizeTrait> Content for ListOffsetArray<O> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        Self::static_classname()
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn purelist_depth(&self) -> i64 {
        self.content.purelist_depth() + 1
    }

    fn branch_depth(&self) -> (bool, i64) {
        let (branches, depth) = self.content.branch_depth();
        (branches, depth + 1)
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let offsets = self.offsets.values();
        let mut starts = Vec::with_capacity(index.len());
        let mut stops = Vec::with_capacity(index.len());
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= self.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            starts.push(offsets[position as usize].to_i64());
            stops.push(offsets[position as usize + 1].to_i64());
        }
        Ok(Arc::new(ListArray::new_unchecked(
            Index64::from(starts),
            Index64::from(stops),
            self.content.clone(),
        )))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.len());
        Arc::new(Self {
            offsets: self.offsets.slice(start, stop - start + 1),
            content: self.content.clone(),
        })
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        if let Err(err) = kernels::listarray_validity(
            self.starts_slice(),
            self.stops_slice(),
            self.content.len(),
        ) {
            return Some(format!(
                "at {} ({}): {} at i={}",
                path,
                self.classname(),
                err.message,
                err.index
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
        if !self.is_canonical() {
            return self.to_list_offset_64(true)?.reduce_next(
                reducer, negaxis, starts, parents, outlength, mask, keepdims,
            );
        }
        let offsets = self.offsets64();
        let (branches, depth) = self.branch_depth();

        if !branches && negaxis == depth {
            // this level is the target axis: reduce across sublists grouped
            // by outer parent
            if self.len() != parents.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: offsets length - 1 ({}) does not match parents length ({})",
                    self.classname(),
                    self.len(),
                    parents.len()
                )));
            }
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let nextlen = (globalstop - globalstart) as usize;

            let mut offsetscopy = vec![0i64; offsets.len()];
            let maxcount =
                kernels::nonlocal_maxcount_offsetscopy(&mut offsetscopy, offsets.values());

            let distinctslen = maxcount
                .checked_mul(outlength as i64)
                .filter(|len| *len <= isize::MAX as i64)
                .ok_or_else(|| {
                    JaggedError::StructuralError(format!(
                        "in {}: array too large",
                        self.classname()
                    ))
                })?;

            let mut nextcarry = vec![0i64; nextlen];
            let mut nextparents = vec![0i64; nextlen];
            let mut distincts = vec![0i64; distinctslen as usize];
            let maxnextparents = kernels::nonlocal_preparenext(
                &mut nextcarry,
                &mut nextparents,
                &mut distincts,
                &mut offsetscopy,
                offsets.values(),
                parents.values(),
                maxcount,
            );

            let mut nextstarts = vec![0i64; maxnextparents as usize + 1];
            kernels::nonlocal_nextstarts(&mut nextstarts, &nextparents);

            let nextcontent = self.content.carry(&Index64::from(nextcarry))?;
            let outcontent = nextcontent.reduce_next(
                reducer,
                negaxis - 1,
                &Index64::from(nextstarts),
                &Index64::from(nextparents),
                maxnextparents as usize + 1,
                mask,
                false,
            )?;

            let mut gaps = vec![0i64; outlength];
            kernels::nonlocal_findgaps(&mut gaps, parents.values());

            let mut outstarts = vec![0i64; outlength];
            let mut outstops = vec![0i64; outlength];
            kernels::nonlocal_outstartsstops(
                &mut outstarts,
                &mut outstops,
                &distincts,
                &gaps,
                maxcount,
            );

            let mut out: ContentRef = Arc::new(ListArray::new_unchecked(
                Index64::from(outstarts),
                Index64::from(outstops),
                outcontent,
            ));
            if keepdims {
                out = Arc::new(RegularArray::new(out, 1));
            }
            Ok(out)
        } else {
            // the target axis is deeper: reduce each sublist independently
            // and keep this level's structure
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let mut nextparents = vec![0i64; (globalstop - globalstart) as usize];
            kernels::local_nextparents(&mut nextparents, offsets.values());

            let trimmed = self
                .content
                .getitem_range_nowrap(globalstart as usize, globalstop as usize);
            let outcontent = trimmed.reduce_next(
                reducer,
                negaxis,
                &offsets.slice(0, self.len()),
                &Index64::from(nextparents),
                self.len(),
                mask,
                keepdims,
            )?;

            let mut outoffsets = vec![0i64; outlength + 1];
            kernels::local_outoffsets(&mut outoffsets, parents.values());
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                Index64::from(outoffsets),
                outcontent,
            )))
        }
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
        if !self.is_canonical() {
            return self.to_list_offset_64(true)?.sort_next(
                negaxis, starts, parents, outlength, ascending, stable, keepdims,
            );
        }
        let offsets = self.offsets64();
        let (branches, depth) = self.branch_depth();

        if !branches && negaxis == depth {
            if self.len() != parents.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: offsets length - 1 ({}) does not match parents length ({})",
                    self.classname(),
                    self.len(),
                    parents.len()
                )));
            }
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let nextlen = (globalstop - globalstart) as usize;

            let mut offsetscopy = vec![0i64; offsets.len()];
            let maxcount =
                kernels::nonlocal_maxcount_offsetscopy(&mut offsetscopy, offsets.values());

            let distinctslen = maxcount
                .checked_mul(outlength as i64)
                .filter(|len| *len <= isize::MAX as i64)
                .ok_or_else(|| {
                    JaggedError::StructuralError(format!(
                        "in {}: array too large",
                        self.classname()
                    ))
                })?;

            let mut nextcarry = vec![0i64; nextlen];
            let mut nextparents = vec![0i64; nextlen];
            let mut distincts = vec![0i64; distinctslen as usize];
            let maxnextparents = kernels::nonlocal_preparenext(
                &mut nextcarry,
                &mut nextparents,
                &mut distincts,
                &mut offsetscopy,
                offsets.values(),
                parents.values(),
                maxcount,
            );

            let mut nextstarts = vec![0i64; maxnextparents as usize + 1];
            kernels::nonlocal_nextstarts(&mut nextstarts, &nextparents);

            let nextcontent = self.content.carry(&Index64::from(nextcarry.clone()))?;
            let outcontent = nextcontent.sort_next(
                negaxis - 1,
                &Index64::from(nextstarts),
                &Index64::from(nextparents),
                nextcontent.len(),
                ascending,
                stable,
                false,
            )?;

            let mut outcarry = vec![0i64; nextlen];
            kernels::local_preparenext(&mut outcarry, &nextcarry);
            let outcontent = outcontent.carry(&Index64::from(outcarry))?;

            let mut out: ContentRef = Arc::new(ListOffsetArray64::new_unchecked(
                offsets, outcontent,
            ));
            if keepdims {
                let length = out.len();
                out = Arc::new(RegularArray::new(out, length));
            }
            Ok(out)
        } else {
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let mut nextparents = vec![0i64; (globalstop - globalstart) as usize];
            kernels::local_nextparents(&mut nextparents, offsets.values());

            let trimmed = self
                .content
                .getitem_range_nowrap(globalstart as usize, globalstop as usize);
            let outcontent = trimmed.sort_next(
                negaxis,
                &offsets.slice(0, self.len()),
                &Index64::from(nextparents),
                self.len(),
                ascending,
                stable,
                false,
            )?;

            let mut out: ContentRef = Arc::new(ListOffsetArray64::new_unchecked(
                offsets, outcontent,
            ));
            if keepdims {
                let length = out.len();
                out = Arc::new(RegularArray::new(out, length));
            }
            Ok(out)
        }
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
        if !self.is_canonical() {
            return self.to_list_offset_64(true)?.argsort_next(
                negaxis, starts, parents, outlength, ascending, stable, keepdims,
            );
        }
        let offsets = self.offsets64();
        let (branches, depth) = self.branch_depth();

        if !branches && negaxis == depth {
            if self.len() != parents.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: offsets length - 1 ({}) does not match parents length ({})",
                    self.classname(),
                    self.len(),
                    parents.len()
                )));
            }
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let nextlen = (globalstop - globalstart) as usize;

            let mut offsetscopy = vec![0i64; offsets.len()];
            let maxcount =
                kernels::nonlocal_maxcount_offsetscopy(&mut offsetscopy, offsets.values());

            let distinctslen = maxcount
                .checked_mul(outlength as i64)
                .filter(|len| *len <= isize::MAX as i64)
                .ok_or_else(|| {
                    JaggedError::StructuralError(format!(
                        "in {}: array too large",
                        self.classname()
                    ))
                })?;

            let mut nextcarry = vec![0i64; nextlen];
            let mut nextparents = vec![0i64; nextlen];
            let mut distincts = vec![0i64; distinctslen as usize];
            let maxnextparents = kernels::nonlocal_preparenext(
                &mut nextcarry,
                &mut nextparents,
                &mut distincts,
                &mut offsetscopy,
                offsets.values(),
                parents.values(),
                maxcount,
            );

            let mut nextstarts = vec![0i64; maxnextparents as usize + 1];
            kernels::nonlocal_nextstarts(&mut nextstarts, &nextparents);

            let nextcontent = self.content.carry(&Index64::from(nextcarry.clone()))?;
            let outcontent = nextcontent.argsort_next(
                negaxis - 1,
                &Index64::from(nextstarts),
                &Index64::from(nextparents),
                maxnextparents as usize + 1,
                ascending,
                stable,
                false,
            )?;

            let mut outcarry = vec![0i64; nextlen];
            kernels::local_preparenext(&mut outcarry, &nextcarry);
            let outcontent = outcontent.carry(&Index64::from(outcarry))?;

            let mut out: ContentRef = Arc::new(ListOffsetArray64::new_unchecked(
                offsets, outcontent,
            ));
            if keepdims {
                let length = out.len();
                out = Arc::new(RegularArray::new(out, length));
            }
            Ok(out)
        } else {
            let (globalstart, globalstop) = kernels::global_startstop(offsets.values());
            let mut nextparents = vec![0i64; (globalstop - globalstart) as usize];
            kernels::local_nextparents(&mut nextparents, offsets.values());

            let trimmed = self
                .content
                .getitem_range_nowrap(globalstart as usize, globalstop as usize);
            let outcontent = trimmed.argsort_next(
                negaxis,
                &offsets.slice(0, self.len()),
                &Index64::from(nextparents),
                self.len(),
                ascending,
                stable,
                false,
            )?;

            let mut out: ContentRef = Arc::new(ListOffsetArray64::new_unchecked(
                offsets, outcontent,
            ));
            if keepdims {
                let length = out.len();
                out = Arc::new(RegularArray::new(out, length));
            }
            Ok(out)
        }
    }

    fn num(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            Ok(Arc::new(super::Int64Array::from(vec![self.len() as i64])))
        } else if axis == depth + 1 {
            let mut tonum = vec![0i64; self.len()];
            kernels::listarray_num(&mut tonum, self.starts_slice(), self.stops_slice());
            Ok(Arc::new(super::Int64Array::from(tonum)))
        } else {
            let compact = self.to_list_offset_64(true)?;
            let next = compact.content.num(axis, depth + 1)?;
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                compact.offsets64(),
                next,
            )))
        }
    }

    fn offsets_and_flattened(&self, axis: i64, depth: i64) -> Result<(Index64, ContentRef)> {
        if axis == depth {
            Err(JaggedError::InvalidArgumentError(
                "axis=0 not allowed for flatten".to_string(),
            ))
        } else if axis == depth + 1 {
            let compact = self.to_list_offset_64(true)?;
            let offsets = compact.offsets64();
            Ok((offsets, compact.content()))
        } else {
            let (inneroffsets, flattened) =
                self.content.offsets_and_flattened(axis, depth + 1)?;
            if inneroffsets.is_empty() {
                Ok((
                    Index64::from(Vec::new()),
                    Arc::new(Self {
                        offsets: self.offsets.clone(),
                        content: flattened,
                    }),
                ))
            } else {
                let mut tooffsets = vec![0i64; self.offsets.len()];
                handle_kernel_error(
                    kernels::flatten_offsets(
                        &mut tooffsets,
                        self.offsets.values(),
                        inneroffsets.values(),
                    ),
                    self.classname(),
                )?;
                Ok((
                    Index64::from(Vec::new()),
                    Arc::new(ListOffsetArray64::new_unchecked(
                        Index64::from(tooffsets),
                        flattened,
                    )),
                ))
            }
        }
    }

    fn rpad(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            rpad_axis0(Arc::new(self.clone()), target, false)
        } else if axis == depth + 1 {
            let mut tooffsets = vec![0i64; self.offsets.len()];
            let tolength =
                kernels::rpad_length_axis1(&mut tooffsets, self.offsets.values(), target);

            let mut outindex = vec![0i64; tolength as usize];
            kernels::rpad_axis1(&mut outindex, self.offsets.values(), target);

            let next = IndexedOptionArray::try_new(
                Index64::from(outindex),
                self.content.clone(),
            )?
            .simplify()?;
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                Index64::from(tooffsets),
                next,
            )))
        } else {
            Ok(Arc::new(Self {
                offsets: self.offsets.clone(),
                content: self.content.rpad(target, axis, depth + 1)?,
            }))
        }
    }

    fn rpad_and_clip(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            rpad_axis0(Arc::new(self.clone()), target, true)
        } else if axis == depth + 1 {
            let mut outindex = vec![0i64; target * self.len()];
            kernels::rpad_and_clip_axis1(&mut outindex, self.offsets.values(), target);

            let next = IndexedOptionArray::try_new(
                Index64::from(outindex),
                self.content.clone(),
            )?
            .simplify()?;
            Ok(Arc::new(RegularArray::with_length(next, target, self.len())))
        } else {
            Ok(Arc::new(Self {
                offsets: self.offsets.clone(),
                content: self.content.rpad_and_clip(target, axis, depth + 1)?,
            }))
        }
    }

    fn combinations(
        &self,
        n: usize,
        replacement: bool,
        axis: i64,
        depth: i64,
    ) -> Result<ContentRef> {
        if n < 1 {
            return Err(JaggedError::InvalidArgumentError(
                "in combinations, 'n' must be at least 1".to_string(),
            ));
        }
        if axis == depth {
            combinations_axis0(Arc::new(self.clone()), n, replacement)
        } else if axis == depth + 1 {
            let mut tooffsets = vec![0i64; self.offsets.len()];
            let total = kernels::combinations_length(
                &mut tooffsets,
                self.starts_slice(),
                self.stops_slice(),
                n,
                replacement,
            );

            let mut carries = vec![vec![0i64; total as usize]; n];
            {
                let mut tocarry: Vec<&mut [i64]> =
                    carries.iter_mut().map(|buffer| buffer.as_mut_slice()).collect();
                kernels::combinations(
                    &mut tocarry,
                    self.starts_slice(),
                    self.stops_slice(),
                    n,
                    replacement,
                );
            }

            let mut fields = Vec::with_capacity(n);
            for carry in carries {
                fields.push(self.content.carry(&Index64::from(carry))?);
            }
            let record = super::RecordArray::try_new(fields, total as usize)?;
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                Index64::from(tooffsets),
                Arc::new(record),
            )))
        } else {
            let compact = self.to_list_offset_64(true)?;
            let next = compact
                .content
                .combinations(n, replacement, axis, depth + 1)?;
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                compact.offsets64(),
                next,
            )))
        }
    }

    fn local_index(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            Ok(Arc::new(super::Int64Array::from(
                (0..self.len() as i64).collect::<Vec<i64>>(),
            )))
        } else if axis == depth + 1 {
            let offsets = self.compact_offsets64(true);
            let innerlength = offsets.get(offsets.len() - 1) as usize;
            let mut localindex = vec![0i64; innerlength];
            kernels::local_index(&mut localindex, offsets.values());
            Ok(Arc::new(ListOffsetArray64::new_unchecked(
                offsets,
                Arc::new(super::Int64Array::from(localindex)),
            )))
        } else {
            Ok(Arc::new(Self {
                offsets: self.offsets.clone(),
                content: self.content.local_index(axis, depth + 1)?,
            }))
        }
    }
}

/// A jagged list encoded by independent starts/stops vectors; the output
/// form of non-local reductions, whose sublists select disjoint runs of the
/// reduced content. Orchestration converts it to the canonical
/// [`ListOffsetArray64`] on entry.
#[derive(Clone)]
pub struct ListArray {
    starts: Index64,
    stops: Index64,
    content: ContentRef,
}

impl ListArray {
    pub fn try_new(starts: Index64, stops: Index64, content: ContentRef) -> Result<Self> {
        if starts.len() != stops.len() {
            return Err(JaggedError::StructuralError(format!(
                "in ListArray64: starts length ({}) does not match stops length ({})",
                starts.len(),
                stops.len()
            )));
        }
        let array = Self {
            starts,
            stops,
            content,
        };
        handle_kernel_error(
            kernels::listarray_validity(
                array.starts.values(),
                array.stops.values(),
                array.content.len(),
            ),
            array.classname(),
        )?;
        Ok(array)
    }

    pub(crate) fn new_unchecked(starts: Index64, stops: Index64, content: ContentRef) -> Self {
        debug_assert_eq!(starts.len(), stops.len());
        Self {
            starts,
            stops,
            content,
        }
    }

    pub fn starts(&self) -> &Index64 {
        &self.starts
    }

    pub fn stops(&self) -> &Index64 {
        &self.stops
    }

    pub fn content(&self) -> ContentRef {
        self.content.clone()
    }

    /// Zero-based offsets accumulating this list's sublist lengths.
    pub fn compact_offsets64(&self) -> Index64 {
        let mut out = vec![0i64; self.starts.len() + 1];
        for i in 0..self.starts.len() {
            out[i + 1] = out[i] + (self.stops.get(i) - self.starts.get(i));
        }
        Index64::from(out)
    }

    /// Converts to the canonical offset-encoded form, carrying the content
    /// into contiguous order.
    pub fn to_list_offset_64(&self) -> Result<ListOffsetArray64> {
        let offsets = self.compact_offsets64();
        let carrylen = offsets.get(offsets.len() - 1) as usize;
        let mut nextcarry = vec![0i64; carrylen];
        handle_kernel_error(
            kernels::broadcast_tooffsets(
                &mut nextcarry,
                offsets.values(),
                self.starts.values(),
                self.stops.values(),
                self.content.len(),
            ),
            self.classname(),
        )?;
        let nextcontent = self.content.carry(&Index64::from(nextcarry))?;
        Ok(ListOffsetArray64::new_unchecked(offsets, nextcontent))
    }
}

impl fmt::Debug for ListArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ListArray64[{:?}, {:?}] -> {:?}",
            self.starts.values(),
            self.stops.values(),
            self.content
        )
    }
}

impl Content for ListArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        "ListArray64"
    }

    fn len(&self) -> usize {
        self.starts.len()
    }

    fn purelist_depth(&self) -> i64 {
        self.content.purelist_depth() + 1
    }

    fn branch_depth(&self) -> (bool, i64) {
        let (branches, depth) = self.content.branch_depth();
        (branches, depth + 1)
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let mut starts = Vec::with_capacity(index.len());
        let mut stops = Vec::with_capacity(index.len());
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= self.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            starts.push(self.starts.get(position as usize));
            stops.push(self.stops.get(position as usize));
        }
        Ok(Arc::new(Self::new_unchecked(
            Index64::from(starts),
            Index64::from(stops),
            self.content.clone(),
        )))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.len());
        Arc::new(Self {
            starts: self.starts.slice(start, stop - start),
            stops: self.stops.slice(start, stop - start),
            content: self.content.clone(),
        })
    }

    fn validity_error(&self, path: &str) -> Option<String> {
        if let Err(err) = kernels::listarray_validity(
            self.starts.values(),
            self.stops.values(),
            self.content.len(),
        ) {
            return Some(format!(
                "at {} ({}): {} at i={}",
                path,
                self.classname(),
                err.message,
                err.index
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
        self.to_list_offset_64()?
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
        self.to_list_offset_64()?.sort_next(
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
        self.to_list_offset_64()?.argsort_next(
            negaxis, starts, parents, outlength, ascending, stable, keepdims,
        )
    }

    fn num(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            Ok(Arc::new(super::Int64Array::from(vec![self.len() as i64])))
        } else if axis == depth + 1 {
            let mut tonum = vec![0i64; self.len()];
            kernels::listarray_num(&mut tonum, self.starts.values(), self.stops.values());
            Ok(Arc::new(super::Int64Array::from(tonum)))
        } else {
            self.to_list_offset_64()?.num(axis, depth)
        }
    }

    fn offsets_and_flattened(&self, axis: i64, depth: i64) -> Result<(Index64, ContentRef)> {
        self.to_list_offset_64()?.offsets_and_flattened(axis, depth)
    }

    fn rpad(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64()?.rpad(target, axis, depth)
    }

    fn rpad_and_clip(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64()?.rpad_and_clip(target, axis, depth)
    }

    fn combinations(
        &self,
        n: usize,
        replacement: bool,
        axis: i64,
        depth: i64,
    ) -> Result<ContentRef> {
        self.to_list_offset_64()?
            .combinations(n, replacement, axis, depth)
    }

    fn local_index(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        self.to_list_offset_64()?.local_index(axis, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Int64Array;
    use crate::index::Index32;

    fn leaf(values: Vec<i64>) -> ContentRef {
        Arc::new(Int64Array::from(values))
    }

    #[test]
    fn test_try_new_validates_offsets() {
        let content = leaf(vec![1, 2, 3]);
        assert!(
            ListOffsetArray64::try_new(Index64::from(vec![0, 2, 3]), content.clone()).is_ok()
        );

        let err = ListOffsetArray64::try_new(Index64::from(vec![0, 2, 1]), content.clone())
            .unwrap_err();
        assert_eq!(
            err,
            JaggedError::StructuralError(
                "in ListOffsetArray64: start[i] > stop[i] at i=1".to_string()
            )
        );

        assert!(
            ListOffsetArray64::try_new(Index64::from(vec![0, 2, 4]), content.clone()).is_err()
        );
        assert!(ListOffsetArray64::try_new(Index64::from(Vec::new()), content).is_err());
    }

    #[test]
    fn test_to_list_offset_64_is_idempotent() {
        let array =
            ListOffsetArray::<i32>::try_new(Index32::from(vec![2, 4, 4, 7]), leaf(vec![9, 9, 1, 2, 3, 4, 5])).unwrap();
        let canonical = array.to_list_offset_64(true).unwrap();
        assert_eq!(canonical.offsets().values(), &[0, 2, 2, 5]);
        let inner = canonical.content();
        let inner = inner.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(inner.values(), &[1, 2, 3, 4, 5]);

        let again = canonical.to_list_offset_64(true).unwrap();
        assert_eq!(again.offsets().values(), canonical.offsets().values());
    }

    #[test]
    fn test_broadcast_rejects_nonzero_start() {
        let array =
            ListOffsetArray64::try_new(Index64::from(vec![0, 2, 3]), leaf(vec![1, 2, 3])).unwrap();
        assert!(array
            .broadcast_tooffsets64(&Index64::from(vec![1, 3, 4]))
            .is_err());
    }

    #[test]
    fn test_to_regular_requires_equal_sizes() {
        let regular =
            ListOffsetArray64::try_new(Index64::from(vec![0, 2, 4]), leaf(vec![1, 2, 3, 4]))
                .unwrap()
                .to_regular()
                .unwrap();
        assert_eq!(regular.size(), 2);
        assert_eq!(regular.len(), 2);

        let jagged =
            ListOffsetArray64::try_new(Index64::from(vec![0, 1, 4]), leaf(vec![1, 2, 3, 4]))
                .unwrap();
        assert!(jagged.to_regular().is_err());
    }

    #[test]
    fn test_carry_produces_list_array() {
        let array =
            ListOffsetArray64::try_new(Index64::from(vec![0, 3, 3, 5]), leaf(vec![1, 2, 3, 4, 5]))
                .unwrap();
        let carried = array.carry(&Index64::from(vec![2, 0])).unwrap();
        let carried = carried.as_any().downcast_ref::<ListArray>().unwrap();
        assert_eq!(carried.starts().values(), &[3, 0]);
        assert_eq!(carried.stops().values(), &[5, 3]);

        assert!(array.carry(&Index64::from(vec![3])).is_err());
    }

    #[test]
    fn test_list_array_round_trip() {
        let list = ListArray::try_new(
            Index64::from(vec![3, 0]),
            Index64::from(vec![5, 2]),
            leaf(vec![1, 2, 3, 4, 5]),
        )
        .unwrap();
        let as_offsets = list.to_list_offset_64().unwrap();
        assert_eq!(as_offsets.offsets().values(), &[0, 2, 4]);
        let inner = as_offsets.content();
        let inner = inner.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(inner.values(), &[4, 5, 1, 2]);
    }

    #[test]
    fn test_validity_error_names_path_and_index() {
        let array = ListOffsetArray64::new_unchecked(
            Index64::from(vec![0, 2, 5]),
            leaf(vec![1, 2, 3]),
        );
        let error = array.validity_error("layout").unwrap();
        assert_eq!(
            error,
            "at layout (ListOffsetArray64): stop[i] > len(content) at i=1"
        );
    }

    #[test]
    fn test_getitem_range_shares_offsets() {
        let array =
            ListOffsetArray64::try_new(Index64::from(vec![0, 3, 3, 5]), leaf(vec![1, 2, 3, 4, 5]))
                .unwrap();
        let tail = array.getitem_range_nowrap(1, 3);
        let tail = tail.as_any().downcast_ref::<ListOffsetArray64>().unwrap();
        assert_eq!(tail.offsets().values(), &[3, 3, 5]);
        assert_eq!(tail.len(), 2);
    }
}
