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

use super::{combinations_axis0, rpad_axis0, ByteMaskedArray, Content, ContentRef, RegularArray};
use crate::buffer::Buffer;
use crate::compute::kernels::{reduce, sort};
use crate::compute::reducers::Reducer;
use crate::datatypes::{DataType, NativeType};
use crate::error::{JaggedError, Result};
use crate::index::Index64;

/// The leaf of a nested layout: a window over a flat buffer of primitive
/// values.
#[derive(Clone)]
pub struct PrimitiveArray<T: NativeType> {
    data: Buffer<T>,
    offset: usize,
    length: usize,
}

pub type BooleanArray = PrimitiveArray<bool>;
pub type Int8Array = PrimitiveArray<i8>;
pub type Int16Array = PrimitiveArray<i16>;
pub type Int32Array = PrimitiveArray<i32>;
pub type Int64Array = PrimitiveArray<i64>;
pub type UInt8Array = PrimitiveArray<u8>;
pub type UInt16Array = PrimitiveArray<u16>;
pub type UInt32Array = PrimitiveArray<u32>;
pub type UInt64Array = PrimitiveArray<u64>;
pub type Float32Array = PrimitiveArray<f32>;
pub type Float64Array = PrimitiveArray<f64>;

impl<T: NativeType> PrimitiveArray<T> {
    /// Returns the element type of this array.
    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    /// Returns the values in this array's window as a slice.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.data.as_slice()[self.offset..self.offset + self.length]
    }

    /// Returns the value at index `i` within the window.
    #[inline]
    pub fn value(&self, i: usize) -> T {
        self.values()[i]
    }

    fn sorted_ranges(parents: &Index64) -> Vec<i64> {
        let length = sort::sorting_ranges_length(parents.values());
        let mut ranges = vec![0i64; length];
        if length > 0 {
            sort::sorting_ranges(&mut ranges, parents.values());
        }
        ranges
    }
}

impl<T: NativeType> From<Vec<T>> for PrimitiveArray<T> {
    fn from(values: Vec<T>) -> Self {
        let length = values.len();
        Self {
            data: Buffer::from(values),
            offset: 0,
            length,
        }
    }
}

impl<T: NativeType> fmt::Debug for PrimitiveArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{:?}", self.classname(), self.values())
    }
}

impl<T: NativeType> Content for PrimitiveArray<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn classname(&self) -> &'static str {
        match T::DATA_TYPE {
            DataType::Boolean => "BooleanArray",
            DataType::Int8 => "Int8Array",
            DataType::Int16 => "Int16Array",
            DataType::Int32 => "Int32Array",
            DataType::Int64 => "Int64Array",
            DataType::UInt8 => "UInt8Array",
            DataType::UInt16 => "UInt16Array",
            DataType::UInt32 => "UInt32Array",
            DataType::UInt64 => "UInt64Array",
            DataType::Float32 => "Float32Array",
            DataType::Float64 => "Float64Array",
        }
    }

    fn len(&self) -> usize {
        self.length
    }

    fn purelist_depth(&self) -> i64 {
        1
    }

    fn branch_depth(&self) -> (bool, i64) {
        (false, 1)
    }

    fn carry(&self, index: &Index64) -> Result<ContentRef> {
        let values = self.values();
        let mut out = Vec::with_capacity(index.len());
        for (i, &position) in index.values().iter().enumerate() {
            if position < 0 || position as usize >= values.len() {
                return Err(JaggedError::StructuralError(format!(
                    "in {}: index out of range at i={}",
                    self.classname(),
                    i
                )));
            }
            out.push(values[position as usize]);
        }
        Ok(Arc::new(Self::from(out)))
    }

    fn getitem_range_nowrap(&self, start: usize, stop: usize) -> ContentRef {
        debug_assert!(start <= stop && stop <= self.length);
        Arc::new(Self {
            data: self.data.clone(),
            offset: self.offset + start,
            length: stop - start,
        })
    }

    fn validity_error(&self, _path: &str) -> Option<String> {
        None
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
        if negaxis != 1 {
            return Err(JaggedError::ComputeError(format!(
                "cannot reduce {} at axis {} below the innermost",
                self.classname(),
                negaxis
            )));
        }
        if parents.len() != self.length {
            return Err(JaggedError::StructuralError(format!(
                "in {}: parents length {} does not match array length {}",
                self.classname(),
                parents.len(),
                self.length
            )));
        }

        let mut out = reducer.apply(
            T::as_values(self.values()),
            starts.values(),
            parents.values(),
            outlength,
        )?;

        if mask {
            let mut bytes = vec![0i8; outlength];
            reduce::reduce_mask(&mut bytes, parents.values());
            out = Arc::new(ByteMaskedArray::try_new(Buffer::from(bytes), out, false)?);
        }
        if keepdims {
            out = Arc::new(RegularArray::new(out, 1));
        }
        Ok(out)
    }

    fn sort_next(
        &self,
        _negaxis: i64,
        _starts: &Index64,
        parents: &Index64,
        _outlength: usize,
        ascending: bool,
        stable: bool,
        _keepdims: bool,
    ) -> Result<ContentRef> {
        if parents.len() != self.length {
            return Err(JaggedError::StructuralError(format!(
                "in {}: parents length {} does not match array length {}",
                self.classname(),
                parents.len(),
                self.length
            )));
        }
        let ranges = Self::sorted_ranges(parents);
        let mut values = self.values().to_vec();
        sort::sort_ranges(&mut values, &ranges, ascending, stable);
        Ok(Arc::new(Self::from(values)))
    }

    fn argsort_next(
        &self,
        _negaxis: i64,
        _starts: &Index64,
        parents: &Index64,
        _outlength: usize,
        ascending: bool,
        stable: bool,
        _keepdims: bool,
    ) -> Result<ContentRef> {
        if parents.len() != self.length {
            return Err(JaggedError::StructuralError(format!(
                "in {}: parents length {} does not match array length {}",
                self.classname(),
                parents.len(),
                self.length
            )));
        }
        let ranges = Self::sorted_ranges(parents);
        let mut out = vec![0i64; self.length];
        sort::argsort_ranges(&mut out, self.values(), &ranges, ascending, stable);
        Ok(Arc::new(Int64Array::from(out)))
    }

    fn num(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            Ok(Arc::new(Int64Array::from(vec![self.length as i64])))
        } else {
            Err(JaggedError::InvalidArgumentError(
                "'axis' out of range for 'num'".to_string(),
            ))
        }
    }

    fn offsets_and_flattened(&self, _axis: i64, _depth: i64) -> Result<(Index64, ContentRef)> {
        Err(JaggedError::InvalidArgumentError(format!(
            "{} cannot be flattened",
            self.classname()
        )))
    }

    fn rpad(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            rpad_axis0(Arc::new(self.clone()), target, false)
        } else {
            Err(JaggedError::InvalidArgumentError(
                "'axis' exceeds the depth of this array".to_string(),
            ))
        }
    }

    fn rpad_and_clip(&self, target: usize, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            rpad_axis0(Arc::new(self.clone()), target, true)
        } else {
            Err(JaggedError::InvalidArgumentError(
                "'axis' exceeds the depth of this array".to_string(),
            ))
        }
    }

    fn combinations(
        &self,
        n: usize,
        replacement: bool,
        axis: i64,
        depth: i64,
    ) -> Result<ContentRef> {
        if axis == depth {
            combinations_axis0(Arc::new(self.clone()), n, replacement)
        } else {
            Err(JaggedError::InvalidArgumentError(
                "'axis' exceeds the depth of this array".to_string(),
            ))
        }
    }

    fn local_index(&self, axis: i64, depth: i64) -> Result<ContentRef> {
        if axis == depth {
            Ok(Arc::new(Int64Array::from(
                (0..self.length as i64).collect::<Vec<i64>>(),
            )))
        } else {
            Err(JaggedError::InvalidArgumentError(
                "'axis' exceeds the depth of this array".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::reducers::Sum;

    #[test]
    fn test_values_window() {
        let array = Int64Array::from(vec![1, 2, 3, 4, 5]);
        assert_eq!(array.len(), 5);
        let sliced = array.getitem_range_nowrap(1, 4);
        let sliced = sliced.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(sliced.values(), &[2, 3, 4]);
        assert_eq!(sliced.value(0), 2);
    }

    #[test]
    fn test_carry_gathers_and_checks_bounds() {
        let array = Int64Array::from(vec![10, 20, 30]);
        let carried = array.carry(&Index64::from(vec![2, 0, 2])).unwrap();
        let carried = carried.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(carried.values(), &[30, 10, 30]);

        assert!(array.carry(&Index64::from(vec![3])).is_err());
        assert!(array.carry(&Index64::from(vec![-1])).is_err());
    }

    #[test]
    fn test_leaf_reduce_with_mask() {
        let array = Float64Array::from(vec![1.0, 2.0, 4.0]);
        let out = array
            .reduce_next(
                &Sum,
                1,
                &Index64::from(vec![0, 2]),
                &Index64::from(vec![0, 0, 0]),
                2,
                true,
                false,
            )
            .unwrap();
        let masked = out.as_any().downcast_ref::<ByteMaskedArray>().unwrap();
        assert_eq!(masked.mask(), &[0, 1]);
        let content = masked.content();
        let inner = content
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(inner.values(), &[7.0, 0.0]);
    }

    #[test]
    fn test_leaf_reduce_keepdims_wraps_regular() {
        let array = Int64Array::from(vec![1, 2]);
        let out = array
            .reduce_next(
                &Sum,
                1,
                &Index64::from(vec![0]),
                &Index64::zeros(2),
                1,
                false,
                true,
            )
            .unwrap();
        let regular = out.as_any().downcast_ref::<RegularArray>().unwrap();
        assert_eq!(regular.size(), 1);
        assert_eq!(regular.len(), 1);
    }

    #[test]
    fn test_leaf_sort_and_argsort() {
        let array = Int64Array::from(vec![3, 1, 2, 9, 5]);
        let parents = Index64::from(vec![0, 0, 0, 1, 1]);
        let starts = Index64::from(vec![0, 3]);

        let sorted = array
            .sort_next(1, &starts, &parents, 2, true, true, false)
            .unwrap();
        let sorted = sorted.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(sorted.values(), &[1, 2, 3, 5, 9]);

        let order = array
            .argsort_next(1, &starts, &parents, 2, true, true, false)
            .unwrap();
        let order = order.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(order.values(), &[1, 2, 0, 1, 0]);
    }

    #[test]
    fn test_leaf_num_and_local_index() {
        let array = Int64Array::from(vec![7, 8, 9]);
        let num = array.num(0, 0).unwrap();
        assert_eq!(
            num.as_any().downcast_ref::<Int64Array>().unwrap().values(),
            &[3]
        );
        let local = array.local_index(0, 0).unwrap();
        assert_eq!(
            local.as_any().downcast_ref::<Int64Array>().unwrap().values(),
            &[0, 1, 2]
        );
        assert!(array.num(1, 0).is_err());
    }
}
