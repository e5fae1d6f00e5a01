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

//! Defines the reducer family and its element-type dispatch.
//!
//! A [`Reducer`] turns a leaf's flat values, grouped by a `parents` vector,
//! into one accumulator per output group. The orchestration in
//! [`crate::array`] is reducer-agnostic; everything type-specific happens
//! here, where each reducer matches on the tagged
//! [`PrimitiveValues`](crate::datatypes::PrimitiveValues) view and hands a
//! monomorphic kernel the typed slices.

use std::fmt;
use std::sync::Arc;

use num::cast::AsPrimitive;

use crate::array::{ContentRef, PrimitiveArray};
use crate::compute::kernels::reduce;
use crate::datatypes::{DataType, NativeType, NumericNative, PrimitiveValues};
use crate::error::{JaggedError, Result};

/// A segmented reduction: identity, combining operation, and accumulator
/// type selection.
pub trait Reducer: fmt::Debug + Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &'static str;

    /// Accumulator element type this reducer produces for the given input
    /// type.
    fn return_dtype(&self, dtype: DataType) -> Result<DataType>;

    /// True when results are positions relative to group starts
    /// (argmin/argmax). Such reducers cannot pass through an indirection
    /// layer, which filters the window the positions refer to.
    fn returns_positions(&self) -> bool {
        false
    }

    /// Reduces `values` grouped by `parents` into `outlength` accumulators.
    /// `starts[j]` is the window position of group `j`'s first element
    /// (consumed by the positional reducers).
    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef>;
}

fn boolean_unsupported(name: &'static str) -> JaggedError {
    JaggedError::ComputeError(format!("{} is not defined for Boolean arrays", name))
}

/// Number of elements per group.
#[derive(Debug, Clone, Copy)]
pub struct Count;

impl Reducer for Count {
    fn name(&self) -> &'static str {
        "count"
    }

    fn return_dtype(&self, _dtype: DataType) -> Result<DataType> {
        Ok(DataType::Int64)
    }

    fn apply(
        &self,
        _values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        let mut out = vec![0i64; outlength];
        reduce::reduce_count(&mut out, parents);
        Ok(Arc::new(PrimitiveArray::from(out)))
    }
}

macro_rules! dispatch_all {
    ($values:expr, $apply:ident, $($args:tt)*) => {
        match $values {
            PrimitiveValues::Boolean(values) => $apply!(values, $($args)*),
            PrimitiveValues::Int8(values) => $apply!(values, $($args)*),
            PrimitiveValues::Int16(values) => $apply!(values, $($args)*),
            PrimitiveValues::Int32(values) => $apply!(values, $($args)*),
            PrimitiveValues::Int64(values) => $apply!(values, $($args)*),
            PrimitiveValues::UInt8(values) => $apply!(values, $($args)*),
            PrimitiveValues::UInt16(values) => $apply!(values, $($args)*),
            PrimitiveValues::UInt32(values) => $apply!(values, $($args)*),
            PrimitiveValues::UInt64(values) => $apply!(values, $($args)*),
            PrimitiveValues::Float32(values) => $apply!(values, $($args)*),
            PrimitiveValues::Float64(values) => $apply!(values, $($args)*),
        }
    };
}

/// Number of nonzero elements per group.
#[derive(Debug, Clone, Copy)]
pub struct CountNonzero;

impl Reducer for CountNonzero {
    fn name(&self) -> &'static str {
        "count_nonzero"
    }

    fn return_dtype(&self, _dtype: DataType) -> Result<DataType> {
        Ok(DataType::Int64)
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        macro_rules! arm {
            ($values:expr, $parents:expr, $outlength:expr) => {{
                let mut out = vec![0i64; $outlength];
                reduce::reduce_countnonzero(&mut out, $values, $parents);
                Ok(Arc::new(PrimitiveArray::from(out)) as ContentRef)
            }};
        }
        dispatch_all!(values, arm, parents, outlength)
    }
}

fn sum_prod_dtype(dtype: DataType) -> DataType {
    match dtype {
        DataType::Boolean => DataType::Boolean,
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => DataType::Int64,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            DataType::UInt64
        }
        DataType::Float32 => DataType::Float32,
        DataType::Float64 => DataType::Float64,
    }
}

fn sum_arm<T, A>(values: &[T], parents: &[i64], outlength: usize) -> Result<ContentRef>
where
    T: NativeType + AsPrimitive<A>,
    A: NumericNative,
{
    let mut out = vec![A::ZERO; outlength];
    reduce::reduce_sum(&mut out, values, parents);
    Ok(Arc::new(PrimitiveArray::from(out)))
}

fn prod_arm<T, A>(values: &[T], parents: &[i64], outlength: usize) -> Result<ContentRef>
where
    T: NativeType + AsPrimitive<A>,
    A: NumericNative,
{
    let mut out = vec![A::ONE; outlength];
    reduce::reduce_prod(&mut out, values, parents);
    Ok(Arc::new(PrimitiveArray::from(out)))
}

/// Per-group sum: integers widen to 64 bits preserving signedness and wrap;
/// floats keep their precision; Boolean reduces by OR.
#[derive(Debug, Clone, Copy)]
pub struct Sum;

impl Reducer for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn return_dtype(&self, dtype: DataType) -> Result<DataType> {
        Ok(sum_prod_dtype(dtype))
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        match values {
            PrimitiveValues::Boolean(values) => {
                let mut out = vec![false; outlength];
                reduce::reduce_sum_bool(&mut out, values, parents);
                Ok(Arc::new(PrimitiveArray::from(out)))
            }
            PrimitiveValues::Int8(values) => sum_arm::<i8, i64>(values, parents, outlength),
            PrimitiveValues::Int16(values) => sum_arm::<i16, i64>(values, parents, outlength),
            PrimitiveValues::Int32(values) => sum_arm::<i32, i64>(values, parents, outlength),
            PrimitiveValues::Int64(values) => sum_arm::<i64, i64>(values, parents, outlength),
            PrimitiveValues::UInt8(values) => sum_arm::<u8, u64>(values, parents, outlength),
            PrimitiveValues::UInt16(values) => sum_arm::<u16, u64>(values, parents, outlength),
            PrimitiveValues::UInt32(values) => sum_arm::<u32, u64>(values, parents, outlength),
            PrimitiveValues::UInt64(values) => sum_arm::<u64, u64>(values, parents, outlength),
            PrimitiveValues::Float32(values) => sum_arm::<f32, f32>(values, parents, outlength),
            PrimitiveValues::Float64(values) => sum_arm::<f64, f64>(values, parents, outlength),
        }
    }
}

/// Per-group product: integers widen to 64 bits and wrap; floats keep their
/// precision; Boolean reduces by AND.
#[derive(Debug, Clone, Copy)]
pub struct Prod;

impl Reducer for Prod {
    fn name(&self) -> &'static str {
        "prod"
    }

    fn return_dtype(&self, dtype: DataType) -> Result<DataType> {
        Ok(sum_prod_dtype(dtype))
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        match values {
            PrimitiveValues::Boolean(values) => {
                let mut out = vec![true; outlength];
                reduce::reduce_prod_bool(&mut out, values, parents);
                Ok(Arc::new(PrimitiveArray::from(out)))
            }
            PrimitiveValues::Int8(values) => prod_arm::<i8, i64>(values, parents, outlength),
            PrimitiveValues::Int16(values) => prod_arm::<i16, i64>(values, parents, outlength),
            PrimitiveValues::Int32(values) => prod_arm::<i32, i64>(values, parents, outlength),
            PrimitiveValues::Int64(values) => prod_arm::<i64, i64>(values, parents, outlength),
            PrimitiveValues::UInt8(values) => prod_arm::<u8, u64>(values, parents, outlength),
            PrimitiveValues::UInt16(values) => prod_arm::<u16, u64>(values, parents, outlength),
            PrimitiveValues::UInt32(values) => prod_arm::<u32, u64>(values, parents, outlength),
            PrimitiveValues::UInt64(values) => prod_arm::<u64, u64>(values, parents, outlength),
            PrimitiveValues::Float32(values) => prod_arm::<f32, f32>(values, parents, outlength),
            PrimitiveValues::Float64(values) => prod_arm::<f64, f64>(values, parents, outlength),
        }
    }
}

fn min_arm<T: NumericNative>(
    values: &[T],
    parents: &[i64],
    outlength: usize,
    initial: Option<f64>,
) -> Result<ContentRef> {
    let identity = match initial {
        Some(value) => T::from_f64(value)?,
        None => T::MIN_IDENTITY,
    };
    let mut out = vec![identity; outlength];
    reduce::reduce_min(&mut out, values, parents, identity);
    Ok(Arc::new(PrimitiveArray::from(out)))
}

fn max_arm<T: NumericNative>(
    values: &[T],
    parents: &[i64],
    outlength: usize,
    initial: Option<f64>,
) -> Result<ContentRef> {
    let identity = match initial {
        Some(value) => T::from_f64(value)?,
        None => T::MAX_IDENTITY,
    };
    let mut out = vec![identity; outlength];
    reduce::reduce_max(&mut out, values, parents, identity);
    Ok(Arc::new(PrimitiveArray::from(out)))
}

macro_rules! dispatch_numeric {
    ($values:expr, $name:expr, $arm:ident, $($args:tt)*) => {
        match $values {
            PrimitiveValues::Boolean(_) => Err(boolean_unsupported($name)),
            PrimitiveValues::Int8(values) => $arm(values, $($args)*),
            PrimitiveValues::Int16(values) => $arm(values, $($args)*),
            PrimitiveValues::Int32(values) => $arm(values, $($args)*),
            PrimitiveValues::Int64(values) => $arm(values, $($args)*),
            PrimitiveValues::UInt8(values) => $arm(values, $($args)*),
            PrimitiveValues::UInt16(values) => $arm(values, $($args)*),
            PrimitiveValues::UInt32(values) => $arm(values, $($args)*),
            PrimitiveValues::UInt64(values) => $arm(values, $($args)*),
            PrimitiveValues::Float32(values) => $arm(values, $($args)*),
            PrimitiveValues::Float64(values) => $arm(values, $($args)*),
        }
    };
}

/// Per-group minimum. The identity defaults to the type maximum (+inf for
/// floats) and may be overridden by `initial`; a NaN never wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min {
    pub initial: Option<f64>,
}

impl Min {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(initial: f64) -> Self {
        Self {
            initial: Some(initial),
        }
    }
}

impl Reducer for Min {
    fn name(&self) -> &'static str {
        "min"
    }

    fn return_dtype(&self, dtype: DataType) -> Result<DataType> {
        match dtype {
            DataType::Boolean => Err(boolean_unsupported(self.name())),
            dtype => Ok(dtype),
        }
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        dispatch_numeric!(values, self.name(), min_arm, parents, outlength, self.initial)
    }
}

/// Per-group maximum. The identity defaults to the type minimum (-inf for
/// floats) and may be overridden by `initial`; a NaN never wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max {
    pub initial: Option<f64>,
}

impl Max {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(initial: f64) -> Self {
        Self {
            initial: Some(initial),
        }
    }
}

impl Reducer for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    fn return_dtype(&self, dtype: DataType) -> Result<DataType> {
        match dtype {
            DataType::Boolean => Err(boolean_unsupported(self.name())),
            dtype => Ok(dtype),
        }
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        _starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        dispatch_numeric!(values, self.name(), max_arm, parents, outlength, self.initial)
    }
}

/// Position of each group's minimum within the enclosing list; empty groups
/// yield the -1 sentinel. Ties break to the earliest position and NaN never
/// wins.
#[derive(Debug, Clone, Copy)]
pub struct ArgMin;

impl Reducer for ArgMin {
    fn name(&self) -> &'static str {
        "argmin"
    }

    fn return_dtype(&self, _dtype: DataType) -> Result<DataType> {
        Ok(DataType::Int64)
    }

    fn returns_positions(&self) -> bool {
        true
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        macro_rules! arm {
            ($values:expr, $starts:expr, $parents:expr, $outlength:expr) => {{
                let mut out = vec![-1i64; $outlength];
                reduce::reduce_argmin(&mut out, $values, $starts, $parents);
                reduce::reduce_adjust_positions(&mut out, $starts);
                Ok(Arc::new(PrimitiveArray::from(out)) as ContentRef)
            }};
        }
        dispatch_all!(values, arm, starts, parents, outlength)
    }
}

/// Position of each group's maximum within the enclosing list; empty groups
/// yield the -1 sentinel.
#[derive(Debug, Clone, Copy)]
pub struct ArgMax;

impl Reducer for ArgMax {
    fn name(&self) -> &'static str {
        "argmax"
    }

    fn return_dtype(&self, _dtype: DataType) -> Result<DataType> {
        Ok(DataType::Int64)
    }

    fn returns_positions(&self) -> bool {
        true
    }

    fn apply(
        &self,
        values: PrimitiveValues<'_>,
        starts: &[i64],
        parents: &[i64],
        outlength: usize,
    ) -> Result<ContentRef> {
        macro_rules! arm {
            ($values:expr, $starts:expr, $parents:expr, $outlength:expr) => {{
                let mut out = vec![-1i64; $outlength];
                reduce::reduce_argmax(&mut out, $values, $starts, $parents);
                reduce::reduce_adjust_positions(&mut out, $starts);
                Ok(Arc::new(PrimitiveArray::from(out)) as ContentRef)
            }};
        }
        dispatch_all!(values, arm, starts, parents, outlength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{BooleanArray, Content, Float64Array, Int64Array, UInt64Array};

    fn as_i64(content: &ContentRef) -> &[i64] {
        content
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap()
            .values()
    }

    #[test]
    fn test_sum_dispatch_widens() {
        let values = [1u8, 2, 250];
        let out = Sum
            .apply(PrimitiveValues::UInt8(&values), &[0], &[0, 0, 0], 1)
            .unwrap();
        let out = out.as_any().downcast_ref::<UInt64Array>().unwrap();
        assert_eq!(out.values(), &[253]);
        assert_eq!(Sum.return_dtype(DataType::UInt8).unwrap(), DataType::UInt64);
        assert_eq!(Sum.return_dtype(DataType::Int16).unwrap(), DataType::Int64);
    }

    #[test]
    fn test_boolean_sum_is_or() {
        let values = [false, true, false];
        let out = Sum
            .apply(PrimitiveValues::Boolean(&values), &[0, 2], &[0, 0, 1], 2)
            .unwrap();
        let out = out.as_any().downcast_ref::<BooleanArray>().unwrap();
        assert_eq!(out.values(), &[true, false]);
    }

    #[test]
    fn test_min_with_initial() {
        let values = [5i64, 3, 9, 2];
        let out = Min::with_initial(i32::MAX as f64)
            .apply(PrimitiveValues::Int64(&values), &[0, 2, 2], &[0, 0, 2, 2], 3)
            .unwrap();
        assert_eq!(as_i64(&out), &[3, i32::MAX as i64, 2]);
    }

    #[test]
    fn test_min_rejects_boolean() {
        let values = [true, false];
        assert!(Min::new()
            .apply(PrimitiveValues::Boolean(&values), &[0], &[0, 0], 1)
            .is_err());
        assert!(Min::new().return_dtype(DataType::Boolean).is_err());
    }

    #[test]
    fn test_argmax_adjusts_to_window_positions() {
        let values = [0.1f64, 0.5, 0.2, f64::NAN, 3.0, 3.0];
        let out = ArgMax
            .apply(
                PrimitiveValues::Float64(&values),
                &[0, 4, 4],
                &[0, 0, 0, 0, 2, 2],
                3,
            )
            .unwrap();
        assert_eq!(as_i64(&out), &[1, -1, 4]);
    }

    #[test]
    fn test_count_ignores_values() {
        let values: [f64; 3] = [1.0, 2.0, 3.0];
        let out = Count
            .apply(PrimitiveValues::Float64(&values), &[0], &[0, 0, 2], 3)
            .unwrap();
        assert_eq!(as_i64(&out), &[2, 0, 1]);
    }

    #[test]
    fn test_float_sum_keeps_precision() {
        let values = [1.5f64, 2.25];
        let out = Sum
            .apply(PrimitiveValues::Float64(&values), &[0], &[0, 0], 1)
            .unwrap();
        let out = out.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(out.values(), &[3.75]);
        assert_eq!(
            Sum.return_dtype(DataType::Float32).unwrap(),
            DataType::Float32
        );
    }
}
