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

//! Defines the element types of jagged arrays and the traits connecting them
//! to their native Rust representations.

use std::cmp::Ordering;
use std::fmt;

use num::NumCast;
use serde::{Deserialize, Serialize};

use crate::error::{JaggedError, Result};

/// The primitive element types supported by value buffers.
///
/// Offsets and other integer indices are not described by this enum; they
/// are constrained to the three widths of [`OffsetSizeTrait`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

/// Borrowed leaf values tagged by element type.
///
/// This is the dispatch currency between the dynamically-typed layouts and
/// the monomorphic kernels: a leaf array wraps its value window in the
/// matching variant once, reducers match on it, and the inner loops stay
/// fully typed.
#[derive(Debug, Clone, Copy)]
pub enum PrimitiveValues<'a> {
    Boolean(&'a [bool]),
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
}

impl PrimitiveValues<'_> {
    pub fn data_type(&self) -> DataType {
        match self {
            PrimitiveValues::Boolean(_) => DataType::Boolean,
            PrimitiveValues::Int8(_) => DataType::Int8,
            PrimitiveValues::Int16(_) => DataType::Int16,
            PrimitiveValues::Int32(_) => DataType::Int32,
            PrimitiveValues::Int64(_) => DataType::Int64,
            PrimitiveValues::UInt8(_) => DataType::UInt8,
            PrimitiveValues::UInt16(_) => DataType::UInt16,
            PrimitiveValues::UInt32(_) => DataType::UInt32,
            PrimitiveValues::UInt64(_) => DataType::UInt64,
            PrimitiveValues::Float32(_) => DataType::Float32,
            PrimitiveValues::Float64(_) => DataType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrimitiveValues::Boolean(values) => values.len(),
            PrimitiveValues::Int8(values) => values.len(),
            PrimitiveValues::Int16(values) => values.len(),
            PrimitiveValues::Int32(values) => values.len(),
            PrimitiveValues::Int64(values) => values.len(),
            PrimitiveValues::UInt8(values) => values.len(),
            PrimitiveValues::UInt16(values) => values.len(),
            PrimitiveValues::UInt32(values) => values.len(),
            PrimitiveValues::UInt64(values) => values.len(),
            PrimitiveValues::Float32(values) => values.len(),
            PrimitiveValues::Float64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait bridging [`DataType`] variants to their native Rust types.
///
/// Implemented by exactly the eleven primitive types. `compare` is a total
/// order: integers use `Ord`, floats use IEEE 754 totalOrder so that sorting
/// and extremum tests are deterministic in the presence of NaN.
pub trait NativeType:
    fmt::Debug + fmt::Display + Send + Sync + Copy + PartialOrd + Default + 'static
{
    const DATA_TYPE: DataType;

    /// Wraps a value slice in its [`PrimitiveValues`] variant.
    fn as_values(values: &[Self]) -> PrimitiveValues<'_>;

    /// Whether the value counts as nonzero for `countnonzero` and the
    /// boolean accumulator reducers.
    fn is_nonzero(self) -> bool;

    /// True only for floating-point NaN values.
    #[inline]
    fn is_nan(self) -> bool {
        false
    }

    /// Total-order comparison.
    fn compare(self, other: Self) -> Ordering;

    /// Converts an f64 into this type, for caller-provided reduction
    /// identities. Returns an error if the value does not fit.
    fn from_f64(value: f64) -> Result<Self>;
}

/// Arithmetic surface of the numeric native types (everything but bool):
/// reduction identities and the wrap-around add/mul the sum and prod
/// kernels are defined with. Integers wrap modulo 2^w (two's complement
/// when signed); floats follow IEEE 754.
pub trait NumericNative: NativeType {
    const ZERO: Self;
    const ONE: Self;
    /// Identity of the min reduction: the type maximum, +inf for floats.
    const MIN_IDENTITY: Self;
    /// Identity of the max reduction: the type minimum, -inf for floats.
    const MAX_IDENTITY: Self;

    fn add_wrap(self, rhs: Self) -> Self;
    fn mul_wrap(self, rhs: Self) -> Self;
}

macro_rules! native_int {
    ($native_ty:ty, $data_ty:expr, $variant:ident) => {
        impl NativeType for $native_ty {
            const DATA_TYPE: DataType = $data_ty;

            #[inline]
            fn as_values(values: &[Self]) -> PrimitiveValues<'_> {
                PrimitiveValues::$variant(values)
            }

            #[inline]
            fn is_nonzero(self) -> bool {
                self != 0
            }

            #[inline]
            fn compare(self, other: Self) -> Ordering {
                self.cmp(&other)
            }

            fn from_f64(value: f64) -> Result<Self> {
                NumCast::from(value).ok_or_else(|| {
                    JaggedError::InvalidArgumentError(format!(
                        "identity {} does not fit in {:?}",
                        value,
                        Self::DATA_TYPE
                    ))
                })
            }
        }

        impl NumericNative for $native_ty {
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN_IDENTITY: Self = <$native_ty>::MAX;
            const MAX_IDENTITY: Self = <$native_ty>::MIN;

            #[inline]
            fn add_wrap(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline]
            fn mul_wrap(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }
        }
    };
}

native_int!(i8, DataType::Int8, Int8);
native_int!(i16, DataType::Int16, Int16);
native_int!(i32, DataType::Int32, Int32);
native_int!(i64, DataType::Int64, Int64);
native_int!(u8, DataType::UInt8, UInt8);
native_int!(u16, DataType::UInt16, UInt16);
native_int!(u32, DataType::UInt32, UInt32);
native_int!(u64, DataType::UInt64, UInt64);

macro_rules! native_float {
    ($native_ty:ty, $data_ty:expr, $variant:ident, $bits_ty:ty, $unsigned_ty:ty, $shift:expr) => {
        impl NativeType for $native_ty {
            const DATA_TYPE: DataType = $data_ty;

            #[inline]
            fn as_values(values: &[Self]) -> PrimitiveValues<'_> {
                PrimitiveValues::$variant(values)
            }

            #[inline]
            fn is_nonzero(self) -> bool {
                self != 0.0
            }

            #[inline]
            fn is_nan(self) -> bool {
                self.is_nan()
            }

            // IEEE 754 totalOrder via the sign-magnitude bit trick
            #[inline]
            fn compare(self, other: Self) -> Ordering {
                let mut left = self.to_bits() as $bits_ty;
                let mut right = other.to_bits() as $bits_ty;
                left ^= (((left >> $shift) as $unsigned_ty) >> 1) as $bits_ty;
                right ^= (((right >> $shift) as $unsigned_ty) >> 1) as $bits_ty;
                left.cmp(&right)
            }

            fn from_f64(value: f64) -> Result<Self> {
                Ok(value as $native_ty)
            }
        }

        impl NumericNative for $native_ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MIN_IDENTITY: Self = <$native_ty>::INFINITY;
            const MAX_IDENTITY: Self = <$native_ty>::NEG_INFINITY;

            #[inline]
            fn add_wrap(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn mul_wrap(self, rhs: Self) -> Self {
                self * rhs
            }
        }
    };
}

native_float!(f32, DataType::Float32, Float32, i32, u32, 31);
native_float!(f64, DataType::Float64, Float64, i64, u64, 63);

impl NativeType for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    #[inline]
    fn as_values(values: &[Self]) -> PrimitiveValues<'_> {
        PrimitiveValues::Boolean(values)
    }

    #[inline]
    fn is_nonzero(self) -> bool {
        self
    }

    #[inline]
    fn compare(self, other: Self) -> Ordering {
        self.cmp(&other)
    }

    fn from_f64(value: f64) -> Result<Self> {
        Ok(value != 0.0)
    }
}

/// Trait declaring an offset width, relevant for i32 vs u32 vs i64 index
/// views and list offsets. Every width converts losslessly into i64, the
/// canonical form all orchestration runs in.
pub trait OffsetSizeTrait: NativeType {
    /// True only for the canonical 64-bit signed width.
    fn is_large() -> bool;

    fn to_i64(self) -> i64;

    /// Narrows an i64 back into this width; fails when the value does not
    /// fit (including negatives into u32).
    fn from_i64(value: i64) -> Result<Self>;

    fn to_usize(self) -> usize {
        self.to_i64() as usize
    }
}

macro_rules! offset_size {
    ($native_ty:ty, $is_large:expr) => {
        impl OffsetSizeTrait for $native_ty {
            #[inline]
            fn is_large() -> bool {
                $is_large
            }

            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            fn from_i64(value: i64) -> Result<Self> {
                NumCast::from(value).ok_or_else(|| {
                    JaggedError::InvalidArgumentError(format!(
                        "offset {} does not fit in {:?}",
                        value,
                        Self::DATA_TYPE
                    ))
                })
            }
        }
    };
}

offset_size!(i32, false);
offset_size!(u32, false);
offset_size!(i64, true);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_json_round_trip() {
        for dtype in [
            DataType::Boolean,
            DataType::Int8,
            DataType::UInt32,
            DataType::Float64,
        ]
        .iter()
        {
            let json = serde_json::to_string(dtype).unwrap();
            let back: DataType = serde_json::from_str(&json).unwrap();
            assert_eq!(*dtype, back);
        }
        assert_eq!(serde_json::to_string(&DataType::Int64).unwrap(), "\"Int64\"");
    }

    #[test]
    fn test_float_total_order() {
        assert_eq!(1.0f64.compare(2.0), Ordering::Less);
        assert_eq!(f64::NAN.compare(f64::INFINITY), Ordering::Greater);
        assert_eq!((-0.0f64).compare(0.0), Ordering::Less);
        assert_eq!(f32::NEG_INFINITY.compare(-1.0), Ordering::Less);
        assert_eq!((-2.0f32).compare(-1.0), Ordering::Less);
        assert_eq!((-1.0f64).compare(1.0), Ordering::Less);
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(u8::MAX.add_wrap(1), 0);
        assert_eq!(i8::MAX.add_wrap(1), i8::MIN);
        assert_eq!(200u8.mul_wrap(2), 144);
        assert_eq!(1.5f64.add_wrap(2.5), 4.0);
    }

    #[test]
    fn test_identity_conversion() {
        assert_eq!(i32::from_f64(i32::MAX as f64).unwrap(), i32::MAX);
        assert!(i8::from_f64(1e6).is_err());
        assert!(u32::from_f64(-1.0).is_err());
        assert_eq!(f32::from_f64(0.5).unwrap(), 0.5);
    }

    #[test]
    fn test_offset_widths() {
        assert!(!i32::is_large());
        assert!(!u32::is_large());
        assert!(i64::is_large());
        assert_eq!(u32::from_i64(7).unwrap(), 7u32);
        assert!(u32::from_i64(-1).is_err());
        assert!(i32::from_i64(1 << 40).is_err());
    }
}
