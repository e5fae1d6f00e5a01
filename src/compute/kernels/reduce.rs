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

//! Defines the elementwise segmented reducers.
//!
//! Every kernel reduces a flat value sequence grouped by a same-length
//! `parents` vector into an output of known length: element `k` combines
//! into `out[parents[k]]`. Kernels initialize their own output (the
//! reducer's identity), never allocate, and never fail; `parents` entries
//! must lie in `[0, out.len())` and are enforced by the caller.
//!
//! The generic parameters cover the whole (input type × accumulator type)
//! matrix: `reduce_sum::<i8, i64>` is the widening signed sum,
//! `reduce_sum::<u16, u32>` a narrow unsigned one, and so on. Integer
//! accumulation wraps modulo 2^w (two's complement for signed types);
//! float min/max follow the "NaN never wins" rule.

use num::cast::AsPrimitive;

use crate::datatypes::{NativeType, NumericNative};

/// Counts the elements of each group: `out[j] = |{k : parents[k] = j}|`.
pub fn reduce_count(out: &mut [i64], parents: &[i64]) {
    for slot in out.iter_mut() {
        *slot = 0;
    }
    for &parent in parents {
        out[parent as usize] += 1;
    }
}

/// Counts the nonzero elements of each group.
pub fn reduce_countnonzero<T: NativeType>(out: &mut [i64], values: &[T], parents: &[i64]) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = 0;
    }
    for (value, &parent) in values.iter().zip(parents) {
        if value.is_nonzero() {
            out[parent as usize] += 1;
        }
    }
}

/// Sums each group, widening every element into the accumulator type.
/// Empty groups produce 0.
pub fn reduce_sum<T, A>(out: &mut [A], values: &[T], parents: &[i64])
where
    T: NativeType + AsPrimitive<A>,
    A: NumericNative,
{
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = A::ZERO;
    }
    for (value, &parent) in values.iter().zip(parents) {
        let slot = &mut out[parent as usize];
        *slot = slot.add_wrap(value.as_());
    }
}

/// Multiplies each group, widening every element into the accumulator type.
/// Empty groups produce 1.
pub fn reduce_prod<T, A>(out: &mut [A], values: &[T], parents: &[i64])
where
    T: NativeType + AsPrimitive<A>,
    A: NumericNative,
{
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = A::ONE;
    }
    for (value, &parent) in values.iter().zip(parents) {
        let slot = &mut out[parent as usize];
        *slot = slot.mul_wrap(value.as_());
    }
}

/// Boolean-accumulator sum: ORs the nonzero-ness of each group's elements.
/// Empty groups produce false.
pub fn reduce_sum_bool<T: NativeType>(out: &mut [bool], values: &[T], parents: &[i64]) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = false;
    }
    for (value, &parent) in values.iter().zip(parents) {
        out[parent as usize] |= value.is_nonzero();
    }
}

/// Boolean-accumulator product: ANDs the nonzero-ness of each group's
/// elements. Empty groups produce true.
pub fn reduce_prod_bool<T: NativeType>(out: &mut [bool], values: &[T], parents: &[i64]) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = true;
    }
    for (value, &parent) in values.iter().zip(parents) {
        out[parent as usize] &= value.is_nonzero();
    }
}

/// Minimum of each group, starting from `identity`. A NaN candidate never
/// replaces the slot, so groups holding only NaN reduce to the identity.
pub fn reduce_min<T: NumericNative>(out: &mut [T], values: &[T], parents: &[i64], identity: T) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = identity;
    }
    for (value, &parent) in values.iter().zip(parents) {
        let slot = &mut out[parent as usize];
        if *value < *slot {
            *slot = *value;
        }
    }
}

/// Maximum of each group, starting from `identity`.
pub fn reduce_max<T: NumericNative>(out: &mut [T], values: &[T], parents: &[i64], identity: T) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = identity;
    }
    for (value, &parent) in values.iter().zip(parents) {
        let slot = &mut out[parent as usize];
        if *value > *slot {
            *slot = *value;
        }
    }
}

// Candidate-beats-best predicates for the positional reducers. A non-NaN
// value beats NaN; ties keep the earlier (already stored) position.
#[inline]
fn beats_for_min<T: NativeType>(candidate: T, best: T) -> bool {
    if candidate.is_nan() {
        false
    } else if best.is_nan() {
        true
    } else {
        candidate < best
    }
}

#[inline]
fn beats_for_max<T: NativeType>(candidate: T, best: T) -> bool {
    if candidate.is_nan() {
        false
    } else if best.is_nan() {
        true
    } else {
        candidate > best
    }
}

/// Position of each group's minimum, stored relative to the group's start:
/// `out[j] = k - starts[j]` for the winning `k`. Empty groups keep the -1
/// sentinel. `starts[j]` is the window position of group `j`'s first
/// element, so `out[j] + starts[j]` indexes back into `values`.
pub fn reduce_argmin<T: NativeType>(
    out: &mut [i64],
    values: &[T],
    starts: &[i64],
    parents: &[i64],
) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = -1;
    }
    for (i, &parent) in parents.iter().enumerate() {
        let parent = parent as usize;
        let start = starts[parent];
        if out[parent] == -1 {
            out[parent] = i as i64 - start;
        } else {
            let best = values[(out[parent] + start) as usize];
            if beats_for_min(values[i], best) {
                out[parent] = i as i64 - start;
            }
        }
    }
}

/// Position of each group's maximum, stored relative to the group's start.
pub fn reduce_argmax<T: NativeType>(
    out: &mut [i64],
    values: &[T],
    starts: &[i64],
    parents: &[i64],
) {
    debug_assert_eq!(values.len(), parents.len());
    for slot in out.iter_mut() {
        *slot = -1;
    }
    for (i, &parent) in parents.iter().enumerate() {
        let parent = parent as usize;
        let start = starts[parent];
        if out[parent] == -1 {
            out[parent] = i as i64 - start;
        } else {
            let best = values[(out[parent] + start) as usize];
            if beats_for_max(values[i], best) {
                out[parent] = i as i64 - start;
            }
        }
    }
}

/// Shifts group-relative positions back to window positions so that
/// argmin/argmax results satisfy `starts[j] <= out[j]`. The -1 sentinel of
/// empty groups is preserved.
pub fn reduce_adjust_positions(out: &mut [i64], starts: &[i64]) {
    for (slot, &start) in out.iter_mut().zip(starts) {
        if *slot != -1 {
            *slot += start;
        }
    }
}

/// Byte mask of empty groups: `out[j] = 1` when no element contributed to
/// group `j`, else 0. Consumed as a valid-when-zero mask.
pub fn reduce_mask(out: &mut [i8], parents: &[i64]) {
    for slot in out.iter_mut() {
        *slot = 1;
    }
    for &parent in parents {
        out[parent as usize] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count() {
        let mut out = vec![0i64; 4];
        reduce_count(&mut out, &[0, 0, 0, 2, 2, 3]);
        assert_eq!(out, vec![3, 0, 2, 1]);
    }

    #[test]
    fn test_countnonzero() {
        let mut out = vec![0i64; 3];
        reduce_countnonzero(&mut out, &[1.0f64, 0.0, 2.5, 0.0], &[0, 0, 2, 2]);
        assert_eq!(out, vec![1, 0, 1]);
    }

    #[test]
    fn test_sum_with_gap() {
        let mut out = vec![0i64; 4];
        reduce_sum(&mut out, &[1i64, 2, 3, 4, 5, 6], &[0, 0, 0, 2, 2, 3]);
        assert_eq!(out, vec![6, 0, 9, 6]);
    }

    #[test]
    fn test_sum_widens_and_wraps() {
        let mut out = vec![0i64; 1];
        reduce_sum(&mut out, &[i8::MAX, 1i8], &[0, 0]);
        assert_eq!(out, vec![128]);

        let mut out = vec![0u8; 1];
        reduce_sum(&mut out, &[250u8, 10u8], &[0, 0]);
        assert_eq!(out, vec![4]);
    }

    #[test]
    fn test_prod_identity_on_empty_group() {
        let mut out = vec![0i64; 3];
        reduce_prod(&mut out, &[2i32, 3, 5], &[0, 0, 2]);
        assert_eq!(out, vec![6, 1, 5]);
    }

    #[test]
    fn test_bool_sum_and_prod() {
        let mut any = vec![false; 2];
        reduce_sum_bool(&mut any, &[true, false, false], &[0, 0, 1]);
        assert_eq!(any, vec![true, false]);

        let mut all = vec![false; 2];
        reduce_prod_bool(&mut all, &[true, false, true], &[0, 0, 1]);
        assert_eq!(all, vec![false, true]);
    }

    #[test]
    fn test_min_with_identity() {
        let mut out = vec![0i32; 3];
        reduce_min(&mut out, &[5, 3, 9, 2], &[0, 0, 2, 2], i32::MAX);
        assert_eq!(out, vec![3, i32::MAX, 2]);
    }

    #[test]
    fn test_float_min_skips_nan() {
        let mut out = vec![0.0f64; 2];
        reduce_min(
            &mut out,
            &[f64::NAN, 2.0, f64::NAN],
            &[0, 0, 1],
            f64::INFINITY,
        );
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], f64::INFINITY);
    }

    #[test]
    fn test_argmax_nan_and_ties() {
        // groups [0.1, 0.5, 0.2, NaN] and (empty) and [3.0, 3.0]
        let mut out = vec![0i64; 3];
        reduce_argmax(
            &mut out,
            &[0.1f64, 0.5, 0.2, f64::NAN, 3.0, 3.0],
            &[0, 4, 4],
            &[0, 0, 0, 0, 2, 2],
        );
        assert_eq!(out, vec![1, -1, 0]);

        reduce_adjust_positions(&mut out, &[0, 4, 4]);
        assert_eq!(out, vec![1, -1, 4]);
    }

    #[test]
    fn test_argmin_nan_first_is_displaced() {
        let mut out = vec![0i64; 1];
        reduce_argmin(&mut out, &[f64::NAN, 7.0, 5.0], &[0], &[0, 0, 0]);
        assert_eq!(out, vec![2]);
    }

    #[test]
    fn test_mask_marks_empty_groups() {
        let mut out = vec![0i8; 4];
        reduce_mask(&mut out, &[0, 0, 3]);
        assert_eq!(out, vec![0, 1, 1, 0]);
    }
}
