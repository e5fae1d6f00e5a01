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

//! Defines the indirection pass-through kernels.
//!
//! When an indexed or byte-masked layer sits between two list levels, a
//! reduction drops the missing entries, forwards the survivors to the
//! unmasked content, and re-wraps the result so that missing inputs map to
//! missing outputs. These kernels produce the `(nextcarry, nextparents,
//! outindex)` triple that realizes that: `nextcarry` selects the retained
//! positions in the underlying content, `nextparents` keeps their groups,
//! and `outindex` maps input positions to post-filter positions with -1
//! for dropped entries.

use crate::datatypes::OffsetSizeTrait;
use crate::error::KernelError;

/// Pass-through preparation for an index layer; entries with a negative
/// index are dropped. Returns the retained count, which prefixes
/// `nextcarry`/`nextparents`.
pub fn indexed_reduce_next<O: OffsetSizeTrait>(
    nextcarry: &mut [i64],
    nextparents: &mut [i64],
    outindex: &mut [i64],
    index: &[O],
    parents: &[i64],
) -> usize {
    debug_assert_eq!(index.len(), parents.len());
    debug_assert_eq!(index.len(), outindex.len());
    let mut k = 0;
    for (i, position) in index.iter().enumerate() {
        let position = position.to_i64();
        if position >= 0 {
            nextcarry[k] = position;
            nextparents[k] = parents[i];
            outindex[i] = k as i64;
            k += 1;
        } else {
            outindex[i] = -1;
        }
    }
    k
}

/// Pass-through preparation for a byte-masked layer; entries whose mask
/// byte disagrees with `valid_when` are dropped. Retained entries carry
/// their own position (the mask layer adds no indirection of its own).
pub fn bytemasked_reduce_next(
    nextcarry: &mut [i64],
    nextparents: &mut [i64],
    outindex: &mut [i64],
    mask: &[i8],
    valid_when: bool,
    parents: &[i64],
) -> usize {
    debug_assert_eq!(mask.len(), parents.len());
    debug_assert_eq!(mask.len(), outindex.len());
    let mut k = 0;
    for (i, &byte) in mask.iter().enumerate() {
        if (byte != 0) == valid_when {
            nextcarry[k] = i as i64;
            nextparents[k] = parents[i];
            outindex[i] = k as i64;
            k += 1;
        } else {
            outindex[i] = -1;
        }
    }
    k
}

/// Offsets re-attaching an option layer to a list result that came back
/// from below an indirection: the group starts become the offsets and the
/// final entry is the full option-index length.
pub fn fix_offsets(outoffsets: &mut [i64], starts: &[i64], outindexlength: usize) {
    debug_assert_eq!(outoffsets.len(), starts.len() + 1);
    outoffsets[..starts.len()].copy_from_slice(starts);
    outoffsets[starts.len()] = outindexlength as i64;
}

/// Composes two stacked option-indices into one: a missing outer entry
/// stays missing, anything else reads through the inner index.
pub fn index_simplify(
    out: &mut [i64],
    outer: &[i64],
    inner: &[i64],
) -> Result<(), KernelError> {
    debug_assert_eq!(out.len(), outer.len());
    for (i, &position) in outer.iter().enumerate() {
        if position < 0 {
            out[i] = -1;
        } else if position as usize >= inner.len() {
            return Err(KernelError::new("index out of range for content", i as i64));
        } else {
            out[i] = inner[position as usize];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_reduce_next_drops_missing() {
        let index = [0i64, -1, 2, 1, -1];
        let parents = [0i64, 0, 1, 1, 2];
        let mut nextcarry = vec![0i64; 5];
        let mut nextparents = vec![0i64; 5];
        let mut outindex = vec![0i64; 5];
        let kept =
            indexed_reduce_next(&mut nextcarry, &mut nextparents, &mut outindex, &index, &parents);
        assert_eq!(kept, 3);
        assert_eq!(&nextcarry[..kept], &[0, 2, 1]);
        assert_eq!(&nextparents[..kept], &[0, 1, 1]);
        assert_eq!(outindex, vec![0, -1, 1, 2, -1]);
    }

    #[test]
    fn test_bytemasked_reduce_next() {
        let mask = [1i8, 0, 1, 1];
        let parents = [0i64, 0, 1, 1];
        let mut nextcarry = vec![0i64; 4];
        let mut nextparents = vec![0i64; 4];
        let mut outindex = vec![0i64; 4];
        let kept = bytemasked_reduce_next(
            &mut nextcarry,
            &mut nextparents,
            &mut outindex,
            &mask,
            true,
            &parents,
        );
        assert_eq!(kept, 3);
        assert_eq!(&nextcarry[..kept], &[0, 2, 3]);
        assert_eq!(&nextparents[..kept], &[0, 1, 1]);
        assert_eq!(outindex, vec![0, -1, 1, 2]);
    }

    #[test]
    fn test_fix_offsets() {
        let mut outoffsets = vec![0i64; 3];
        fix_offsets(&mut outoffsets, &[0, 2], 5);
        assert_eq!(outoffsets, vec![0, 2, 5]);
    }

    #[test]
    fn test_index_simplify() {
        let mut out = vec![0i64; 4];
        index_simplify(&mut out, &[2, -1, 0, 1], &[5, -1, 7]).unwrap();
        assert_eq!(out, vec![7, -1, 5, -1]);
        assert!(index_simplify(&mut out, &[3, 0, 0, 0], &[5, -1, 7]).is_err());
    }
}
