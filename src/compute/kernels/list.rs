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

//! Defines the list-layout preparation kernels.
//!
//! Pure transformations on offsets/parents/starts slices that turn one
//! nesting level into the `(parents, starts, outlength)` tuple the
//! elementwise reducers consume. An offsets slice of length N+1 describes N
//! sublists; sublist `i` spans `content[offsets[i]..offsets[i + 1])`.
//! Output buffers are sized by the orchestrator; kernels never allocate.

use crate::datatypes::OffsetSizeTrait;
use crate::error::KernelError;

/// Fills the top-level parents vector: every element belongs to group 0.
pub fn zero_parents(out: &mut [i64]) {
    for slot in out.iter_mut() {
        *slot = 0;
    }
}

/// Rebases offsets to start at zero: `out[i] = offsets[i] - offsets[0]`,
/// widening to i64. Idempotent.
pub fn compact_offsets<O: OffsetSizeTrait>(out: &mut [i64], offsets: &[O]) {
    debug_assert_eq!(out.len(), offsets.len());
    let first = offsets[0].to_i64();
    for (slot, offset) in out.iter_mut().zip(offsets) {
        *slot = offset.to_i64() - first;
    }
}

/// Returns the window of content the offsets actually reach:
/// `(offsets[0], offsets[N])`.
pub fn global_startstop(offsets: &[i64]) -> (i64, i64) {
    (offsets[0], offsets[offsets.len() - 1])
}

/// Parents of a *local* reduction: every element of sublist `i` receives
/// parent `i`. Positions are relative to `offsets[0]`, matching content
/// trimmed to the global `[start, stop)` window.
pub fn local_nextparents(out: &mut [i64], offsets: &[i64]) {
    let first = offsets[0];
    for i in 0..offsets.len() - 1 {
        for j in offsets[i] - first..offsets[i + 1] - first {
            out[j as usize] = i as i64;
        }
    }
}

/// Offsets of a local reduction's output list: `out[j + 1] - out[j]` is the
/// number of elements with parent `j`. `parents` must be non-decreasing and
/// `out` one longer than the number of groups.
pub fn local_outoffsets(out: &mut [i64], parents: &[i64]) {
    let outlength = out.len() - 1;
    let mut k = 0;
    let mut last = -1i64;
    for (i, &parent) in parents.iter().enumerate() {
        while last < parent {
            out[k] = i as i64;
            k += 1;
            last += 1;
        }
    }
    while k <= outlength {
        out[k] = parents.len() as i64;
        k += 1;
    }
}

/// Longest sublist length at this level, copying the offsets into a mutable
/// working buffer for [`nonlocal_preparenext`].
pub fn nonlocal_maxcount_offsetscopy(offsetscopy: &mut [i64], offsets: &[i64]) -> i64 {
    debug_assert_eq!(offsetscopy.len(), offsets.len());
    let mut maxcount = 0;
    offsetscopy[0] = offsets[0];
    for i in 0..offsets.len() - 1 {
        let count = offsets[i + 1] - offsets[i];
        if maxcount < count {
            maxcount = count;
        }
        offsetscopy[i + 1] = offsets[i + 1];
    }
    maxcount
}

/// Prepares a *non-local* reduction, in which this level is the target axis
/// and sublists combine positionally across outer groups.
///
/// Elements are visited round-robin: round `c` takes the `c`-th element of
/// every non-exhausted sublist in sublist order, so the carried order groups
/// first by position-within-sublist and within that by outer parent
/// ascending. For each taken element,
/// `nextparents[k] = parents[i] * maxcount + diff` encodes the
/// (outer group, positional slot) coordinate the inner reduction resolves,
/// and `distincts[coordinate]` records the first flat content position
/// occupying that slot (-1 for slots no sublist reaches).
///
/// `offsetscopy` is consumed as the per-sublist read cursor. Returns the
/// largest `nextparents` value; the inner reduction's output length is one
/// more than that.
pub fn nonlocal_preparenext(
    nextcarry: &mut [i64],
    nextparents: &mut [i64],
    distincts: &mut [i64],
    offsetscopy: &mut [i64],
    offsets: &[i64],
    parents: &[i64],
    maxcount: i64,
) -> i64 {
    debug_assert_eq!(offsets.len() - 1, parents.len());
    for slot in distincts.iter_mut() {
        *slot = -1;
    }
    let length = offsets.len() - 1;
    let nextlen = nextcarry.len();
    let mut maxnextparents = 0;
    let mut k = 0;
    while k < nextlen {
        for i in 0..length {
            if offsetscopy[i] < offsets[i + 1] {
                let diff = offsetscopy[i] - offsets[i];
                let parent = parents[i];
                nextcarry[k] = offsetscopy[i];
                nextparents[k] = parent * maxcount + diff;
                if maxnextparents < nextparents[k] {
                    maxnextparents = nextparents[k];
                }
                let slot = nextparents[k] as usize;
                if distincts[slot] == -1 {
                    distincts[slot] = offsetscopy[i];
                }
                k += 1;
                offsetscopy[i] += 1;
            }
        }
    }
    maxnextparents
}

/// First carried position of each inner parent: `nextstarts[p]` is the
/// least `k` with `nextparents[k] = p`. Each occupied parent forms one
/// contiguous run in `nextparents`; entries for unoccupied parents are left
/// untouched and must not be read.
pub fn nonlocal_nextstarts(nextstarts: &mut [i64], nextparents: &[i64]) {
    let mut last = -1;
    for (k, &parent) in nextparents.iter().enumerate() {
        if parent != last {
            nextstarts[parent as usize] = k as i64;
            last = parent;
        }
    }
}

/// Counts, for each output group, how many earlier groups the parents never
/// mention: `gaps[j] = |{j' < j : j' not in parents}|`.
pub fn nonlocal_findgaps(gaps: &mut [i64], parents: &[i64]) {
    for slot in gaps.iter_mut() {
        *slot = 0;
    }
    for &parent in parents {
        gaps[parent as usize] = 1;
    }
    let mut absent = 0;
    for slot in gaps.iter_mut() {
        let seen = *slot;
        *slot = absent;
        if seen == 0 {
            absent += 1;
        }
    }
}

/// Assembles the output `starts`/`stops` of a non-local reduction from the
/// slot-occupancy map. Group `j` owns the prefix run of occupied slots
/// starting at `j * maxcount`; `gaps` spares the sentinel scan for groups
/// the parents never mention. Groups with no occupied slot collapse to a
/// zero-length interval anchored after the last occupied run.
pub fn nonlocal_outstartsstops(
    outstarts: &mut [i64],
    outstops: &mut [i64],
    distincts: &[i64],
    gaps: &[i64],
    maxcount: i64,
) {
    debug_assert_eq!(outstarts.len(), outstops.len());
    let outlength = outstarts.len();
    let mut cursor = 0;
    for j in 0..outlength {
        let base = j as i64 * maxcount;
        let known_absent = j + 1 < outlength && gaps[j + 1] > gaps[j];
        let mut count = 0;
        if !known_absent {
            while count < maxcount && distincts[(base + count) as usize] != -1 {
                count += 1;
            }
        }
        if count == 0 {
            outstarts[j] = cursor;
            outstops[j] = cursor;
        } else {
            outstarts[j] = base;
            outstops[j] = base + count;
            cursor = base + count;
        }
    }
}

/// Inverse of a carry permutation: `outcarry[nextcarry[k]] = k`. Reorders
/// sorted content back into original-sublist order so sort/argsort can be
/// wrapped in the original offsets.
pub fn local_preparenext(outcarry: &mut [i64], nextcarry: &[i64]) {
    debug_assert_eq!(outcarry.len(), nextcarry.len());
    for (k, &position) in nextcarry.iter().enumerate() {
        outcarry[position as usize] = k as i64;
    }
}

/// Carry index realizing zero-based target `offsets` over a list described
/// by `starts`/`stops`: position `offsets[i] + j` reads source element
/// `starts[i] + j`. Fails when a sublist's length disagrees with the target
/// offsets or reaches beyond the content.
pub fn broadcast_tooffsets<O: OffsetSizeTrait>(
    nextcarry: &mut [i64],
    offsets: &[i64],
    starts: &[O],
    stops: &[O],
    lencontent: usize,
) -> Result<(), KernelError> {
    debug_assert_eq!(offsets.len() - 1, starts.len());
    for i in 0..offsets.len() - 1 {
        let start = starts[i].to_i64();
        let stop = stops[i].to_i64();
        if start != stop && stop > lencontent as i64 {
            return Err(KernelError::new(
                "stops beyond the length of the content",
                i as i64,
            ));
        }
        let count = offsets[i + 1] - offsets[i];
        if stop - start != count {
            return Err(KernelError::new("cannot broadcast nested list", i as i64));
        }
        for j in 0..count {
            nextcarry[(offsets[i] + j) as usize] = start + j;
        }
    }
    Ok(())
}

/// Verifies all sublists share one length and returns it (0 for an empty
/// list of lists).
pub fn to_regular_size<O: OffsetSizeTrait>(offsets: &[O]) -> Result<i64, KernelError> {
    let mut size = -1;
    for i in 0..offsets.len() - 1 {
        let count = offsets[i + 1].to_i64() - offsets[i].to_i64();
        if size == -1 {
            size = count;
        } else if size != count {
            return Err(KernelError::new(
                "cannot convert to a regular array because sublist lengths differ",
                i as i64,
            ));
        }
    }
    Ok(if size == -1 { 0 } else { size })
}

/// Per-sublist element counts.
pub fn listarray_num<O: OffsetSizeTrait>(out: &mut [i64], starts: &[O], stops: &[O]) {
    debug_assert_eq!(out.len(), starts.len());
    for i in 0..starts.len() {
        out[i] = stops[i].to_i64() - starts[i].to_i64();
    }
}

/// Composes two offset levels for flattening: `out[i]` is the flat position
/// where outer sublist `i` begins in the inner content,
/// `inneroffsets[offsets[i]]`.
pub fn flatten_offsets<O: OffsetSizeTrait>(
    out: &mut [i64],
    offsets: &[O],
    inneroffsets: &[i64],
) -> Result<(), KernelError> {
    debug_assert_eq!(out.len(), offsets.len());
    for (i, offset) in offsets.iter().enumerate() {
        let position = offset.to_i64();
        if position < 0 || position as usize >= inneroffsets.len() {
            return Err(KernelError::new(
                "flattening offset exceeds the inner list",
                i as i64,
            ));
        }
        out[i] = inneroffsets[position as usize];
    }
    Ok(())
}

/// Position of every element within its own sublist, for zero-based
/// offsets.
pub fn local_index(out: &mut [i64], offsets: &[i64]) {
    for i in 0..offsets.len() - 1 {
        for j in offsets[i]..offsets[i + 1] {
            out[j as usize] = j - offsets[i];
        }
    }
}

/// Structural validation of a starts/stops pair against its content length.
pub fn listarray_validity<O: OffsetSizeTrait>(
    starts: &[O],
    stops: &[O],
    lencontent: usize,
) -> Result<(), KernelError> {
    debug_assert_eq!(starts.len(), stops.len());
    for i in 0..starts.len() {
        let start = starts[i].to_i64();
        let stop = stops[i].to_i64();
        if start < 0 {
            return Err(KernelError::new("start[i] < 0", i as i64));
        }
        if start > stop {
            return Err(KernelError::new("start[i] > stop[i]", i as i64));
        }
        if start != stop && stop > lencontent as i64 {
            return Err(KernelError::new("stop[i] > len(content)", i as i64));
        }
    }
    Ok(())
}

/// Offsets of a right-padded list: sublists shorter than `target` grow to
/// `target`, longer ones keep their length. Returns the total padded
/// element count.
pub fn rpad_length_axis1<O: OffsetSizeTrait>(
    tooffsets: &mut [i64],
    offsets: &[O],
    target: usize,
) -> i64 {
    debug_assert_eq!(tooffsets.len(), offsets.len());
    tooffsets[0] = 0;
    for i in 0..offsets.len() - 1 {
        let count = offsets[i + 1].to_i64() - offsets[i].to_i64();
        let padded = count.max(target as i64);
        tooffsets[i + 1] = tooffsets[i] + padded;
    }
    tooffsets[offsets.len() - 1]
}

/// Option-index of a right-padded list: original content positions followed
/// by -1 sentinels up to `target` per sublist. `toindex` must have the
/// length computed by [`rpad_length_axis1`].
pub fn rpad_axis1<O: OffsetSizeTrait>(toindex: &mut [i64], offsets: &[O], target: usize) {
    let mut k = 0;
    for i in 0..offsets.len() - 1 {
        let start = offsets[i].to_i64();
        let count = offsets[i + 1].to_i64() - start;
        for j in 0..count {
            toindex[k] = start + j;
            k += 1;
        }
        for _ in count..target as i64 {
            toindex[k] = -1;
            k += 1;
        }
    }
    debug_assert_eq!(k, toindex.len());
}

/// Option-index of a right-padded-and-clipped list: exactly `target`
/// positions per sublist, truncating long sublists and padding short ones
/// with -1.
pub fn rpad_and_clip_axis1<O: OffsetSizeTrait>(
    toindex: &mut [i64],
    offsets: &[O],
    target: usize,
) {
    debug_assert_eq!(toindex.len(), (offsets.len() - 1) * target);
    for i in 0..offsets.len() - 1 {
        let start = offsets[i].to_i64();
        let count = offsets[i + 1].to_i64() - start;
        for j in 0..target as i64 {
            toindex[i * target + j as usize] = if j < count { start + j } else { -1 };
        }
    }
}

/// Option-index padding the outermost dimension itself: positions
/// `0..length` followed by -1 up to the index length.
pub fn rpad_axis0(toindex: &mut [i64], length: usize) {
    for (i, slot) in toindex.iter_mut().enumerate() {
        *slot = if i < length { i as i64 } else { -1 };
    }
}

/// Per-sublist combination counts `C(len, n)` (multiset `C(len + n - 1, n)`
/// with replacement) accumulated into offsets. Returns the total number of
/// emitted tuples.
pub fn combinations_length<O: OffsetSizeTrait>(
    tooffsets: &mut [i64],
    starts: &[O],
    stops: &[O],
    n: usize,
    replacement: bool,
) -> i64 {
    debug_assert_eq!(tooffsets.len(), starts.len() + 1);
    tooffsets[0] = 0;
    for i in 0..starts.len() {
        let mut count = stops[i].to_i64() - starts[i].to_i64();
        if replacement {
            count += n as i64 - 1;
        }
        let combinations = if (n as i64) > count {
            0
        } else {
            // running product stays integral: after j factors it equals
            // C(count, j) * remaining partial term
            let mut total = 1;
            for j in 1..=n as i64 {
                total *= count - j + 1;
                total /= j;
            }
            total
        };
        tooffsets[i + 1] = tooffsets[i] + combinations;
    }
    tooffsets[starts.len()]
}

/// Emits the lexicographically ordered n-tuples of every sublist into `n`
/// parallel carry vectors: tuple `t`'s `j`-th member is content position
/// `tocarry[j][t]`. Strictly increasing positions without replacement,
/// non-decreasing with.
pub fn combinations<O: OffsetSizeTrait>(
    tocarry: &mut [&mut [i64]],
    starts: &[O],
    stops: &[O],
    n: usize,
    replacement: bool,
) {
    let mut k = 0;
    let mut odometer = vec![0i64; n];
    for i in 0..starts.len() {
        let start = starts[i].to_i64();
        let stop = stops[i].to_i64();
        // seat the odometer on the first tuple, if the sublist has one
        for j in 0..n {
            odometer[j] = if replacement {
                start
            } else {
                start + j as i64
            };
        }
        if *odometer.last().unwrap() >= stop {
            continue;
        }
        loop {
            for j in 0..n {
                tocarry[j][k] = odometer[j];
            }
            k += 1;
            // advance the rightmost digit that can still move
            let mut advanced = false;
            let mut digit = n;
            while digit > 0 {
                digit -= 1;
                let limit = if replacement {
                    stop - 1
                } else {
                    stop - (n - digit) as i64
                };
                if odometer[digit] < limit {
                    odometer[digit] += 1;
                    for j in digit + 1..n {
                        odometer[j] = if replacement {
                            odometer[digit]
                        } else {
                            odometer[j - 1] + 1
                        };
                    }
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                break;
            }
        }
    }
    if !tocarry.is_empty() {
        debug_assert_eq!(k, tocarry[0].len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_offsets_idempotent() {
        let mut out = vec![0i64; 4];
        compact_offsets(&mut out, &[5i64, 8, 8, 11]);
        assert_eq!(out, vec![0, 3, 3, 6]);

        let mut again = vec![0i64; 4];
        compact_offsets(&mut again, &out);
        assert_eq!(again, out);
    }

    #[test]
    fn test_compact_offsets_widens() {
        let mut out = vec![0i64; 3];
        compact_offsets(&mut out, &[2u32, 4, 7]);
        assert_eq!(out, vec![0, 2, 5]);
    }

    #[test]
    fn test_global_startstop() {
        assert_eq!(global_startstop(&[2, 4, 4, 9]), (2, 9));
    }

    #[test]
    fn test_local_nextparents() {
        let mut out = vec![0i64; 6];
        local_nextparents(&mut out, &[0, 3, 3, 5, 6]);
        assert_eq!(out, vec![0, 0, 0, 2, 2, 3]);
    }

    #[test]
    fn test_local_outoffsets_counts_and_gaps() {
        let mut out = vec![0i64; 5];
        local_outoffsets(&mut out, &[0, 0, 0, 2, 2, 3]);
        assert_eq!(out, vec![0, 3, 3, 5, 6]);
    }

    #[test]
    fn test_maxcount_offsetscopy() {
        let offsets = [0i64, 3, 3, 5, 6];
        let mut copy = vec![0i64; 5];
        assert_eq!(nonlocal_maxcount_offsetscopy(&mut copy, &offsets), 3);
        assert_eq!(copy, offsets);
    }

    #[test]
    fn test_preparenext_round_robin() {
        // sublists [1,2,3] [] [4,5] [6]; outer groups {0,1} and {2,3}
        let offsets = [0i64, 3, 3, 5, 6];
        let parents = [0i64, 0, 1, 1];
        let maxcount = 3;
        let mut offsetscopy = vec![0i64; 5];
        nonlocal_maxcount_offsetscopy(&mut offsetscopy, &offsets);

        let mut nextcarry = vec![0i64; 6];
        let mut nextparents = vec![0i64; 6];
        let mut distincts = vec![0i64; 6];
        let maxnextparents = nonlocal_preparenext(
            &mut nextcarry,
            &mut nextparents,
            &mut distincts,
            &mut offsetscopy,
            &offsets,
            &parents,
            maxcount,
        );

        // rounds: positions 0 of sublists 0,2,3 then positions 1 of 0,2
        // then position 2 of 0
        assert_eq!(nextcarry, vec![0, 3, 5, 1, 4, 2]);
        assert_eq!(nextparents, vec![0, 3, 3, 1, 4, 2]);
        assert_eq!(maxnextparents, 4);
        assert_eq!(distincts, vec![0, 1, 2, 3, 4, -1]);

        let mut nextstarts = vec![0i64; 5];
        nonlocal_nextstarts(&mut nextstarts, &nextparents);
        assert_eq!(nextstarts, vec![0, 3, 5, 1, 4]);
    }

    #[test]
    fn test_findgaps() {
        let mut gaps = vec![0i64; 4];
        nonlocal_findgaps(&mut gaps, &[1, 1, 3]);
        assert_eq!(gaps, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_outstartsstops_with_gap() {
        // outlength 2, maxcount 1; group 0 absent, group 1 occupies slot 0
        let distincts = [-1i64, 0];
        let mut gaps = vec![0i64; 2];
        nonlocal_findgaps(&mut gaps, &[1, 1]);
        let mut outstarts = vec![0i64; 2];
        let mut outstops = vec![0i64; 2];
        nonlocal_outstartsstops(&mut outstarts, &mut outstops, &distincts, &gaps, 1);
        assert_eq!(outstarts, vec![0, 1]);
        assert_eq!(outstops, vec![0, 2]);
    }

    #[test]
    fn test_outstartsstops_prefix_runs() {
        // the preparenext fixture above: group 0 owns slots {0,1,2},
        // group 1 owns {0,1}
        let distincts = [0i64, 1, 2, 3, 4, -1];
        let gaps = [0i64, 0];
        let mut outstarts = vec![0i64; 2];
        let mut outstops = vec![0i64; 2];
        nonlocal_outstartsstops(&mut outstarts, &mut outstops, &distincts, &gaps, 3);
        assert_eq!(outstarts, vec![0, 3]);
        assert_eq!(outstops, vec![3, 5]);
    }

    #[test]
    fn test_local_preparenext_inverts() {
        let nextcarry = [0i64, 3, 5, 1, 4, 2];
        let mut outcarry = vec![0i64; 6];
        local_preparenext(&mut outcarry, &nextcarry);
        assert_eq!(outcarry, vec![0, 3, 5, 1, 4, 2]);
        for (k, &position) in nextcarry.iter().enumerate() {
            assert_eq!(outcarry[position as usize], k as i64);
        }
    }

    #[test]
    fn test_broadcast_tooffsets_mismatch() {
        let mut nextcarry = vec![0i64; 3];
        let err = broadcast_tooffsets(&mut nextcarry, &[0, 1, 3], &[0i64, 1], &[2i64, 3], 3)
            .unwrap_err();
        assert_eq!(err.message, "cannot broadcast nested list");
        assert_eq!(err.index, 0);
    }

    #[test]
    fn test_to_regular_size() {
        assert_eq!(to_regular_size(&[0i64, 2, 4, 6]).unwrap(), 2);
        assert_eq!(to_regular_size(&[0i64]).unwrap(), 0);
        let err = to_regular_size(&[0i64, 2, 5]).unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_listarray_num() {
        let offsets = [0i64, 3, 3, 5];
        let mut out = vec![0i64; 3];
        listarray_num(&mut out, &offsets[..3], &offsets[1..]);
        assert_eq!(out, vec![3, 0, 2]);
    }

    #[test]
    fn test_flatten_offsets() {
        let inner = [0i64, 2, 3, 3, 5];
        let mut out = vec![0i64; 3];
        flatten_offsets(&mut out, &[0i64, 2, 4], &inner).unwrap();
        assert_eq!(out, vec![0, 3, 5]);
        assert!(flatten_offsets(&mut out, &[0i64, 2, 9], &inner).is_err());
    }

    #[test]
    fn test_local_index() {
        let mut out = vec![0i64; 6];
        local_index(&mut out, &[0, 3, 3, 5, 6]);
        assert_eq!(out, vec![0, 1, 2, 0, 1, 0]);
    }

    #[test]
    fn test_listarray_validity() {
        let offsets = [0i64, 3, 3, 5];
        assert!(listarray_validity(&offsets[..3], &offsets[1..], 5).is_ok());
        assert_eq!(
            listarray_validity(&offsets[..3], &offsets[1..], 4)
                .unwrap_err()
                .message,
            "stop[i] > len(content)"
        );
        assert_eq!(
            listarray_validity(&[2i64], &[1i64], 5).unwrap_err().message,
            "start[i] > stop[i]"
        );
    }

    #[test]
    fn test_rpad_kernels() {
        let offsets = [0i64, 3, 3, 5];
        let mut tooffsets = vec![0i64; 4];
        let total = rpad_length_axis1(&mut tooffsets, &offsets, 2);
        assert_eq!(tooffsets, vec![0, 3, 5, 7]);
        assert_eq!(total, 7);

        let mut toindex = vec![0i64; 7];
        rpad_axis1(&mut toindex, &offsets, 2);
        assert_eq!(toindex, vec![0, 1, 2, -1, -1, 3, 4]);

        let mut clipped = vec![0i64; 6];
        rpad_and_clip_axis1(&mut clipped, &offsets, 2);
        assert_eq!(clipped, vec![0, 1, -1, -1, 3, 4]);

        let mut axis0 = vec![0i64; 5];
        rpad_axis0(&mut axis0, 3);
        assert_eq!(axis0, vec![0, 1, 2, -1, -1]);
    }

    #[test]
    fn test_combinations_length() {
        let starts = [0i64, 4, 4];
        let stops = [4i64, 4, 6];
        let mut tooffsets = vec![0i64; 4];
        let total = combinations_length(&mut tooffsets, &starts, &stops, 2, false);
        assert_eq!(tooffsets, vec![0, 6, 6, 7]);
        assert_eq!(total, 7);

        let mut with_replacement = vec![0i64; 4];
        let total = combinations_length(&mut with_replacement, &starts, &stops, 2, true);
        assert_eq!(with_replacement, vec![0, 10, 10, 13]);
        assert_eq!(total, 13);
    }

    #[test]
    fn test_combinations_lexicographic() {
        let starts = [0i64, 3];
        let stops = [3i64, 5];
        let mut first = vec![0i64; 4];
        let mut second = vec![0i64; 4];
        {
            let mut tocarry: Vec<&mut [i64]> = vec![&mut first, &mut second];
            combinations(&mut tocarry, &starts, &stops, 2, false);
        }
        assert_eq!(first, vec![0, 0, 1, 3]);
        assert_eq!(second, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_combinations_with_replacement() {
        let starts = [0i64];
        let stops = [2i64];
        let mut first = vec![0i64; 3];
        let mut second = vec![0i64; 3];
        {
            let mut tocarry: Vec<&mut [i64]> = vec![&mut first, &mut second];
            combinations(&mut tocarry, &starts, &stops, 2, true);
        }
        assert_eq!(first, vec![0, 0, 1]);
        assert_eq!(second, vec![0, 1, 1]);
    }
}
