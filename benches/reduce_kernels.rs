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

#[macro_use]
extern crate criterion;
use criterion::Criterion;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use jagged::array::{ContentRef, Float64Array, ListOffsetArray64};
use jagged::compute::kernels::reduce;
use jagged::compute::{argmax, sum};
use jagged::index::Index64;

const SUBLISTS: usize = 4096;

// random jaggedness keeps the parents runs uneven, like real event data
fn create_offsets(rng: &mut StdRng) -> Vec<i64> {
    let mut offsets = Vec::with_capacity(SUBLISTS + 1);
    offsets.push(0);
    for _ in 0..SUBLISTS {
        let count = rng.gen_range(0..16);
        offsets.push(offsets.last().unwrap() + count);
    }
    offsets
}

fn create_list(rng: &mut StdRng) -> ContentRef {
    let offsets = create_offsets(rng);
    let total = *offsets.last().unwrap() as usize;
    let values: Vec<f64> = (0..total).map(|_| rng.gen()).collect();
    let content: ContentRef = Arc::new(Float64Array::from(values));
    Arc::new(ListOffsetArray64::try_new(Index64::from(offsets), content).unwrap())
}

fn bench_sum_kernel(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2891);
    let offsets = create_offsets(&mut rng);
    let total = *offsets.last().unwrap() as usize;
    let values: Vec<i64> = (0..total).map(|_| rng.gen_range(-100..100)).collect();
    let mut parents = vec![0i64; total];
    for i in 0..SUBLISTS {
        for j in offsets[i]..offsets[i + 1] {
            parents[j as usize] = i as i64;
        }
    }
    let mut out = vec![0i64; SUBLISTS];
    c.bench_function("reduce_sum i64", |b| {
        b.iter(|| reduce::reduce_sum(&mut out, &values, &parents))
    });
}

fn bench_sum_jagged(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2891);
    let list = create_list(&mut rng);
    c.bench_function("sum axis=-1", |b| {
        b.iter(|| sum(&list, -1, false, false).unwrap())
    });
}

fn bench_argmax_jagged(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2891);
    let list = create_list(&mut rng);
    c.bench_function("argmax axis=-1", |b| {
        b.iter(|| argmax(&list, -1, false, false).unwrap())
    });
}

fn bench_nonlocal_sum(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2891);
    let inner = create_list(&mut rng);
    let outer_offsets: Vec<i64> = (0..=SUBLISTS as i64 / 8).map(|i| i * 8).collect();
    let outer: ContentRef = Arc::new(
        ListOffsetArray64::try_new(Index64::from(outer_offsets), inner).unwrap(),
    );
    c.bench_function("sum axis=1 nonlocal", |b| {
        b.iter(|| sum(&outer, 1, false, false).unwrap())
    });
}

fn bench_count_kernel(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2891);
    let offsets = create_offsets(&mut rng);
    let total = *offsets.last().unwrap() as usize;
    let mut parents = vec![0i64; total];
    for i in 0..SUBLISTS {
        for j in offsets[i]..offsets[i + 1] {
            parents[j as usize] = i as i64;
        }
    }
    let mut out = vec![0i64; SUBLISTS];
    c.bench_function("reduce_count", |b| {
        b.iter(|| reduce::reduce_count(&mut out, &parents))
    });
}

criterion_group!(
    benches,
    bench_sum_kernel,
    bench_count_kernel,
    bench_sum_jagged,
    bench_argmax_jagged,
    bench_nonlocal_sum
);
criterion_main!(benches);
