// Copyright 2023 snowkey contributors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{Criterion, criterion_group, criterion_main};
use snowkey::IdGenerator;

fn bench_new(c: &mut Criterion) {
    c.bench_function("bench_new", |b| {
        b.iter(IdGenerator::new);
    });
}

fn bench_next_id(c: &mut Criterion) {
    let generator = IdGenerator::new().expect("Could not create IdGenerator");
    c.bench_function("bench_next_id", |b| {
        b.iter(|| generator.next_id());
    });
}

fn bench_next_key(c: &mut Criterion) {
    let generator = IdGenerator::new().expect("Could not create IdGenerator");
    c.bench_function("bench_next_key", |b| {
        b.iter(|| generator.next_key("BO_"));
    });
}

criterion_group!(snowkey_perf, bench_new, bench_next_id, bench_next_key);
criterion_main!(snowkey_perf);
