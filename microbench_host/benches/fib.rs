use criterion::{Criterion, criterion_group, criterion_main};
use microbench_fixtures as fixtures;
use microbench_host::{
    BenchmarkBuilder, BenchmarkRunner, Config, Imports, Instantiator, ModuleLoader, Source,
};
use std::hint::black_box;
use std::time::Duration;

pub fn fib_compile(c: &mut Criterion) {
    let engine = Config::default().engine().unwrap();
    let loader = ModuleLoader::new(&engine);
    let mut group = c.benchmark_group("fib-compile");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("binary", |b| {
        b.iter(|| loader.load(Source::bytes(black_box(fixtures::FIB))).unwrap())
    });
    group.bench_function("table-random", |b| {
        b.iter(|| {
            loader
                .load(Source::text(black_box(fixtures::FIB_TABLE_RANDOM)))
                .unwrap()
        })
    });
}

pub fn fib_run(c: &mut Criterion) {
    let engine = Config::default().engine().unwrap();
    let loader = ModuleLoader::new(&engine);
    let mut instantiator = Instantiator::new(&engine);
    let mut group = c.benchmark_group("fib-run");

    for (name, source) in [
        ("direct", Source::bytes(fixtures::FIB)),
        ("table-fixed", Source::text(fixtures::FIB_TABLE_FIXED)),
        ("table-unknown", Source::text(fixtures::FIB_TABLE_UNKNOWN)),
        ("table-random", Source::text(fixtures::FIB_TABLE_RANDOM)),
    ] {
        let module = loader.load(source).unwrap();
        let instance = instantiator.instantiate(&module, &Imports::new()).unwrap();
        let bench = BenchmarkBuilder::new("fib").args([20]).expect(6765).build();
        let mut runner = BenchmarkRunner::new(&mut instantiator);

        group.bench_function(name, |b| {
            b.iter(|| runner.run(&instance, black_box(&bench)).unwrap())
        });
    }
}

criterion_group!(benches, fib_compile, fib_run);
criterion_main!(benches);
