use criterion::{Criterion, criterion_group, criterion_main};
use microbench_fixtures as fixtures;
use microbench_host::{
    BenchmarkBuilder, BenchmarkRunner, Config, Imports, Instantiator, ModuleLoader, Source,
};
use std::hint::black_box;

const CALLS: i32 = 10_000;

pub fn calls(c: &mut Criterion) {
    let engine = Config::default().engine().unwrap();
    let loader = ModuleLoader::new(&engine);
    let mut instantiator = Instantiator::new(&engine);

    let callee = loader.load(Source::text(fixtures::CALLS_CALLEE)).unwrap();
    let module = loader.load(Source::text(fixtures::CALLS)).unwrap();
    let m = instantiator.instantiate(&callee, &Imports::new()).unwrap();
    let imports = Imports::new().with(fixtures::CALLS_NAMESPACE, m.exports());
    let instance = instantiator.instantiate(&module, &imports).unwrap();

    let mut runner = BenchmarkRunner::new(&mut instantiator);
    let mut group = c.benchmark_group("calls");

    for (export, per_call) in [
        ("run_external", 8 + 42),
        ("run_internal", 7 + 37),
        ("run_direct", 7 + 37),
    ] {
        let bench = BenchmarkBuilder::new(export)
            .args([CALLS])
            .expect(CALLS * per_call)
            .build();

        group.bench_function(export, |b| {
            b.iter(|| runner.run(&instance, black_box(&bench)).unwrap())
        });
    }
}

criterion_group!(benches, calls);
criterion_main!(benches);
