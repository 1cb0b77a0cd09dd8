use indicatif::ProgressBar;
use microbench_host::{
    Benchmark, BenchmarkResult, BenchmarkRunner, Engine, Imports, Instance, Instantiator,
    ModuleLoader, Progress, Source,
};
use std::time::Duration;

pub mod exec;
pub mod startup;

/// What a single invocation of the tool measured.
pub struct Report {
    pub label: String,
    pub compile: Duration,
    pub run: Option<BenchmarkResult>,
}

/// A benchmarked module, instantiated and ready to run.
struct Prepared {
    instantiator: Instantiator,
    instance: Instance,
    compile: Duration,
}

/// Load and instantiate `source`, linking `dependency` in under its namespace first.
fn prepare(
    engine: &Engine,
    dependency: Option<(&str, Source<'_>)>,
    source: Source<'_>,
) -> anyhow::Result<Prepared> {
    let loader = ModuleLoader::new(engine);
    let mut instantiator = Instantiator::new(engine);
    let mut imports = Imports::new();

    log::debug!("state: loading");
    if let Some((namespace, dep)) = dependency {
        let module = loader.load(dep)?;
        let instance = instantiator.instantiate(&module, &Imports::new())?;
        log::debug!(
            "linked dependency as '{namespace}' (compiled in {:?})",
            module.compile_duration()
        );
        imports.insert(namespace, instance.exports());
    }

    let module = loader.load(source)?;
    let instance = instantiator.instantiate(&module, &imports)?;
    log::debug!("state: instantiated");

    Ok(Prepared {
        instantiator,
        instance,
        compile: module.compile_duration(),
    })
}

/// Run `bench` on the prepared instance, drawing progress bars for multi-call runs.
fn sample(prepared: &mut Prepared, bench: &Benchmark) -> anyhow::Result<BenchmarkResult> {
    let bar = |len: u32| {
        if len > 1 {
            ProgressBar::new(len as u64)
        } else {
            ProgressBar::hidden()
        }
    };

    if bench.warmup() > 0 {
        println!("Warmup...");
    }
    let warmup = bar(bench.warmup());
    let sampling = bar(bench.iterations());

    log::debug!("state: running");
    let mut runner = BenchmarkRunner::new(&mut prepared.instantiator);
    let result = runner.run_observed(&prepared.instance, bench, |p| match p {
        Progress::Warmup { done, total } => {
            warmup.set_position(done as u64);
            if done == total {
                warmup.finish();
                println!("Sampling...");
            }
        }
        Progress::Sample { done, total, .. } => {
            sampling.set_position(done as u64);
            if done == total {
                sampling.finish();
            }
        }
    });

    match &result {
        Ok(_) => log::debug!("state: completed"),
        Err(err) => log::debug!("state: failed ({err})"),
    }
    Ok(result?)
}
