use crate::instance::{Instance, Instantiator, Signature};
use crate::value::{Kind, Value};
use std::hint::black_box;
use std::time::{Duration, Instant};
use wasmtime::{Func, Store, Val};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid iteration count: {0}, at least one iteration is required")]
    InvalidIterationCount(u32),
    #[error("export not found or not a function: '{0}'")]
    ExportNotFound(String),
    #[error("argument mismatch: export expects {expected} but got ({})", join(.actual))]
    ArityOrTypeMismatch { expected: String, actual: Vec<Kind> },
    #[error("assertion failed: expected {expected}, got {}", .actual.map_or_else(|| "nothing".to_string(), |v| v.to_string()))]
    AssertionFailed {
        expected: Value,
        actual: Option<Value>,
    },
    #[error("instance belongs to a different instantiator")]
    ForeignInstance,
    #[error("call trapped: {0}")]
    Trap(wasmtime::Error),
}

fn join(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(Kind::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What to call and how often.
#[derive(Debug, Clone)]
pub struct Benchmark {
    pub(crate) export: String,
    pub(crate) args: Vec<Value>,
    pub(crate) iterations: u32,
    pub(crate) warmup: u32,
    pub(crate) expected: Option<Value>,
}

impl Benchmark {
    pub fn export(&self) -> &str {
        &self.export
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn warmup(&self) -> u32 {
        self.warmup
    }
}

pub struct BenchmarkBuilder {
    benchmark: Benchmark,
}

impl BenchmarkBuilder {
    /// A single timed call of `export` without arguments.
    pub fn new(export: impl Into<String>) -> Self {
        Self {
            benchmark: Benchmark {
                export: export.into(),
                args: Vec::new(),
                iterations: 1,
                warmup: 0,
                expected: None,
            },
        }
    }

    pub fn args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.benchmark.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.benchmark.iterations = iterations;
        self
    }

    /// Untimed calls made before sampling starts.
    pub fn warmup(mut self, warmup: u32) -> Self {
        self.benchmark.warmup = warmup;
        self
    }

    /// Value the first call must return, otherwise the run is aborted.
    pub fn expect(mut self, expected: impl Into<Value>) -> Self {
        self.benchmark.expected = Some(expected.into());
        self
    }

    pub fn build(self) -> Benchmark {
        self.benchmark
    }
}

impl From<BenchmarkBuilder> for Benchmark {
    fn from(builder: BenchmarkBuilder) -> Self {
        builder.build()
    }
}

/// Per-iteration wall-clock durations of one successful run.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    durations: Vec<f64>,
    mean: f64,
    returned: Vec<Value>,
}

impl BenchmarkResult {
    fn new(durations: Vec<f64>, returned: Vec<Value>) -> Self {
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        Self {
            durations,
            mean,
            returned,
        }
    }

    /// Durations in milliseconds, in call order.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Mean duration in milliseconds.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn total(&self) -> f64 {
        self.durations.iter().sum()
    }

    pub fn iterations(&self) -> usize {
        self.durations.len()
    }

    /// Everything the last call returned.
    pub fn returned(&self) -> &[Value] {
        &self.returned
    }

    /// First value the last call returned, if any.
    pub fn result(&self) -> Option<Value> {
        self.returned.first().copied()
    }
}

/// Reported before sampling starts and after every call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Progress {
    Warmup { done: u32, total: u32 },
    Sample { done: u32, total: u32, millis: f64 },
}

/// Times exported functions of instances owned by one [`Instantiator`].
///
/// Holding the instantiator mutably for the runner's lifetime keeps any other
/// call from overlapping with a running benchmark.
pub struct BenchmarkRunner<'a> {
    instantiator: &'a mut Instantiator,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(instantiator: &'a mut Instantiator) -> Self {
        Self { instantiator }
    }

    pub fn run(&mut self, instance: &Instance, benchmark: &Benchmark) -> Result<BenchmarkResult> {
        self.run_observed(instance, benchmark, |_| {})
    }

    /// Like [`run`](Self::run), reporting progress after every call.
    ///
    /// All checks happen before the first call; if any fails the export is never
    /// invoked. The expected value is checked against the very first call only.
    pub fn run_observed<F>(
        &mut self,
        instance: &Instance,
        benchmark: &Benchmark,
        mut observe: F,
    ) -> Result<BenchmarkResult>
    where
        F: FnMut(Progress),
    {
        if benchmark.iterations == 0 {
            return Err(Error::InvalidIterationCount(benchmark.iterations));
        }
        if !self.instantiator.owns(instance) {
            return Err(Error::ForeignInstance);
        }

        let func = instance
            .exports()
            .get(&benchmark.export)
            .and_then(|e| e.clone().into_func())
            .ok_or_else(|| Error::ExportNotFound(benchmark.export.clone()))?;

        let store = self.instantiator.store_mut();
        let mut results = prepare(store, &func, &benchmark.args)?;
        let args = benchmark
            .args
            .iter()
            .map(|v| v.to_val())
            .collect::<Vec<Val>>();

        log::debug!(
            "running {}({}) {} times after {} warmup calls",
            benchmark.export,
            benchmark
                .args
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            benchmark.iterations,
            benchmark.warmup
        );

        let mut pending = benchmark.expected;

        // Executing optional warmup phase
        for done in 1..=benchmark.warmup {
            timed_call(store, &func, &args, &mut results)?;
            check(&mut pending, &results)?;
            observe(Progress::Warmup {
                done,
                total: benchmark.warmup,
            });
        }

        // Executing Sampling
        let mut durations = Vec::with_capacity(benchmark.iterations as usize);
        for done in 1..=benchmark.iterations {
            let elapsed = timed_call(store, &func, &args, &mut results)?;
            check(&mut pending, &results)?;

            let millis = elapsed.as_secs_f64() * 1000.0;
            durations.push(millis);
            observe(Progress::Sample {
                done,
                total: benchmark.iterations,
                millis,
            });
        }

        let returned = results.iter().filter_map(Value::from_val).collect();
        let result = BenchmarkResult::new(durations, returned);
        log::debug!(
            "{} finished: mean {:.3}ms over {} iterations",
            benchmark.export,
            result.mean(),
            result.iterations()
        );
        Ok(result)
    }
}

/// Validate `args` against the export's signature and allocate its result buffer.
fn prepare(store: &Store<()>, func: &Func, args: &[Value]) -> Result<Vec<Val>> {
    let ty = func.ty(store);
    let actual = args.iter().map(Value::kind).collect::<Vec<_>>();
    let mismatch = || Error::ArityOrTypeMismatch {
        expected: Signature(&ty).to_string(),
        actual: actual.clone(),
    };

    let params = ty
        .params()
        .map(|p| Kind::from_val_type(&p))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(mismatch)?;
    if params != actual {
        return Err(mismatch());
    }

    ty.results()
        .map(|r| Kind::from_val_type(&r).map(Kind::zero))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(mismatch)
}

fn timed_call(
    store: &mut Store<()>,
    func: &Func,
    args: &[Val],
    results: &mut [Val],
) -> Result<Duration> {
    let now = Instant::now();
    black_box(func.call(&mut *store, args, results)).map_err(Error::Trap)?;
    Ok(now.elapsed())
}

/// Compare the expectation once, against the first call, then drop it.
fn check(pending: &mut Option<Value>, results: &[Val]) -> Result<()> {
    let Some(expected) = pending.take() else {
        return Ok(());
    };

    let actual = match results {
        [single] => Value::from_val(single),
        _ => None,
    };
    if actual != Some(expected) {
        return Err(Error::AssertionFailed { expected, actual });
    }
    Ok(())
}
