use clap::ValueEnum;
use microbench_fixtures as fixtures;
use microbench_host::{Source, Value};

/// Element offsets of the two dot product vectors in linear memory.
const DOT_A: usize = 33;
const DOT_B: usize = 330_000;
/// Length of the vectors used by the sanity check.
const DOT_CHECK_LEN: usize = 10;

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Workload {
    Fib,
    FibTableFixed,
    FibTableUnknown,
    FibTableRandom,
    Dot,
    DotSplit,
    DotDummy,
    DotPressure,
    CallsExternal,
    CallsInternal,
    CallsDirect,
    Loop,
    Idiv,
}

impl Workload {
    pub fn source(&self) -> Source<'static> {
        match self {
            Workload::Fib => Source::bytes(fixtures::FIB),
            Workload::FibTableFixed => Source::text(fixtures::FIB_TABLE_FIXED),
            Workload::FibTableUnknown => Source::text(fixtures::FIB_TABLE_UNKNOWN),
            Workload::FibTableRandom => Source::text(fixtures::FIB_TABLE_RANDOM),
            Workload::Dot => Source::text(fixtures::DOT),
            Workload::DotSplit => Source::text(fixtures::DOT_SPLIT),
            Workload::DotDummy => Source::text(fixtures::DOT_DUMMY),
            Workload::DotPressure => Source::text(fixtures::DOT_PRESSURE),
            Workload::CallsExternal | Workload::CallsInternal | Workload::CallsDirect => {
                Source::text(fixtures::CALLS)
            }
            Workload::Loop => Source::text(fixtures::LOOP),
            Workload::Idiv => Source::text(fixtures::IDIV),
        }
    }

    /// Module that has to be instantiated first and linked in under the given namespace.
    pub fn dependency(&self) -> Option<(&'static str, Source<'static>)> {
        match self {
            Workload::CallsExternal | Workload::CallsInternal | Workload::CallsDirect => Some((
                fixtures::CALLS_NAMESPACE,
                Source::text(fixtures::CALLS_CALLEE),
            )),
            _ => None,
        }
    }

    pub fn export(&self) -> &'static str {
        match self {
            Workload::Fib
            | Workload::FibTableFixed
            | Workload::FibTableUnknown
            | Workload::FibTableRandom => "fib",
            Workload::Dot | Workload::DotSplit | Workload::DotDummy | Workload::DotPressure => {
                "dot"
            }
            Workload::CallsExternal => "run_external",
            Workload::CallsInternal => "run_internal",
            Workload::CallsDirect => "run_direct",
            Workload::Loop | Workload::Idiv => "dot",
        }
    }

    /// Size argument of the default variant and how much one variant step changes it.
    pub fn base_and_step(&self) -> (i32, i32) {
        match self {
            Workload::Fib
            | Workload::FibTableFixed
            | Workload::FibTableUnknown
            | Workload::FibTableRandom => (40, 1),
            Workload::Dot | Workload::DotSplit | Workload::DotDummy | Workload::DotPressure => {
                (100_000, 10_000)
            }
            Workload::CallsExternal
            | Workload::CallsInternal
            | Workload::CallsDirect
            | Workload::Loop => (100_000_000, 10_000_000),
            // divisors stay positive for every variant
            Workload::Idiv => (6, 1),
        }
    }

    /// Whether the vectors have to be written to linear memory before running.
    pub fn needs_vectors(&self) -> bool {
        matches!(
            self,
            Workload::Dot | Workload::DotSplit | Workload::DotDummy | Workload::DotPressure
        )
    }

    /// Arguments for a call of the given size.
    pub fn args(&self, size: i32) -> Vec<Value> {
        if *self == Workload::Idiv {
            return vec![Value::I32(size); 3];
        }

        if self.needs_vectors() {
            vec![
                Value::I32((DOT_A * 8) as i32),
                Value::I32((DOT_B * 8) as i32),
                Value::I32(size),
            ]
        } else {
            vec![Value::I32(size)]
        }
    }

    /// A small call with a known answer, made before any timing.
    pub fn sanity(&self) -> (Vec<Value>, Value) {
        match self {
            Workload::Fib
            | Workload::FibTableFixed
            | Workload::FibTableUnknown
            | Workload::FibTableRandom => (self.args(10), Value::I32(55)),
            Workload::Dot => (self.args(DOT_CHECK_LEN as i32), Value::F64(dot_check_sum())),
            Workload::DotSplit | Workload::DotDummy | Workload::DotPressure => (
                self.args(DOT_CHECK_LEN as i32),
                Value::F64(fixtures::DOT_REPEAT as f64 * dot_check_sum()),
            ),
            Workload::CallsExternal => (self.args(3), Value::I32(3 * (8 + 42))),
            Workload::CallsInternal | Workload::CallsDirect => {
                (self.args(3), Value::I32(3 * (7 + 37)))
            }
            Workload::Loop => (self.args(10), Value::I32(10 * (1 + 2 + 3 + 4 + 5 + 6))),
            Workload::Idiv => (self.args(1), Value::I32(1 + 3 + 5)),
        }
    }

    /// The vectors `a[i] = i` and `b[i] = i + 1` as (element offset, values) pairs.
    pub fn vectors(&self, len: usize) -> [(usize, Vec<f64>); 2] {
        let len = len.max(DOT_CHECK_LEN);
        [
            (DOT_A, (0..len).map(|i| i as f64).collect()),
            (DOT_B, (0..len).map(|i| (i + 1) as f64).collect()),
        ]
    }

    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{self:?}"))
    }
}

fn dot_check_sum() -> f64 {
    (0..DOT_CHECK_LEN).map(|i| (i * (i + 1)) as f64).sum()
}
