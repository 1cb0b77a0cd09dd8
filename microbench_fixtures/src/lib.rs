//! WebAssembly modules exercised by the benchmarks.
//!
//! Text fixtures are embedded as-is and compiled through the engine's text
//! front-end. `FIB` is the only binary fixture and is kept as raw bytes.

/// Doubly-recursive `fib(i32) -> i32`, exported as `fib`.
pub const FIB: &[u8] = &[
    0, 97, 115, 109, 1, 0, 0, 0, 1, 6, 1, 96, 1, 127, 1, 127, 3, 2, 1, 0, 7, 7, 1, 3, 102, 105,
    98, 0, 0, 10, 30, 1, 28, 0, 32, 0, 65, 2, 72, 4, 127, 32, 0, 5, 32, 0, 65, 1, 107, 16, 0, 32,
    0, 65, 2, 107, 16, 0, 106, 11, 11, 0, 21, 4, 110, 97, 109, 101, 1, 6, 1, 0, 3, 102, 105, 98,
    2, 6, 1, 0, 1, 0, 1, 110,
];

/// `fib` through `call_indirect` with a constant in-bounds table index.
pub const FIB_TABLE_FIXED: &str = include_str!("../fixtures/fib_table_fixed.wat");

/// `fib` through `call_indirect` with an index loaded from zeroed memory.
pub const FIB_TABLE_UNKNOWN: &str = include_str!("../fixtures/fib_table_unknown.wat");

/// `fib` through `call_indirect` over eight functions picked by random byte tables.
pub const FIB_TABLE_RANDOM: &str = include_str!("../fixtures/fib_table_random.wat");

/// Single pass `dot(m, n, len) -> f64` over the exported memory `mem`.
pub const DOT: &str = include_str!("../fixtures/dot.wat");

/// `dot` repeated [`DOT_REPEAT`] times, inner loop in a helper function.
pub const DOT_SPLIT: &str = include_str!("../fixtures/dot_split.wat");

/// `dot` repeated [`DOT_REPEAT`] times after one dummy call.
pub const DOT_DUMMY: &str = include_str!("../fixtures/dot_dummy.wat");

/// `dot` repeated [`DOT_REPEAT`] times with extra live counters.
pub const DOT_PRESSURE: &str = include_str!("../fixtures/dot_pressure.wat");

/// How often the repeating dot fixtures run the inner product.
pub const DOT_REPEAT: u32 = 1000;

/// Pages of linear memory the dot fixtures export.
pub const DOT_MEMORY_PAGES: u32 = 100;

/// Exports `f(x) = x + 42`; imported by [`CALLS`] under namespace [`CALLS_NAMESPACE`].
pub const CALLS_CALLEE: &str = include_str!("../fixtures/calls_callee.wat");

/// Exports `run_external`, `run_internal` and `run_direct`, each taking an iteration count.
pub const CALLS: &str = include_str!("../fixtures/calls.wat");

pub const CALLS_NAMESPACE: &str = "M";

/// Six counters bumped `len` times; exported as `dot(len) -> i32`.
pub const LOOP: &str = include_str!("../fixtures/loop.wat");

/// `dot(m1, m2, m3) -> i32` returning `1 / m1 + 3 / m2 + 5 / m3`, unsigned.
pub const IDIV: &str = include_str!("../fixtures/idiv.wat");

/// Start function increments a global; `started() -> i32` reads it back.
pub const START_COUNTER: &str = include_str!("../fixtures/start_counter.wat");
