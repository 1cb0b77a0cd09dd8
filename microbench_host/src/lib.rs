//! Compile, instantiate and time WebAssembly exports.
//!
//! A run goes [`ModuleLoader`] → [`Instantiator`] → [`BenchmarkRunner`]:
//!
//! ```no_run
//! use microbench_host::{BenchmarkBuilder, BenchmarkRunner, Config, Imports, Instantiator, ModuleLoader, Source};
//!
//! # fn main() -> microbench_host::Result<()> {
//! let engine = Config::default().engine()?;
//! let module = ModuleLoader::new(&engine).load(Source::path(std::path::Path::new("fib.wasm")))?;
//! let mut instantiator = Instantiator::new(&engine);
//! let instance = instantiator.instantiate(&module, &Imports::new())?;
//!
//! let bench = BenchmarkBuilder::new("fib").args([30]).iterations(10).build();
//! let result = BenchmarkRunner::new(&mut instantiator).run(&instance, &bench)?;
//! println!("{:.3}ms", result.mean());
//! # Ok(())
//! # }
//! ```

mod config;
mod instance;
mod loader;
mod runner;
mod value;

pub use config::{Config, ConfigBuilder, Optimization};
pub use instance::{
    Error as InstantiateError, ExportSet, Imports, Instance, Instantiator, MemoryError,
};
pub use loader::{CompiledModule, Error as LoadError, ModuleLoader, Source};
pub use runner::{
    Benchmark, BenchmarkBuilder, BenchmarkResult, BenchmarkRunner, Error as RunError, Progress,
};
pub use value::{Kind, ParseError as ValueParseError, Value};
pub use wasmtime::Engine;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("engine error: {0}")]
    Engine(wasmtime::Error),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("instantiate error: {0}")]
    Instantiate(#[from] InstantiateError),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("run error: {0}")]
    Run(#[from] RunError),
}
