use wasmtime::{Engine, OptLevel};

const DEFAULT_PARALLEL_COMPILATION: bool = false;
const DEFAULT_DEBUG_INFO: bool = false;

/// Optimization level handed to the engine's code generator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Optimization {
    None,
    #[default]
    Speed,
    SpeedAndSize,
}

impl From<Optimization> for OptLevel {
    fn from(opt: Optimization) -> Self {
        match opt {
            Optimization::None => OptLevel::None,
            Optimization::Speed => OptLevel::Speed,
            Optimization::SpeedAndSize => OptLevel::SpeedAndSize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) optimization: Optimization,
    pub(crate) parallel_compilation: bool,
    pub(crate) debug_info: bool,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build()
    }
}

impl From<ConfigBuilder> for Config {
    fn from(builder: ConfigBuilder) -> Self {
        builder.build()
    }
}

impl Config {
    pub fn optimization(&self) -> Optimization {
        self.optimization
    }

    pub fn parallel_compilation(&self) -> bool {
        self.parallel_compilation
    }

    /// Create the engine every loader and instantiator of one run shares.
    pub fn engine(&self) -> crate::Result<Engine> {
        let mut cfg = wasmtime::Config::new();
        cfg.cranelift_opt_level(self.optimization.into())
            .parallel_compilation(self.parallel_compilation)
            .debug_info(self.debug_info);

        if self.parallel_compilation {
            log::warn!("parallel compilation enabled, compile times include worker threads");
        }

        Engine::new(&cfg).map_err(crate::Error::Engine)
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder
    pub fn new() -> Self {
        Self {
            config: Config {
                optimization: Optimization::default(),
                parallel_compilation: DEFAULT_PARALLEL_COMPILATION,
                debug_info: DEFAULT_DEBUG_INFO,
            },
        }
    }

    pub fn optimization(mut self, opt: Optimization) -> Self {
        self.config.optimization = opt;
        self
    }

    /// Let the engine compile function bodies on a thread pool. Off by default so
    /// compilation stays on the calling thread.
    pub fn parallel_compilation(mut self, enable: bool) -> Self {
        self.config.parallel_compilation = enable;
        self
    }

    pub fn debug_info(mut self, enable: bool) -> Self {
        self.config.debug_info = enable;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Config {
        self.config
    }
}
