use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use wasmtime::{Engine, Module};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("module not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid module: {0}")]
    InvalidBinary(wasmtime::Error),

    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Where a module comes from.
#[derive(Debug, Clone)]
pub enum Source<'a> {
    /// Raw module bytes in the binary format.
    Bytes(Cow<'a, [u8]>),
    /// Module in the text format.
    Text(Cow<'a, str>),
    /// A file containing either format.
    Path(Cow<'a, Path>),
}

impl<'a> Source<'a> {
    pub fn bytes<B: Into<Cow<'a, [u8]>>>(bytes: B) -> Self {
        Source::Bytes(bytes.into())
    }

    pub fn text<S: Into<Cow<'a, str>>>(text: S) -> Self {
        Source::Text(text.into())
    }

    pub fn path<P: Into<Cow<'a, Path>>>(path: P) -> Self {
        Source::Path(path.into())
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(Cow::Borrowed(path))
    }
}

impl From<PathBuf> for Source<'static> {
    fn from(path: PathBuf) -> Self {
        Source::Path(Cow::Owned(path))
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(Cow::Borrowed(bytes))
    }
}

/// A compiled module together with the time the engine spent compiling it.
#[derive(Clone)]
pub struct CompiledModule {
    inner: Module,
    name: Option<String>,
    compile_duration: Duration,
}

impl CompiledModule {
    pub fn compile_duration(&self) -> Duration {
        self.compile_duration
    }

    /// Name from the module's name section, or the file stem for file sources.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `(namespace, item)` pairs the module needs at instantiation time.
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.imports().map(|i| (i.module(), i.name()))
    }

    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.inner.exports().map(|e| e.name())
    }

    pub(crate) fn inner(&self) -> &Module {
        &self.inner
    }
}

impl std::fmt::Debug for CompiledModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledModule")
            .field("name", &self.name)
            .field("compile_duration", &self.compile_duration)
            .finish_non_exhaustive()
    }
}

/// Compiles modules for one engine. Nothing is cached: every `load` compiles again.
pub struct ModuleLoader {
    engine: Engine,
}

impl ModuleLoader {
    pub fn new(engine: &Engine) -> Self {
        Self {
            engine: engine.clone(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn load<'a, S: Into<Source<'a>>>(&self, source: S) -> Result<CompiledModule> {
        match source.into() {
            Source::Bytes(bytes) => self.compile(None, || Module::from_binary(&self.engine, &bytes)),
            Source::Text(text) => self.compile(None, || Module::new(&self.engine, text.as_bytes())),
            Source::Path(path) => {
                let buf = read(&path)?;
                let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
                self.compile(stem, || Module::new(&self.engine, &buf))
            }
        }
    }

    /// Time only the engine's compile step, not the reading of the source.
    fn compile<F>(&self, fallback_name: Option<String>, f: F) -> Result<CompiledModule>
    where
        F: FnOnce() -> wasmtime::Result<Module>,
    {
        let now = Instant::now();
        let module = f().map_err(Error::InvalidBinary)?;
        let compile_duration = now.elapsed();

        let name = module.name().map(str::to_string).or(fallback_name);
        log::debug!(
            "compiled module {} in {:?}",
            name.as_deref().unwrap_or("<anonymous>"),
            compile_duration
        );

        Ok(CompiledModule {
            inner: module,
            name,
            compile_duration,
        })
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::IO(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loader() -> ModuleLoader {
        ModuleLoader::new(&Engine::default())
    }

    #[test]
    fn load_inline_bytes() {
        let module = loader()
            .load(Source::bytes(microbench_fixtures::FIB))
            .unwrap();
        assert_eq!(module.exports().collect::<Vec<_>>(), vec!["fib"]);
        assert_eq!(module.imports().count(), 0);
        assert!(module.compile_duration() > Duration::ZERO);
    }

    #[test]
    fn load_inline_text() {
        let module = loader()
            .load(Source::text(microbench_fixtures::CALLS))
            .unwrap();
        assert_eq!(module.imports().collect::<Vec<_>>(), vec![("M", "f")]);
    }

    #[test]
    fn text_is_not_binary() {
        let err = loader()
            .load(Source::bytes(microbench_fixtures::DOT.as_bytes()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBinary(_)));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = loader()
            .load(Source::bytes(&[0x00, 0x61, 0x73, 0x6d, 0xff][..]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBinary(_)));
    }

    #[test]
    fn missing_path() {
        let path = Path::new("/definitely/not/here/fib.wasm");
        let err = loader().load(path).unwrap_err();
        assert!(matches!(err, Error::NotFound(p) if p == path));
    }

    #[test]
    fn directory_is_not_a_module() {
        let err = loader().load(std::env::temp_dir()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn load_from_file_names_module_after_stem() {
        let path = std::env::temp_dir().join(format!("microbench-fib-{}.wasm", std::process::id()));
        fs::File::create(&path)
            .and_then(|mut f| f.write_all(microbench_fixtures::FIB))
            .unwrap();

        let module = loader().load(path.as_path()).unwrap();
        fs::remove_file(&path).unwrap();

        let expected = path.file_stem().unwrap().to_string_lossy().into_owned();
        assert_eq!(module.name(), Some(expected.as_str()));
    }

    #[test]
    fn every_load_recompiles() {
        let loader = loader();
        let a = loader.load(Source::bytes(microbench_fixtures::FIB)).unwrap();
        let b = loader.load(Source::bytes(microbench_fixtures::FIB)).unwrap();
        assert_ne!(a.inner().image_range(), b.inner().image_range());
        assert!(a.compile_duration() > Duration::ZERO);
        assert!(b.compile_duration() > Duration::ZERO);
    }
}
