use crate::loader::CompiledModule;
use crate::value::type_name;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use wasmtime::{Engine, Extern, ExternType, FuncType, GlobalType, Memory, Mutability, Store};

type Result<T> = std::result::Result<T, Error>;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

/// Defines possible errors that can occur while creating an instance.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The module imports from a namespace (or `namespace.item`) nobody provided.
    #[error("missing import: '{0}'")]
    MissingImport(String),
    /// The provided item does not have the kind or signature the module declares.
    #[error("type mismatch for import '{import}': module declares {expected} but got {actual}")]
    TypeMismatch {
        import: String,
        expected: String,
        actual: String,
    },
    /// The export set for a namespace was created by a different instantiator.
    #[error("import namespace '{0}' belongs to a different instantiator")]
    ForeignImport(String),
    /// The module was compiled by a different engine.
    #[error("module was compiled for a different engine")]
    ForeignModule,
    /// The engine rejected the instantiation or the start function trapped.
    #[error("instantiation failed: {0}")]
    Trap(wasmtime::Error),
}

/// Errors raised while accessing an instance's exported memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("memory export not found: '{0}'")]
    NotFound(String),
    #[error("memory access out of bounds: offset {offset} len {len} exceeds size {size}")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    #[error("instance belongs to a different instantiator")]
    ForeignInstance,
}

/// The exports of one instance, by name.
#[derive(Clone, Debug)]
pub struct ExportSet {
    store: u64,
    items: FxHashMap<String, Extern>,
}

impl ExportSet {
    pub fn get(&self, name: &str) -> Option<&Extern> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Maps import namespaces to the export sets that satisfy them.
#[derive(Clone, Debug, Default)]
pub struct Imports {
    namespaces: FxHashMap<String, ExportSet>,
}

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: impl Into<String>, exports: &ExportSet) -> Self {
        self.insert(namespace, exports);
        self
    }

    pub fn insert(&mut self, namespace: impl Into<String>, exports: &ExportSet) {
        self.namespaces.insert(namespace.into(), exports.clone());
    }

    pub fn get(&self, namespace: &str) -> Option<&ExportSet> {
        self.namespaces.get(namespace)
    }
}

/// A live instance. Only usable with the [`Instantiator`] that created it.
#[derive(Clone, Debug)]
pub struct Instance {
    store: u64,
    name: Option<String>,
    exports: ExportSet,
}

impl Instance {
    pub fn exports(&self) -> &ExportSet {
        &self.exports
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Owns the engine store all of its instances live in.
///
/// Instances created here can import each other's exports; the store keeps a
/// referenced instance alive for as long as the instantiator exists.
pub struct Instantiator {
    id: u64,
    engine: Engine,
    store: Store<()>,
}

impl Instantiator {
    pub fn new(engine: &Engine) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            engine: engine.clone(),
            store: Store::new(engine, ()),
        }
    }

    /// Instantiate `module`, resolving each of its imports from `imports`.
    ///
    /// Every import is resolved and type checked before the engine is involved,
    /// so a failure never leaves a half-initialized instance behind. The
    /// module's start function runs exactly once as part of this call.
    pub fn instantiate(&mut self, module: &CompiledModule, imports: &Imports) -> Result<Instance> {
        if !Engine::same(&self.engine, module.inner().engine()) {
            return Err(Error::ForeignModule);
        }

        let mut externs = Vec::with_capacity(module.inner().imports().len());
        for import in module.inner().imports() {
            let namespace = import.module();
            let item = import.name();

            let set = imports
                .get(namespace)
                .ok_or_else(|| Error::MissingImport(namespace.to_string()))?;
            if set.store != self.id {
                return Err(Error::ForeignImport(namespace.to_string()));
            }

            let provided = set
                .get(item)
                .ok_or_else(|| Error::MissingImport(format!("{namespace}.{item}")))?;
            self.check_import(&format!("{namespace}.{item}"), &import.ty(), provided)?;
            externs.push(provided.clone());
        }

        let inner = wasmtime::Instance::new(&mut self.store, module.inner(), &externs)
            .map_err(Error::Trap)?;

        let items = inner
            .exports(&mut self.store)
            .map(|e| (e.name().to_string(), e.into_extern()))
            .collect::<FxHashMap<_, _>>();

        log::debug!(
            "instantiated {} with {} imports and {} exports",
            module.name().unwrap_or("<anonymous>"),
            externs.len(),
            items.len()
        );

        Ok(Instance {
            store: self.id,
            name: module.name().map(str::to_string),
            exports: ExportSet {
                store: self.id,
                items,
            },
        })
    }

    fn check_import(&self, import: &str, declared: &ExternType, provided: &Extern) -> Result<()> {
        let actual = provided.ty(&self.store);
        let compatible = match (declared, &actual) {
            (ExternType::Func(want), ExternType::Func(have)) => have.matches(want),
            (ExternType::Global(want), ExternType::Global(have)) => globals_match(want, have),
            // limits are checked by the engine
            (ExternType::Memory(_), ExternType::Memory(_))
            | (ExternType::Table(_), ExternType::Table(_)) => true,
            _ => false,
        };

        if compatible {
            return Ok(());
        }

        Err(Error::TypeMismatch {
            import: import.to_string(),
            expected: Described(declared).to_string(),
            actual: Described(&actual).to_string(),
        })
    }

    pub(crate) fn owns(&self, instance: &Instance) -> bool {
        instance.store == self.id
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store<()> {
        &mut self.store
    }

    pub fn write_memory(
        &mut self,
        instance: &Instance,
        export: &str,
        offset: usize,
        bytes: &[u8],
    ) -> std::result::Result<(), MemoryError> {
        let memory = self.memory(instance, export)?;
        let size = memory.data_size(&self.store);
        memory
            .write(&mut self.store, offset, bytes)
            .map_err(|_| MemoryError::OutOfBounds {
                offset,
                len: bytes.len(),
                size,
            })
    }

    pub fn read_memory(
        &mut self,
        instance: &Instance,
        export: &str,
        offset: usize,
        len: usize,
    ) -> std::result::Result<Vec<u8>, MemoryError> {
        let memory = self.memory(instance, export)?;
        let size = memory.data_size(&self.store);
        let mut buf = vec![0u8; len];
        memory
            .read(&self.store, offset, &mut buf)
            .map_err(|_| MemoryError::OutOfBounds { offset, len, size })?;
        Ok(buf)
    }

    /// Store `values` as little-endian f64s starting at element `index` (byte offset `index * 8`).
    pub fn write_f64s(
        &mut self,
        instance: &Instance,
        export: &str,
        index: usize,
        values: &[f64],
    ) -> std::result::Result<(), MemoryError> {
        let bytes = values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<u8>>();
        self.write_memory(instance, export, index * size_of::<f64>(), &bytes)
    }

    fn memory(&self, instance: &Instance, export: &str) -> std::result::Result<Memory, MemoryError> {
        if !self.owns(instance) {
            return Err(MemoryError::ForeignInstance);
        }

        instance
            .exports()
            .get(export)
            .and_then(|e| e.clone().into_memory())
            .ok_or_else(|| MemoryError::NotFound(export.to_string()))
    }
}

/// Immutable globals may be subtypes of the declaration, mutable ones must be identical.
fn globals_match(want: &GlobalType, have: &GlobalType) -> bool {
    if want.mutability() != have.mutability() {
        return false;
    }

    match want.mutability() {
        Mutability::Const => have.content().matches(want.content()),
        Mutability::Var => {
            have.content().matches(want.content()) && want.content().matches(have.content())
        }
    }
}

/// Short human readable form of an extern type for error messages.
struct Described<'a>(&'a ExternType);

impl Display for Described<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            ExternType::Func(ty) => write!(f, "func {}", Signature(ty)),
            ExternType::Memory(_) => write!(f, "memory"),
            ExternType::Table(_) => write!(f, "table"),
            ExternType::Global(ty) => match ty.mutability() {
                Mutability::Const => write!(f, "global {}", type_name(ty.content())),
                Mutability::Var => write!(f, "global mut {}", type_name(ty.content())),
            },
            _ => write!(f, "{:?}", self.0),
        }
    }
}

pub(crate) struct Signature<'a>(pub(crate) &'a FuncType);

impl Display for Signature<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let params = self.0.params().map(|t| type_name(&t)).collect::<Vec<_>>();
        let results = self.0.results().map(|t| type_name(&t)).collect::<Vec<_>>();
        write!(f, "({}) -> ({})", params.join(", "), results.join(", "))
    }
}
