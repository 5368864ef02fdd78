// In: src/ffi/binder.rs

//! Loads the engine once per process and serializes every call into it.
//!
//! The engine is not assumed to be reentrant, so all entry points (frees
//! included) go through `BoundLibrary::serialized`, which holds a single
//! process-wide lock for the duration of the foreign call.

use super::locator;
use super::symbols::Symbols;
use crate::config::ClientConfig;
use crate::error::{Result, TdtpError};
use libloading::Library;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Instant;

static CALL_LOCK: Mutex<()> = Mutex::new(());

fn binding_slot() -> &'static Mutex<Option<Arc<BoundLibrary>>> {
    static BINDING_SLOT: OnceLock<Mutex<Option<Arc<BoundLibrary>>>> = OnceLock::new();
    BINDING_SLOT.get_or_init(|| Mutex::new(None))
}

/// The engine's poisoned-lock state carries no Rust invariants, so recover it.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

/// A resolved symbol table together with the library that backs it.
pub struct BoundLibrary {
    symbols: Symbols,
    path: Option<PathBuf>,
    // Declared last so the symbols are never observable after unloading.
    _library: Option<Library>,
}

impl std::fmt::Debug for BoundLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_serialize = self.symbols.j_serialize_value.is_some();
        f.debug_struct("BoundLibrary")
            .field("path", &self.path)
            .field("has_serialize_value", &has_serialize)
            .finish()
    }
}

impl BoundLibrary {
    /// The process-wide binding, configured from the environment on first use.
    pub fn global() -> Result<Arc<BoundLibrary>> {
        Self::global_with(&ClientConfig::from_env())
    }

    /// The process-wide binding.
    ///
    /// The first caller's `config` decides which library is loaded. Later
    /// callers get the same binding, unless they name an explicit
    /// `library_path`: a missing file fails with `LibraryNotFound`, and a
    /// different file fails with `AlreadyBound`.
    pub fn global_with(config: &ClientConfig) -> Result<Arc<BoundLibrary>> {
        // Hold the slot lock across loading to prevent double initialization.
        let mut slot = lock_ignoring_poison(binding_slot());
        if let Some(existing) = slot.as_ref() {
            existing.check_reuse(config)?;
            return Ok(Arc::clone(existing));
        }
        let bound = Arc::new(Self::load(config)?);
        *slot = Some(Arc::clone(&bound));
        Ok(bound)
    }

    /// Locates, loads and binds a fresh (non-global) instance.
    pub fn load(config: &ClientConfig) -> Result<BoundLibrary> {
        if config.verbose_logging {
            crate::observability::enable_verbose_logging(None)?;
        }
        let path = locator::locate(config)?;
        // SAFETY: loading runs the library's initializers; the located file is
        // trusted to be a TDTP engine build.
        let library = unsafe { Library::new(&path) }.map_err(|source| TdtpError::LibraryLoad {
            path: path.clone(),
            source,
        })?;
        unsafe { Self::bind(library, path) }
    }

    /// Resolves every entry point from an already loaded library.
    ///
    /// # Safety
    /// The library must export the signatures declared in `ffi::symbols`.
    pub unsafe fn bind(library: Library, path: PathBuf) -> Result<BoundLibrary> {
        let symbols = Symbols::resolve(&library)?;
        log::info!("bound TDTP engine at {}", path.display());
        Ok(Self {
            symbols,
            path: Some(path),
            _library: Some(library),
        })
    }

    /// Wraps a symbol table whose functions are linked into this process.
    ///
    /// # Safety
    /// Every pointer in `symbols` must honor the engine's ABI contract.
    pub unsafe fn from_symbols(symbols: Symbols) -> BoundLibrary {
        Self {
            symbols,
            path: None,
            _library: None,
        }
    }

    /// Whether a request for `config` may share this binding.
    fn check_reuse(&self, config: &ClientConfig) -> Result<()> {
        if config.library_path.is_none() {
            return Ok(());
        }
        let requested = locator::locate_from(config, None)?;
        let bound = self.path.as_deref();
        if bound.is_some_and(|b| same_file(b, &requested)) {
            return Ok(());
        }
        let bound = match bound {
            Some(path) => path.display().to_string(),
            None => "an in-process engine".to_string(),
        };
        Err(TdtpError::AlreadyBound { bound, requested })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Runs `call` while holding the process-wide engine lock.
    ///
    /// `call` must not re-enter `serialized`; the lock is not reentrant.
    pub fn serialized<T>(&self, symbol: &'static str, call: impl FnOnce(&Symbols) -> T) -> T {
        let _guard = lock_ignoring_poison(&CALL_LOCK);
        let started = Instant::now();
        let out = call(&self.symbols);
        log_metric!(
            "event" = "engine_call",
            "symbol" = symbol,
            "elapsed_us" = started.elapsed().as_micros()
        );
        out
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
