//! Registry for artifact backends.

use crate::traits::{Backend, BackendCategory};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global registry of backends.
static BACKENDS: RwLock<Vec<&'static dyn Backend>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom backend.
///
/// Call this before any generation operations to add custom backends.
/// Built-in backends are registered automatically on first use.
pub fn register_backend(backend: &'static dyn Backend) {
    init_builtin();
    BACKENDS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(backend);
}

/// Initialize built-in backends (called automatically on first use).
fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        let mut backends = BACKENDS.write().unwrap_or_else(PoisonError::into_inner);

        #[cfg(feature = "backend-json-schema")]
        {
            backends.push(&crate::output::jsonschema::JSON_SCHEMA_BACKEND);
        }

        #[cfg(feature = "backend-typescript")]
        {
            backends.push(&crate::output::typescript::TYPESCRIPT_BACKEND);
        }

        #[cfg(feature = "backend-helpers")]
        {
            backends.push(&crate::output::helpers::HELPERS_BACKEND);
        }

        #[cfg(feature = "backend-readme")]
        {
            backends.push(&crate::output::readme::README_BACKEND);
        }
    });
}

/// Get a backend by name.
pub fn get_backend(name: &str) -> Option<&'static dyn Backend> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|b| b.name() == name)
        .copied()
}

/// Get all backends in a category.
pub fn backends_by_category(category: BackendCategory) -> Vec<&'static dyn Backend> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .filter(|b| b.category() == category)
        .copied()
        .collect()
}

/// List all registered backends, in registration order.
pub fn backends() -> Vec<&'static dyn Backend> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// List all registered backend names.
pub fn backend_names() -> Vec<&'static str> {
    init_builtin();
    BACKENDS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|b| b.name())
        .collect()
}
