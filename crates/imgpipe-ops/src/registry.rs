//! Operation registry.
//!
//! The registry maps human-readable names to [`Operation`] handlers and
//! keeps registration order for listings. It is the only thing the
//! pipeline needs from the operation side: name lookup, invocation, and the
//! list of enum tables the operations declare.
//!
//! # Example
//!
//! ```rust
//! use imgpipe_ops::OperationRegistry;
//!
//! let registry = OperationRegistry::builtin();
//! assert!(registry.contains("Gaussian Blur"));
//!
//! for name in registry.names() {
//!     println!("Operation: {}", name);
//! }
//! ```

use crate::builtin;
use crate::Operation;
use imgpipe_core::EnumType;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Central registry of image operations.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: Vec<Arc<dyn Operation>>,
    by_name: HashMap<&'static str, usize>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in operations.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Returns the shared registry with the built-in operations.
    pub fn global() -> &'static OperationRegistry {
        static INSTANCE: OnceLock<OperationRegistry> = OnceLock::new();
        INSTANCE.get_or_init(OperationRegistry::builtin)
    }

    /// Registers an operation. A handler with the same name is replaced in
    /// place, keeping its listing position.
    pub fn register<O: Operation + 'static>(&mut self, op: O) -> &mut Self {
        self.register_arc(Arc::new(op))
    }

    /// Registers a shared operation handle.
    pub fn register_arc(&mut self, op: Arc<dyn Operation>) -> &mut Self {
        let name = op.name();
        match self.by_name.get(name) {
            Some(&idx) => {
                debug!(name, "Replacing registered operation");
                self.ops[idx] = op;
            }
            None => {
                debug!(name, "Registering operation");
                self.by_name.insert(name, self.ops.len());
                self.ops.push(op);
            }
        }
        self
    }

    /// Looks an operation up by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.by_name.get(name).map(|&idx| &self.ops[idx])
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.iter().map(|op| op.name())
    }

    /// Operations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.ops.iter()
    }

    /// Enum tables referenced by any registered schema, in registration
    /// order, each listed once.
    pub fn enum_types(&self) -> Vec<&'static EnumType> {
        let mut out: Vec<&'static EnumType> = Vec::new();
        for op in &self.ops {
            for ty in op.schema().enum_types() {
                if !out.iter().any(|known| known.name() == ty.name()) {
                    out.push(ty);
                }
            }
        }
        out
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpsResult;
    use imgpipe_core::{Image, ParamMap, ParamSchema};

    struct Named(&'static str, u8, ParamSchema);

    impl Operation for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn schema(&self) -> &ParamSchema {
            &self.2
        }
        fn process(&self, image: &Image, _params: &ParamMap) -> OpsResult<Image> {
            Ok(Image::filled(image.width(), image.height(), image.channels(), self.1)?)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = OperationRegistry::new();
        registry
            .register(Named("A", 1, ParamSchema::new()))
            .register(Named("B", 2, ParamSchema::new()));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("A"));
        assert!(registry.get("C").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = OperationRegistry::new();
        registry
            .register(Named("A", 1, ParamSchema::new()))
            .register(Named("B", 2, ParamSchema::new()))
            .register(Named("A", 9, ParamSchema::new()));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["A", "B"]);

        let img = Image::new(1, 1, 1).unwrap();
        let out = registry.get("A").unwrap().process(&img, &ParamMap::new()).unwrap();
        assert_eq!(out.data(), &[9]);
    }

    #[test]
    fn test_builtin_enum_types_deduplicated() {
        let registry = OperationRegistry::builtin();
        let names: Vec<&str> = registry.enum_types().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["BorderType", "ThresholdType", "MorphShape", "Interpolation"]
        );
    }

    #[test]
    fn test_global_is_builtin() {
        assert_eq!(
            OperationRegistry::global().len(),
            OperationRegistry::builtin().len()
        );
    }
}
