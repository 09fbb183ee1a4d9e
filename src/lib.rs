//! Protean - tag-dispatch algorithm resolution
//!
//! Generic algorithms (`fold`, `transform`, `find_if`, `equal`, `plus`,
//! ...) defined once, resolved per call against an immutable registry
//! keyed by the tags of their arguments. Tags model concepts by supplying
//! a minimal primitive set; the rest of each concept's surface is derived.
//! Heterogeneous binary operations coerce through common tags, promoting
//! implicitly only along lossless embeddings. Compile-time-known values
//! travel as constant wrappers whose payload survives arithmetic and
//! comparison.
//!
//! ```
//! use protean::prelude::*;
//!
//! let registry = protean::bootstrap().unwrap();
//! let xs = vec_seq::of_i64(&[3, 1, 2]);
//! let sorted = registry.call("sort", &[xs]).unwrap();
//! assert_eq!(sorted, vec_seq::of_i64(&[1, 2, 3]));
//!
//! let eq = registry
//!     .call("equal", &[integral::int_const(5), integral::long_const(5)])
//!     .unwrap();
//! assert_eq!(registry.value(&eq).unwrap(), Value::Bool(true));
//! ```

pub use protean_adapt as adapt;
pub use protean_concepts as concepts;
pub use protean_core as engine;

pub use protean_core::{
    BuildError, ConceptDef, DispatchError, Provenance, Registry,
    RegistryBuilder, ResolutionInfo, Tag, Value,
};

/// Build the standard registry: the constant bridge, every concept, and
/// the bundled adapters, finalized and ready for dispatch.
pub fn bootstrap() -> Result<Registry, BuildError> {
    let mut builder = RegistryBuilder::new();
    protean_core::constant::install(&mut builder)?;
    protean_concepts::install(&mut builder)?;
    protean_adapt::install(&mut builder)?;
    builder.finalize()
}

/// The common imports for working with the engine
pub mod prelude {
    pub use crate::bootstrap;
    pub use protean_adapt::{integral, minimal, vec_seq};
    pub use protean_core::functional;
    pub use protean_core::{
        DispatchError, Provenance, Registry, RegistryBuilder, Tag, Value,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_finalizes() {
        let registry = bootstrap().unwrap();
        assert!(registry.algorithms().count() > 30);
        assert!(registry.concepts().count() >= 10);
    }
}
