//! Leaf collaborators
//!
//! Concrete tag families plugged into the dispatch engine: the plain
//! scalar tags with their declared common types and conversions, integral
//! constant wrappers, a vector-backed sequence, and two deliberately
//! minimal families used to exercise alternative minimal definitions.
//! None of these contain engine logic; they only declare tags and register
//! implementation records.

pub mod foreign;
pub mod integral;
pub mod minimal;
pub mod vec_seq;

use protean_core::{BuildError, RegistryBuilder};

/// Register every adapter
pub fn install(builder: &mut RegistryBuilder) -> Result<(), BuildError> {
    foreign::install(builder)?;
    vec_seq::install(builder)?;
    minimal::install(builder)?;
    Ok(())
}
