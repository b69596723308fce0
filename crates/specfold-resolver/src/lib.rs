//! Constraint normalization engine: collects package specs from many
//! requirement sources, reduces each package to its canonical predicate set,
//! merges provenance, and reports unsatisfiable combinations.

pub mod conflict;
mod normalize;
pub mod spec_set;

pub use conflict::{Conflict, ConflictReport};
pub use spec_set::SpecSet;
