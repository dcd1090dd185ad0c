//! Side-effect analysis for the mend quick-fix engine.
//!
//! When a fix must delete or relocate an expression that may have
//! observable effects, this crate answers two questions:
//!
//! 1. **What are the effects?** (`classify`) - pre-order classification
//!    of effectful fragments, with subsumption for effectful parents and
//!    guard structure for short-circuit operands.
//! 2. **How do we keep them?** (`extract_statements`) - synthesis of
//!    minimal standalone statements whose execution replays the original
//!    effect sequence, inserted before the deleted anchor.
//!
//! Both analyses are pure against the document and take the
//! language-defined effect predicates (`EffectPolicy`) as explicit
//! configuration.

mod classify;
mod extract;
mod policy;

pub use classify::{classify, Effect, EffectForest, EffectTree};
pub use extract::{extract_statements, ExtractError};
pub use policy::{DefaultPolicy, EffectPolicy, PolicyHandle};
