//! Example grammars built on the combinators in this crate.
//!
//! These exist to show how a complete grammar is put together, and double as end-to-end
//! tests of the engine.

pub mod arith;
