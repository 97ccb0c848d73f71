#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Semantic checker for explicit interface implementation markers.
//!
//! Every member that satisfies an interface member on a class or struct must
//! be tagged with `[Impl<...>]` naming the interface it implements. The
//! checker consumes an already-resolved [`symbols::SymbolModel`] and reports
//! rule EN0000 for each implementing member missing its marker.

pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod lint;
pub mod logging;
pub mod symbols;

pub use error::{Error, Result};
pub use lint::{LintOptions, LintReport, check_program, check_type};
pub use symbols::{SymbolGraph, SymbolGraphBuilder, SymbolModel};
