//! Explicit-implementation marker rule (EN0000).
//!
//! Every member that satisfies an interface member on a concrete type must
//! carry an `[Impl<...>]` marker naming that interface, either on itself or,
//! for accessors, on the owning property. The walker visits one type at a
//! time; the driver fans the walk out across worker threads.

mod descriptor;
mod driver;
mod emitter;
mod matcher;
mod walker;

#[cfg(test)]
mod tests;

pub use descriptor::{LintCategory, LintDescriptor};
pub use driver::{LintReport, check_program};
pub use emitter::{MissingMarker, emit};
pub use matcher::has_marker_for;
pub use walker::check_type;

use crate::diagnostics::Severity;
use crate::symbols::MetadataName;

/// Metadata name of the marker attribute, without generic arity.
pub const IMPL_ATTRIBUTE_METADATA_NAME: &str = "System.Runtime.CompilerServices.ImplAttribute";

pub static MISSING_IMPL_MARKER: LintDescriptor = LintDescriptor {
    code: "EN0000",
    name: "missing_impl_marker",
    title: "Missing Explicit Interface Declaration",
    description: "members that implement an interface must carry an [Impl<...>] marker naming it",
    category: LintCategory::Usage,
    severity: Severity::Error,
};

#[must_use]
pub fn descriptors() -> &'static [LintDescriptor] {
    std::slice::from_ref(&MISSING_IMPL_MARKER)
}

/// Look a rule up by name (`missing-impl-marker`, `missing_impl_marker`)
/// or by code (`EN0000`, case-insensitive).
#[must_use]
pub fn find_descriptor(name: &str) -> Option<&'static LintDescriptor> {
    let canonical = canonical_lint_name(name);
    descriptors().iter().find(|descriptor| {
        descriptor.name == canonical || descriptor.code.eq_ignore_ascii_case(name.trim())
    })
}

pub(crate) fn canonical_lint_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .replace('-', "_")
        .to_ascii_lowercase()
}

/// Knobs for one checker run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintOptions {
    /// Attribute class recognized as the marker.
    pub marker: MetadataName,
    /// Worker threads for [`check_program`]. `None` uses the available
    /// parallelism; `Some(1)` runs on the calling thread.
    pub parallelism: Option<usize>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            marker: MetadataName::parse(IMPL_ATTRIBUTE_METADATA_NAME),
            parallelism: None,
        }
    }
}

impl LintOptions {
    #[must_use]
    pub fn with_marker(mut self, marker: MetadataName) -> Self {
        self.marker = marker;
        self
    }

    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }
}
