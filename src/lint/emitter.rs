use crate::diagnostics::{Diagnostic, Label, Span};

use super::MISSING_IMPL_MARKER;

/// One deficient (type, interface member) pair, ready to be reported.
#[derive(Clone, Debug)]
pub struct MissingMarker<'a> {
    pub type_name: &'a str,
    pub member_name: &'a str,
    pub interface_name: &'a str,
    /// Namespace-qualified interface name for the labels.
    pub interface_qualified_name: &'a str,
    /// Declaration of the implementing member.
    pub member_span: Option<Span>,
    /// Declaration of the checked type; used when the member has no span.
    pub type_span: Option<Span>,
    /// Declaration of the interface member being implemented.
    pub interface_member: Option<(&'a str, Span)>,
}

/// Build the EN0000 diagnostic for a missing marker.
#[must_use]
pub fn emit(missing: &MissingMarker<'_>) -> Diagnostic {
    let message = format!(
        "{}.{} missing explicit [Impl<{}>] decorator",
        missing.type_name, missing.member_name, missing.interface_name
    );
    let location = missing.member_span.or(missing.type_span);
    let mut diagnostic = Diagnostic::error(message, location)
        .with_code(MISSING_IMPL_MARKER.diagnostic_code())
        .with_primary_label(format!(
            "implements `{}`",
            missing.interface_qualified_name
        ));
    if missing.member_span.is_none() && missing.type_span.is_some() {
        diagnostic.add_note(format!(
            "`{}` has no declaration site; reported at `{}`",
            missing.member_name, missing.type_name
        ));
    }
    if let Some((name, span)) = missing.interface_member {
        diagnostic = diagnostic.with_secondary(Label::secondary(
            span,
            format!("`{}.{name}` declared here", missing.interface_qualified_name),
        ));
    }
    diagnostic
}
