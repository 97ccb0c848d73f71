use crate::diagnostics::Diagnostic;
use crate::symbols::{SymbolModel, TypeId};

use super::LintOptions;
use super::emitter::{MissingMarker, emit};
use super::matcher::has_marker_for;

/// Check one type: every member of every interface in its transitive set
/// must resolve to an implementation carrying a marker for that interface.
///
/// Interfaces themselves are not checked. Interface members the type does
/// not implement are skipped.
pub fn check_type<M: SymbolModel + ?Sized>(
    model: &M,
    ty: TypeId,
    options: &LintOptions,
) -> Vec<Diagnostic> {
    if model.type_kind(ty).is_interface() {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for &interface in model.transitive_interfaces(ty) {
        for &interface_member in model.members_of(interface) {
            let Some(implementation) = model.resolve_implementation(ty, interface_member) else {
                tracing::trace!(
                    target: "lint",
                    ty = model.type_name(ty),
                    member = model.member_name(interface_member),
                    "interface member not implemented; skipped"
                );
                continue;
            };
            if has_marker_for(model, implementation, interface, &options.marker) {
                continue;
            }
            let interface_qualified_name = model.qualified_type_name(interface);
            diagnostics.push(emit(&MissingMarker {
                type_name: model.type_name(ty),
                member_name: model.member_name(implementation),
                interface_name: model.type_name(interface),
                interface_qualified_name: &interface_qualified_name,
                member_span: model.member_span(implementation),
                type_span: model.type_span(ty),
                interface_member: model
                    .member_span(interface_member)
                    .map(|span| (model.member_name(interface_member), span)),
            }));
        }
    }
    tracing::trace!(
        target: "lint",
        ty = model.type_name(ty),
        diagnostics = diagnostics.len(),
        "checked type"
    );
    diagnostics
}
