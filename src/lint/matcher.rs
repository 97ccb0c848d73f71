use crate::symbols::{MemberId, MetadataName, SymbolModel, TypeId};

/// Does `member` (or, for an accessor, its owning property) carry a marker
/// of class `marker` with `interface` among its type arguments?
///
/// Both the marker class and the interface are compared by identity. The
/// marker's arity and the position of `interface` in its argument list do
/// not matter.
pub fn has_marker_for<M: SymbolModel + ?Sized>(
    model: &M,
    member: MemberId,
    interface: TypeId,
    marker: &MetadataName,
) -> bool {
    let names_interface = |candidate: MemberId| {
        model.attributes_of(candidate).iter().any(|attribute| {
            attribute.class == *marker && attribute.type_arguments.contains(&interface)
        })
    };
    names_interface(member) || model.owning_property_of(member).is_some_and(names_interface)
}
