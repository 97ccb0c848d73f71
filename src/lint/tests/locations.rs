use crate::diagnostics::{FileId, Span};
use crate::lint::{IMPL_ATTRIBUTE_METADATA_NAME, LintOptions, check_program, check_type};
use crate::symbols::{
    Attribute, MemberDecl, MetadataName, SymbolGraph, SymbolGraphBuilder, SymbolModel, TypeDecl,
    TypeId,
};

fn file(index: usize, start: usize, end: usize) -> Span {
    Span::in_file(FileId(index), start, end)
}

fn marker(target: TypeId) -> Attribute {
    Attribute::new(MetadataName::parse(IMPL_ATTRIBUTE_METADATA_NAME), [target])
}

#[test]
fn diagnostic_points_at_implementing_member() {
    let mut builder = SymbolGraphBuilder::new();
    let disposable = builder.add_type(TypeDecl::interface("Disposable").at(file(1, 0, 10)));
    builder.add_member(
        disposable,
        MemberDecl::method("Dispose", "()").at(file(1, 20, 27)),
    );
    let t = builder.add_type(TypeDecl::class("T").at(file(0, 6, 7)));
    builder.implement(t, disposable);
    builder.add_member(t, MemberDecl::method("Dispose", "()").at(file(0, 30, 37)));
    let graph = builder.finish().expect("valid graph");

    let diagnostics = check_type(&graph, t, &LintOptions::default());
    let [diagnostic] = diagnostics.as_slice() else {
        panic!("one diagnostic expected, found {diagnostics:?}");
    };
    assert_eq!(diagnostic.span(), Some(file(0, 30, 37)));
    let secondary = &diagnostic.secondary_labels[0];
    assert_eq!(secondary.span, file(1, 20, 27));
    assert_eq!(secondary.message, "`Disposable.Dispose` declared here");
}

#[test]
fn member_without_span_falls_back_to_type() {
    let mut builder = SymbolGraphBuilder::new();
    let ia = builder.add_type(TypeDecl::interface("IA"));
    builder.add_member(ia, MemberDecl::method("Run", "()"));
    let t = builder.add_type(TypeDecl::class("T").at(file(0, 6, 7)));
    builder.implement(t, ia);
    builder.add_member(t, MemberDecl::method("Run", "()"));
    let u = builder.add_type(TypeDecl::class("U"));
    builder.implement(u, ia);
    builder.add_member(u, MemberDecl::method("Run", "()"));
    let graph = builder.finish().expect("valid graph");

    let report = check_program(&graph, &LintOptions::default());
    let spans: Vec<_> = report.diagnostics.iter().map(|d| d.span()).collect();
    assert_eq!(spans, [Some(file(0, 6, 7)), None]);
    assert_eq!(report.diagnostics[0].notes.len(), 1);
    assert!(report.diagnostics[0].secondary_labels.is_empty());
}

#[test]
fn interfaces_produce_no_diagnostics_when_checked_directly() {
    let mut builder = SymbolGraphBuilder::new();
    let ia = builder.add_type(TypeDecl::interface("IA"));
    builder.add_member(ia, MemberDecl::method("Run", "()"));
    let ib = builder.add_type(TypeDecl::interface("IB"));
    builder.implement(ib, ia);
    builder.add_member(ib, MemberDecl::method("Run", "()"));
    let graph = builder.finish().expect("valid graph");
    assert!(check_type(&graph, ib, &LintOptions::default()).is_empty());
}

#[test]
fn custom_marker_class_replaces_the_default() {
    let mut builder = SymbolGraphBuilder::new();
    let ia = builder.add_type(TypeDecl::interface("IA"));
    builder.add_member(ia, MemberDecl::method("Run", "()"));
    let t = builder.add_type(TypeDecl::class("T"));
    builder.implement(t, ia);
    builder.add_member(
        t,
        MemberDecl::method("Run", "()").with_attribute(Attribute::new(
            MetadataName::parse("Acme.ImplementsAttribute`1"),
            [ia],
        )),
    );
    let graph = builder.finish().expect("valid graph");

    assert_eq!(check_type(&graph, t, &LintOptions::default()).len(), 1);
    let options =
        LintOptions::default().with_marker(MetadataName::parse("Acme.ImplementsAttribute"));
    assert!(check_type(&graph, t, &options).is_empty());
}

/// `count` classes spread over `files` files, each implementing two
/// interfaces; every third class marks its members.
fn synthetic_program(count: usize, files: usize) -> SymbolGraph {
    let mut builder = SymbolGraphBuilder::new();
    let ia = builder.add_type(TypeDecl::interface("IA"));
    builder.add_member(ia, MemberDecl::method("Run", "()"));
    let ib = builder.add_type(TypeDecl::interface("IB"));
    builder.implement(ib, ia);
    builder.add_member(ib, MemberDecl::property("Value", "int"));
    for index in 0..count {
        let offset = index * 100;
        let ty = builder.add_type(
            TypeDecl::class(format!("C{index}")).at(file(index % files, offset, offset + 3)),
        );
        builder.implement(ty, ib);
        let mut run = MemberDecl::method("Run", "()").at(file(index % files, offset + 10, offset + 13));
        let mut value =
            MemberDecl::property("Value", "int").at(file(index % files, offset + 20, offset + 25));
        if index % 3 == 0 {
            run = run.with_attribute(marker(ia));
            value = value.with_attribute(marker(ib));
        }
        builder.add_member(ty, run);
        builder.add_member(ty, value);
    }
    builder.finish().expect("valid graph")
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let graph = synthetic_program(500, 7);
    let sequential = check_program(&graph, &LintOptions::default().with_parallelism(1));
    let parallel = check_program(&graph, &LintOptions::default().with_parallelism(8));
    let automatic = check_program(&graph, &LintOptions::default());

    assert_eq!(sequential.types_checked, 500);
    assert_eq!(sequential.diagnostics.len(), (500 - 167) * 2);
    assert_eq!(sequential.diagnostics, parallel.diagnostics);
    assert_eq!(sequential.diagnostics, automatic.diagnostics);
    assert!(sequential.has_errors());
    assert!(!sequential.is_clean());
}

#[test]
fn report_is_sorted_by_location() {
    let graph = synthetic_program(40, 3);
    let report = check_program(&graph, &LintOptions::default().with_parallelism(4));
    let keys: Vec<_> = report
        .diagnostics
        .iter()
        .filter_map(|d| d.span())
        .map(|span| (span.file_id.0, span.start, span.end))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert_eq!(keys.len(), report.diagnostics.len());
}

#[test]
fn empty_program_is_clean() {
    let graph = SymbolGraphBuilder::new().finish().expect("empty graph");
    let report = check_program(&graph, &LintOptions::default());
    assert!(report.is_clean());
    assert!(!report.has_errors());
    assert_eq!(report.types_checked, 0);
    assert!(graph.declared_types().is_empty());
}
