use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use implcheck::diagnostics::{FileId, Span};
use implcheck::lint::IMPL_ATTRIBUTE_METADATA_NAME;
use implcheck::symbols::{Attribute, MemberDecl, MetadataName, TypeDecl};
use implcheck::{LintOptions, SymbolGraph, SymbolGraphBuilder, check_program};

/// A flat program: an interface hierarchy three deep, implemented by
/// `count` classes that each mark one member in four.
fn synthetic_program(count: usize) -> SymbolGraph {
    let marker = MetadataName::parse(IMPL_ATTRIBUTE_METADATA_NAME);
    let mut builder = SymbolGraphBuilder::new();
    let root = builder.add_type(TypeDecl::interface("Root").in_namespace("Bench"));
    builder.add_member(root, MemberDecl::method("Open", "()"));
    let middle = builder.add_type(TypeDecl::interface("Middle").in_namespace("Bench"));
    builder.implement(middle, root);
    builder.add_member(middle, MemberDecl::method("Close", "(bool)"));
    let leaf = builder.add_type(TypeDecl::interface("Leaf").in_namespace("Bench"));
    builder.implement(leaf, middle);
    builder.add_member(leaf, MemberDecl::property("Length", "int"));
    let interfaces = [(root, "Open", "()"), (middle, "Close", "(bool)")];

    for index in 0..count {
        let base = index * 64;
        let span = |start: usize| Span::in_file(FileId(index % 16), base + start, base + start + 4);
        let ty = builder.add_type(TypeDecl::class(format!("Widget{index}")).at(span(0)));
        builder.implement(ty, leaf);
        for (slot, (interface, name, signature)) in interfaces.into_iter().enumerate() {
            let mut member = MemberDecl::method(name, signature).at(span(8 + slot * 8));
            if (index + slot) % 4 == 0 {
                member = member.with_attribute(Attribute::new(marker.clone(), [interface]));
            }
            builder.add_member(ty, member);
        }
        builder.add_member(ty, MemberDecl::property("Length", "int").at(span(40)));
    }
    match builder.finish() {
        Ok(graph) => graph,
        Err(err) => panic!("synthetic graph is invalid: {err}"),
    }
}

fn bench_check_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_program");
    for count in [100usize, 1_000, 10_000] {
        let graph = synthetic_program(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("sequential", count), &graph, |b, graph| {
            let options = LintOptions::default().with_parallelism(1);
            b.iter(|| black_box(check_program(graph, &options)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", count), &graph, |b, graph| {
            let options = LintOptions::default();
            b.iter(|| black_box(check_program(graph, &options)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_check_program);
criterion_main!(benches);
