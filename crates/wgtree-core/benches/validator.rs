use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use wgtree_core::graph::integrity;
use wgtree_core::graph::{HierarchyPolicy, HierarchyValidator, WorkgroupGraph};
use wgtree_core::model::{MAX_DEPTH, WorkgroupId, WorkgroupNode};

const TIERS: [(&str, usize); 3] = [("small", 100), ("medium", 1_000), ("large", 10_000)];

/// Balanced forest: each node's parent is `(i - 1) / fanout` until the
/// depth limit, after which a new root starts.
fn synthetic_forest(size: usize, fanout: usize) -> WorkgroupGraph {
    let mut nodes: Vec<WorkgroupNode> = Vec::with_capacity(size);
    for i in 0..size {
        let id = WorkgroupId(i64::try_from(i).expect("bench size fits i64") + 1);
        let parent = (i > 0)
            .then(|| (i - 1) / fanout)
            .filter(|&p| nodes[p].depth < MAX_DEPTH);
        let (parent_id, depth) = match parent {
            Some(p) => (Some(nodes[p].id), nodes[p].depth + 1),
            None => (None, 1),
        };
        nodes.push(WorkgroupNode::new(id, format!("wg-{i}"), parent_id, depth));
    }
    WorkgroupGraph::from_nodes(nodes).expect("unique ids")
}

fn bench_validator(c: &mut Criterion) {
    let mut group = c.benchmark_group("validator.tiered");
    let policy = HierarchyPolicy::default();

    for (name, size) in TIERS {
        let graph = synthetic_forest(size, 4);
        let validator = HierarchyValidator::new(&graph, policy);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::new("build_graph", name),
            &size,
            |b, &size| b.iter(|| black_box(synthetic_forest(size, 4))),
        );

        group.bench_with_input(
            BenchmarkId::new("list_valid_parents.leaf", name),
            &graph,
            |b, graph| {
                let leaf = graph.nodes().last().expect("non-empty forest");
                b.iter(|| black_box(validator.list_valid_parents(leaf)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("list_valid_parents.root", name),
            &graph,
            |b, graph| {
                let root = graph.roots().next().expect("non-empty forest");
                b.iter(|| black_box(validator.list_valid_parents(root)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("integrity_check", name),
            &graph,
            |b, graph| b.iter(|| black_box(integrity::check(graph, &policy))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_validator);
criterion_main!(benches);
