#![no_main]

use chrono::{DateTime, Utc};
use libfuzzer_sys::fuzz_target;
use wgtree_core::graph::integrity;
use wgtree_core::graph::preview::preview_move;
use wgtree_core::graph::{HierarchyPolicy, HierarchyValidator};
use wgtree_core::snapshot::Snapshot;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = Snapshot::from_json(text, DateTime::<Utc>::UNIX_EPOCH) else {
        return;
    };
    let Ok(graph) = snapshot.graph() else {
        return;
    };

    let policy = HierarchyPolicy::default();
    let validator = HierarchyValidator::new(&graph, policy);
    let _ = integrity::check(&graph, &policy);

    let nodes: Vec<_> = graph.nodes().take(16).collect();
    for subject in &nodes {
        let parents = validator
            .list_valid_parents(subject)
            .expect("subject comes from the graph");
        assert!(parents.iter().all(|p| p.id != subject.id));

        for candidate in &nodes {
            let verdict = validator
                .can_move(subject, Some(candidate))
                .expect("both come from the graph");
            if verdict.is_allowed() {
                let chain = graph.ancestor_chain(candidate);
                assert!(chain.is_complete() && !chain.contains(subject.id));
                assert!(graph.first_unloaded(subject.id).is_none());
                let preview = preview_move(&graph, subject.id, Some(candidate.id))
                    .expect("both come from the graph");
                assert!(preview.deepest() <= policy.max_depth);
            }
        }
    }
});
