//! A destination product without the managed tag is neither updated nor
//! recreated, no matter what the suppliers say.

use psync_reconcile::{diff, Decision, SkipReason};
use psync_schemas::ManagedTag;
use psync_testkit::{managed, overridden, products};

#[test]
fn scenario_mixed_catalog_partitions_exactly() {
    let desired = products(&["123", "124", "999"]);
    let existing = vec![overridden(1, "123"), managed(2, "124")];

    let plan = diff(&desired, &existing, &ManagedTag::default());
    let decisions: Vec<(&str, Decision)> = plan.decisions().collect();

    assert_eq!(
        decisions,
        vec![
            ("123", Decision::Skip(SkipReason::ManualOverride)),
            ("124", Decision::Update { destination_id: Some(2) }),
            ("999", Decision::Create),
        ]
    );
    assert_eq!(plan.summary().create + plan.summary().update + plan.summary().skip, 3);
}

#[test]
fn scenario_override_is_stable_across_runs() {
    let desired = products(&["123"]);
    let existing = vec![overridden(1, "123")];

    for _ in 0..3 {
        let plan = diff(&desired, &existing, &ManagedTag::default());
        assert!(plan.is_noop());
        assert_eq!(plan.skip.len(), 1);
    }
}
