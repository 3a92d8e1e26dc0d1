//! Destination skus that do not coerce to an integer are excluded from the
//! join: they never block a create and never produce an update.

use psync_reconcile::{diff, ExistingCatalog};
use psync_schemas::ManagedTag;
use psync_testkit::{managed, overridden, products};

#[test]
fn scenario_garbage_destination_sku_does_not_block_create() {
    let existing = vec![managed(1, "ABC-123"), overridden(2, "")];
    let plan = diff(&products(&["123"]), &existing, &ManagedTag::default());

    assert_eq!(plan.summary().create, 1);
    assert_eq!(plan.summary().update, 0);
    assert_eq!(plan.summary().skip, 0);
}

#[test]
fn scenario_non_numeric_desired_sku_is_always_created() {
    let existing = vec![managed(1, "ABC-123")];
    let plan = diff(&products(&["ABC-123"]), &existing, &ManagedTag::default());
    assert_eq!(plan.summary().create, 1);
}

#[test]
fn scenario_unmatchable_count_is_reported() {
    let existing = vec![managed(1, "x"), managed(2, "y"), managed(3, "3")];
    let catalog = ExistingCatalog::from_snapshot(&existing, &ManagedTag::default());
    assert_eq!(catalog.unmatchable(), 2);
    assert_eq!(catalog.len(), 1);
}
