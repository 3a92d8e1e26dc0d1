use psync_schemas::{
    CanonicalProduct, ProductImage, ProductStatus, SourceRecord, SourceSet, TagRef,
};

use crate::provenance::{ProvenanceIndex, RecordTable};
use crate::resolve::{resolve_cheapest, resolve_preferred, FieldPreferences};
use crate::tier::PriceTiers;

/// Everything the merge needs besides the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    pub preferences: FieldPreferences,
    pub tiers: PriceTiers,
    /// Fraction applied after tiering: `tiered * (1 + tax)`.
    pub tax: f64,
    /// Marker attached to every canonical product.
    pub managed_tag: TagRef,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            preferences: FieldPreferences::default(),
            tiers: PriceTiers::default(),
            tax: 0.0,
            managed_tag: TagRef { id: 790 },
        }
    }
}

fn name_of(r: &SourceRecord) -> Option<&String> {
    r.name.as_ref()
}

fn description_of(r: &SourceRecord) -> Option<&String> {
    r.description.as_ref()
}

fn images_of(r: &SourceRecord) -> Option<&Vec<ProductImage>> {
    Some(&r.images)
}

/// One canonical product per distinct sku, in first-encounter order.
pub fn reconcile(sources: &SourceSet, settings: &MergeSettings) -> Vec<CanonicalProduct> {
    let index = ProvenanceIndex::build(sources);
    let table = RecordTable::build(sources);

    index
        .skus()
        .filter_map(|sku| merge_one(sku, index.provenance(sku), &table, settings))
        .collect()
}

/// Resolve every field of `sku` independently. `None` only when no source in
/// `provenance` actually carries the sku.
pub fn merge_one(
    sku: &str,
    provenance: &[String],
    table: &RecordTable<'_>,
    settings: &MergeSettings,
) -> Option<CanonicalProduct> {
    let offer = resolve_cheapest(sku, provenance, table)?;
    let prefs = &settings.preferences;

    let regular_price = settings.tiers.apply(offer.raw_price) * (1.0 + settings.tax);

    Some(CanonicalProduct {
        sku: sku.to_string(),
        name: resolve_preferred(sku, provenance, table, &prefs.name, name_of),
        description: resolve_preferred(sku, provenance, table, &prefs.description, description_of),
        stock: offer.stock,
        categories: offer.categories,
        regular_price,
        images: resolve_preferred(sku, provenance, table, &prefs.images, images_of),
        tags: vec![settings.managed_tag],
        status: ProductStatus::Pending,
    })
}
