//! Deterministic fixtures for scenario tests.
//!
//! Only depends on `psync-schemas` so every crate can pull it in as a
//! dev-dependency without cycles.

use psync_schemas::{
    CanonicalProduct, Category, DestinationProduct, DestinationTag, ManagedTag, ProductImage,
    ProductStatus, SourceRecord, SourceSet, TagRef,
};

/// Bare record: no name/description/images/categories, stock 1.
pub fn record(source: &str, sku: &str, price: f64) -> SourceRecord {
    RecordBuilder::new(source, sku).price(price).build()
}

pub fn source_set(entries: Vec<(&str, Vec<SourceRecord>)>) -> SourceSet {
    let mut set = SourceSet::new();
    for (name, records) in entries {
        set.insert(name, records);
    }
    set
}

pub struct RecordBuilder {
    inner: SourceRecord,
}

impl RecordBuilder {
    pub fn new(source: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            inner: SourceRecord {
                source_name: source.into(),
                sku: sku.into(),
                name: None,
                description: None,
                stock: 1,
                categories: Vec::new(),
                regular_price: 1.0,
                images: Vec::new(),
            },
        }
    }

    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.inner.name = Some(v.into());
        self
    }

    pub fn description(mut self, v: impl Into<String>) -> Self {
        self.inner.description = Some(v.into());
        self
    }

    pub fn price(mut self, v: f64) -> Self {
        self.inner.regular_price = v;
        self
    }

    pub fn stock(mut self, v: u32) -> Self {
        self.inner.stock = v;
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.inner.categories.push(Category::named(name));
        self
    }

    pub fn image(mut self, src: impl Into<String>) -> Self {
        self.inner.images.push(ProductImage::new(src));
        self
    }

    pub fn build(self) -> SourceRecord {
        self.inner
    }
}

/// Canonical product carrying the default managed tag.
pub fn product(sku: &str) -> CanonicalProduct {
    CanonicalProduct {
        sku: sku.to_string(),
        name: Some(format!("Product {sku}")),
        description: None,
        stock: 1,
        categories: Vec::new(),
        regular_price: 10.0,
        images: None,
        tags: vec![ManagedTag::default().tag_ref()],
        status: ProductStatus::Pending,
    }
}

pub fn products(skus: &[&str]) -> Vec<CanonicalProduct> {
    skus.iter().map(|s| product(s)).collect()
}

/// Destination product that carries the default managed tag.
pub fn managed(id: u64, sku: &str) -> DestinationProduct {
    let tag = ManagedTag::default();
    DestinationProduct {
        id: Some(id),
        sku: sku.to_string(),
        tags: vec![DestinationTag {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }],
    }
}

/// Destination product edited by hand (no managed tag).
pub fn overridden(id: u64, sku: &str) -> DestinationProduct {
    DestinationProduct {
        id: Some(id),
        sku: sku.to_string(),
        tags: vec![DestinationTag {
            id: 12,
            name: "featured".to_string(),
            slug: "featured".to_string(),
        }],
    }
}

pub fn tag_ref(id: u64) -> TagRef {
    TagRef { id }
}
