use psync_schemas::CanonicalProduct;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ManualOverride,
}

/// Outcome for one desired product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Create,
    /// `destination_id` addresses the existing record in batch updates.
    Update { destination_id: Option<u64> },
    Skip(SkipReason),
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update { .. } => "update",
            Self::Skip(_) => "skip",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedUpdate {
    pub destination_id: Option<u64>,
    pub product: CanonicalProduct,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedProduct {
    pub sku: String,
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
}

/// Desired products partitioned by decision, each partition in desired order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogPlan {
    pub create: Vec<CanonicalProduct>,
    pub update: Vec<PlannedUpdate>,
    pub skip: Vec<SkippedProduct>,
    decisions: Vec<(String, Decision)>,
}

impl CatalogPlan {
    pub(crate) fn record(&mut self, product: &CanonicalProduct, decision: Decision) {
        self.decisions.push((product.sku.clone(), decision));
        match decision {
            Decision::Create => self.create.push(product.clone()),
            Decision::Update { destination_id } => self.update.push(PlannedUpdate {
                destination_id,
                product: product.clone(),
            }),
            Decision::Skip(reason) => self.skip.push(SkippedProduct {
                sku: product.sku.clone(),
                reason,
            }),
        }
    }

    /// `(sku, decision)` for every desired product, in desired order.
    pub fn decisions(&self) -> impl Iterator<Item = (&str, Decision)> {
        self.decisions.iter().map(|(sku, d)| (sku.as_str(), *d))
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.create.len(),
            update: self.update.len(),
            skip: self.skip.len(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty()
    }
}
