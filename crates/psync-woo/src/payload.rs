use psync_dispatch::OutboundProduct;
use psync_schemas::{Category, ProductImage, ProductStatus, TagRef};
use serde::{Deserialize, Serialize};

/// Product body in the shape the products API accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WooProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub manage_stock: bool,
    pub stock_quantity: u32,
    pub categories: Vec<Category>,
    /// The API takes prices as decimal strings.
    pub regular_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImage>>,
    pub tags: Vec<TagRef>,
    pub status: ProductStatus,
}

impl From<&OutboundProduct> for WooProduct {
    fn from(o: &OutboundProduct) -> Self {
        let p = &o.product;
        Self {
            id: o.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            manage_stock: true,
            stock_quantity: p.stock,
            categories: p.categories.clone(),
            regular_price: format!("{:.2}", p.regular_price),
            images: p.images.clone(),
            tags: p.tags.clone(),
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchItemError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One entry of a batch response list. Failed items carry `error`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BatchItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub error: Option<BatchItemError>,
}
