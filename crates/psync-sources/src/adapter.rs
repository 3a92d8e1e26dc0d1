//! Per-source column mapping.
//!
//! Every supplier publishes its own column names and number formats. An
//! adapter turns a [`RawTable`] into the fixed [`SourceRecord`] shape; the
//! registry picks the adapter by source name. Adding a supplier is a new
//! registry entry, not a new branch anywhere else.

use std::collections::BTreeMap;

use psync_schemas::{Category, ProductImage, SourceRecord};

use crate::table::RawTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("source '{source_name}' is missing mapped column '{column}'")]
    MissingColumn { source_name: String, column: String },
}

/// Records an adapter produced plus how many rows it had to drop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptOutcome {
    pub records: Vec<SourceRecord>,
    /// Rows with an empty sku or an unparseable stock/price.
    pub rejected: usize,
}

pub trait SourceAdapter: Send + Sync {
    fn source_name(&self) -> &str;

    fn adapt(&self, table: &RawTable) -> Result<AdaptOutcome, AdapterError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceFormat {
    /// `1234.56`
    #[default]
    Plain,
    /// `1.234,56`: dots group thousands, comma is the decimal mark.
    European,
}

impl PriceFormat {
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let value: f64 = match self {
            PriceFormat::Plain => raw.parse().ok()?,
            PriceFormat::European => raw.replace('.', "").replace(',', ".").parse().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColumns {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionColumn {
    Column(String),
    /// Supplier has no long description; reuse the name.
    SameAsName,
}

/// Column-renaming adapter. Covers every supplier seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub source_name: String,
    pub sku: String,
    pub name: String,
    pub description: DescriptionColumn,
    pub stock: String,
    pub price: String,
    pub price_format: PriceFormat,
    pub image: Option<String>,
    pub categories: Vec<CategoryColumns>,
}

impl ColumnMap {
    pub fn new(
        source_name: &str,
        sku: &str,
        name: &str,
        description: &str,
        stock: &str,
        price: &str,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: DescriptionColumn::Column(description.to_string()),
            stock: stock.to_string(),
            price: price.to_string(),
            price_format: PriceFormat::Plain,
            image: None,
            categories: Vec::new(),
        }
    }

    pub fn price_format(mut self, format: PriceFormat) -> Self {
        self.price_format = format;
        self
    }

    pub fn image(mut self, column: &str) -> Self {
        self.image = Some(column.to_string());
        self
    }

    pub fn description_same_as_name(mut self) -> Self {
        self.description = DescriptionColumn::SameAsName;
        self
    }

    pub fn category(mut self, id: Option<&str>, name: &str) -> Self {
        self.categories.push(CategoryColumns {
            id: id.map(str::to_string),
            name: name.to_string(),
        });
        self
    }

    fn require(&self, table: &RawTable, column: &str) -> Result<usize, AdapterError> {
        table
            .column_index(column)
            .ok_or_else(|| AdapterError::MissingColumn {
                source_name: self.source_name.clone(),
                column: column.to_string(),
            })
    }
}

struct ResolvedColumns {
    sku: usize,
    name: usize,
    description: Option<usize>,
    stock: usize,
    price: usize,
    image: Option<usize>,
    categories: Vec<(Option<usize>, usize)>,
}

impl SourceAdapter for ColumnMap {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn adapt(&self, table: &RawTable) -> Result<AdaptOutcome, AdapterError> {
        let cols = ResolvedColumns {
            sku: self.require(table, &self.sku)?,
            name: self.require(table, &self.name)?,
            description: match &self.description {
                DescriptionColumn::Column(c) => Some(self.require(table, c)?),
                DescriptionColumn::SameAsName => None,
            },
            stock: self.require(table, &self.stock)?,
            price: self.require(table, &self.price)?,
            image: self
                .image
                .as_deref()
                .map(|c| self.require(table, c))
                .transpose()?,
            categories: self
                .categories
                .iter()
                .map(|c| -> Result<(Option<usize>, usize), AdapterError> {
                    let id = c.id.as_deref().map(|i| self.require(table, i)).transpose()?;
                    Ok((id, self.require(table, &c.name)?))
                })
                .collect::<Result<Vec<_>, AdapterError>>()?,
        };

        let mut out = AdaptOutcome::default();
        for row in 0..table.len() {
            match self.map_row(table, row, &cols) {
                Some(record) => out.records.push(record),
                None => out.rejected += 1,
            }
        }
        Ok(out)
    }
}

impl ColumnMap {
    fn map_row(&self, table: &RawTable, row: usize, cols: &ResolvedColumns) -> Option<SourceRecord> {
        let sku = table.cell(row, cols.sku).trim();
        if sku.is_empty() {
            return None;
        }
        let stock = parse_stock(table.cell(row, cols.stock))?;
        let regular_price = self.price_format.parse(table.cell(row, cols.price))?;

        let name = non_blank(table.cell(row, cols.name));
        let description = match cols.description {
            Some(i) => non_blank(table.cell(row, i)),
            None => name.clone(),
        };
        let images = cols
            .image
            .and_then(|i| non_blank(table.cell(row, i)))
            .map(|src| vec![ProductImage::new(src)])
            .unwrap_or_default();
        let categories = cols
            .categories
            .iter()
            .filter_map(|(id, name)| {
                let id = id.and_then(|i| parse_integral(table.cell(row, i)));
                let name = table.cell(row, *name).trim();
                if id.is_none() && name.is_empty() {
                    None
                } else {
                    Some(Category::new(id, name))
                }
            })
            .collect();

        Some(SourceRecord {
            source_name: self.source_name.clone(),
            sku: sku.to_string(),
            name,
            description,
            stock,
            categories,
            regular_price,
            images,
        })
    }
}

fn non_blank(cell: &str) -> Option<String> {
    let t = cell.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Integers, or integral floats like `"12.0"` that spreadsheet exports emit.
fn parse_integral(cell: &str) -> Option<i64> {
    let t = cell.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Some(v);
    }
    let f: f64 = t.parse().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Negative stock clamps to 0; fractional stock truncates.
fn parse_stock(cell: &str) -> Option<u32> {
    let t = cell.trim();
    let v: f64 = t.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(v.clamp(0.0, u32::MAX as f64) as u32)
}

/// Adapters keyed by source name.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the known suppliers.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        for map in builtin_maps() {
            r.register(map);
        }
        r
    }

    /// Later registrations replace earlier ones with the same name.
    pub fn register(&mut self, adapter: impl SourceAdapter + 'static) {
        self.adapters
            .insert(adapter.source_name().to_string(), Box::new(adapter));
    }

    pub fn get(&self, source_name: &str) -> Option<&dyn SourceAdapter> {
        self.adapters.get(source_name).map(|a| a.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}

fn builtin_maps() -> Vec<ColumnMap> {
    let numbered = |map: ColumnMap, n: usize| {
        (1..=n).fold(map, |m, i| {
            m.category(
                Some(&format!("idCategoria{i}")),
                &format!("categoria{i}"),
            )
        })
    };

    vec![
        numbered(
            ColumnMap::new("mcr", "EAN", "Nombre", "Descripcion", "Stock", "Precio").image("Imagen"),
            3,
        ),
        numbered(
            ColumnMap::new("bts", "EAN", "Nombre", "Descripcion", "Stock", "Precio").image("Imagen"),
            4,
        ),
        ColumnMap::new("megasur", "EAN", "NAME", "DESCRIPTION", "STOCK_DISPONIBLE", "PVD")
            .price_format(PriceFormat::European)
            .image("URL_IMG")
            .category(Some("ID_FAMILIA"), "FAMILIA")
            .category(Some("ID_SUBFAMILIA"), "SUBFAMILIA"),
        ColumnMap::new("supercomp", "EAN", "NOMBREARTICULO", "DESCRIPCION", "STOCK", "PRECIO")
            .price_format(PriceFormat::European)
            .image("IMAGEN")
            .category(Some("IDCATEGORIA"), "CATEGORIA"),
        ColumnMap::new("globomatik", "EAN", "Desc. Comercial", "Desc. Larga", "Stock", "Precio")
            .image("Imagen")
            .category(None, "Familia")
            .category(None, "SubFamilia"),
        ColumnMap::new("impexopcion", "ean", "name", "name", "stock_total", "precio_con_iva")
            .description_same_as_name()
            .category(None, "category"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableDialect;

    fn table(text: &str) -> RawTable {
        RawTable::parse(text.as_bytes(), &TableDialect::default()).unwrap()
    }

    #[test]
    fn european_price_format() {
        assert_eq!(PriceFormat::European.parse("1.234,56"), Some(1234.56));
        assert_eq!(PriceFormat::European.parse("12,5"), Some(12.5));
        assert_eq!(PriceFormat::Plain.parse("12.5"), Some(12.5));
        assert_eq!(PriceFormat::Plain.parse("-1"), None);
        assert_eq!(PriceFormat::Plain.parse(""), None);
    }

    #[test]
    fn megasur_row_maps_all_fields() {
        let t = table(
            "EAN;NAME;DESCRIPTION;STOCK_DISPONIBLE;PVD;URL_IMG;ID_FAMILIA;FAMILIA;ID_SUBFAMILIA;SUBFAMILIA\n\
             8400;Raton;Raton optico;5;1.020,50;http://img/1.jpg;3;Perifericos;;\n",
        );
        let reg = AdapterRegistry::with_builtins();
        let out = reg.get("megasur").unwrap().adapt(&t).unwrap();

        assert_eq!(out.rejected, 0);
        let r = &out.records[0];
        assert_eq!(r.source_name, "megasur");
        assert_eq!(r.sku, "8400");
        assert_eq!(r.name.as_deref(), Some("Raton"));
        assert_eq!(r.stock, 5);
        assert_eq!(r.regular_price, 1020.5);
        assert_eq!(r.images, vec![ProductImage::new("http://img/1.jpg")]);
        // second category has neither id nor name
        assert_eq!(r.categories, vec![Category::new(Some(3), "Perifericos")]);
    }

    #[test]
    fn impexopcion_copies_name_and_has_no_images() {
        let t = table("ean;name;stock_total;precio_con_iva;category\n77;Cable;2;3.5;Cables\n");
        let reg = AdapterRegistry::with_builtins();
        let out = reg.get("impexopcion").unwrap().adapt(&t).unwrap();
        let r = &out.records[0];
        assert_eq!(r.description.as_deref(), Some("Cable"));
        assert!(r.images.is_empty());
        assert_eq!(r.categories, vec![Category::named("Cables")]);
    }

    #[test]
    fn bad_rows_are_counted_not_fatal() {
        let t = table(
            "ean;name;stock_total;precio_con_iva;category\n\
             ;NoSku;1;1;c\n\
             1;BadStock;lots;1;c\n\
             2;BadPrice;1;free;c\n\
             3;Neg;-4;1;c\n",
        );
        let reg = AdapterRegistry::with_builtins();
        let out = reg.get("impexopcion").unwrap().adapt(&t).unwrap();
        assert_eq!(out.rejected, 3);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].stock, 0);
    }

    #[test]
    fn missing_column_fails_the_source() {
        let t = table("EAN;Nombre\n1;x\n");
        let reg = AdapterRegistry::with_builtins();
        let err = reg.get("mcr").unwrap().adapt(&t).unwrap_err();
        assert_eq!(
            err,
            AdapterError::MissingColumn {
                source_name: "mcr".into(),
                column: "Descripcion".into()
            }
        );
    }

    #[test]
    fn builtins_are_registered() {
        let reg = AdapterRegistry::with_builtins();
        assert_eq!(
            reg.names(),
            vec!["bts", "globomatik", "impexopcion", "mcr", "megasur", "supercomp"]
        );
        assert!(reg.get("ingrammicro").is_none());
    }
}
