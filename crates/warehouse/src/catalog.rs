//! Products and per-warehouse stock levels.

use serde::{Deserialize, Serialize};

use wms_core::{DomainError, DomainResult, RecordId};

use crate::location::Warehouse;
use crate::resource::{
    DeleteMode, ForeignKey, Reference, Resource, apply_patch, optional_text, require_non_negative,
    require_text,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// e.g. "each", "box", "kg".
    pub unit_of_measure: String,
    #[serde(default)]
    pub barcode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub unit_of_measure: Option<String>,
}

impl Resource for Product {
    const COLLECTION: &'static str = "products";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;

    type Update = ProductUpdate;
    type Filter = ProductFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("sku", &self.sku)?;
        if self.sku.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("sku must not contain whitespace"));
        }
        require_text("name", &self.name)?;
        require_text("unit_of_measure", &self.unit_of_measure)?;
        optional_text("description", self.description.as_deref())?;
        optional_text("barcode", self.barcode.as_deref())
    }

    fn apply_update(&mut self, patch: ProductUpdate) {
        apply_patch!(
            self,
            patch,
            [sku, name, unit_of_measure],
            [description, barcode]
        );
    }
}

/// Stock of a product held in a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub warehouse_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
    /// Units promised to outbound orders; never above `quantity`.
    #[serde(default)]
    pub reserved: i64,
}

impl Inventory {
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryUpdate {
    pub quantity: Option<i64>,
    pub reserved: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub warehouse_id: Option<RecordId>,
    pub product_id: Option<RecordId>,
}

impl Resource for Inventory {
    const COLLECTION: &'static str = "inventory";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[
        ForeignKey::one("warehouse_id", Warehouse::COLLECTION),
        ForeignKey::one("product_id", Product::COLLECTION),
    ];

    type Update = InventoryUpdate;
    type Filter = InventoryFilter;

    fn validate(&self) -> DomainResult<()> {
        require_non_negative("quantity", self.quantity)?;
        require_non_negative("reserved", self.reserved)?;
        if self.reserved > self.quantity {
            return Err(DomainError::validation("reserved must not exceed quantity"));
        }
        Ok(())
    }

    fn apply_update(&mut self, patch: InventoryUpdate) {
        apply_patch!(self, patch, [quantity, reserved]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new("warehouse_id", Warehouse::COLLECTION, self.warehouse_id),
            Reference::new("product_id", Product::COLLECTION, self.product_id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            sku: "SKU-001".into(),
            name: "Pallet wrap".into(),
            description: None,
            unit_of_measure: "roll".into(),
            barcode: Some("4006381333931".into()),
        }
    }

    #[test]
    fn product_sku_rules() {
        assert!(product().validate().is_ok());

        let mut p = product();
        p.sku = "SKU 001".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn product_update_keeps_optional_fields_unless_given() {
        let mut p = product();
        p.apply_update(ProductUpdate {
            description: Some("Stretch film, 500mm".into()),
            ..Default::default()
        });
        assert_eq!(p.description.as_deref(), Some("Stretch film, 500mm"));
        assert_eq!(p.barcode.as_deref(), Some("4006381333931"));
    }

    #[test]
    fn reserved_cannot_exceed_quantity() {
        let mut inv = Inventory {
            warehouse_id: RecordId::new(),
            product_id: RecordId::new(),
            quantity: 10,
            reserved: 4,
        };
        assert!(inv.validate().is_ok());
        assert_eq!(inv.available(), 6);

        inv.apply_update(InventoryUpdate {
            quantity: Some(3),
            reserved: None,
        });
        assert!(matches!(inv.validate(), Err(DomainError::Validation(_))));
    }
}
