//! Bins: the smallest storage unit, their types, contents and movements.

use serde::{Deserialize, Serialize};

use wms_core::{DomainError, DomainResult, RecordId};

use crate::catalog::Product;
use crate::location::Level;
use crate::resource::{
    DeleteMode, ForeignKey, Reference, Resource, apply_patch, optional_positive, optional_text,
    require_non_negative, require_positive, require_text,
};

/// Physical dimensions shared by every bin of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinType {
    pub code: String,
    pub name: String,
    pub width_cm: f64,
    pub height_cm: f64,
    pub depth_cm: f64,
    #[serde(default)]
    pub max_weight_kg: Option<f64>,
}

impl BinType {
    pub fn volume_cm3(&self) -> f64 {
        self.width_cm * self.height_cm * self.depth_cm
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BinTypeUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub max_weight_kg: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BinTypeFilter {
    pub code: Option<String>,
}

impl Resource for BinType {
    const COLLECTION: &'static str = "bin_types";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;

    type Update = BinTypeUpdate;
    type Filter = BinTypeFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)?;
        require_text("name", &self.name)?;
        require_positive("width_cm", self.width_cm)?;
        require_positive("height_cm", self.height_cm)?;
        require_positive("depth_cm", self.depth_cm)?;
        optional_positive("max_weight_kg", self.max_weight_kg)
    }

    fn apply_update(&mut self, patch: BinTypeUpdate) {
        apply_patch!(
            self,
            patch,
            [code, name, width_cm, height_cm, depth_cm],
            [max_weight_kg]
        );
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinStatus {
    #[default]
    Available,
    Occupied,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub level_id: RecordId,
    pub bin_type_id: RecordId,
    pub code: String,
    #[serde(default)]
    pub status: BinStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinUpdate {
    pub level_id: Option<RecordId>,
    pub bin_type_id: Option<RecordId>,
    pub code: Option<String>,
    pub status: Option<BinStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BinFilter {
    pub level_id: Option<RecordId>,
    pub bin_type_id: Option<RecordId>,
    pub code: Option<String>,
    pub status: Option<BinStatus>,
}

impl Resource for Bin {
    const COLLECTION: &'static str = "bins";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[
        ForeignKey::one("level_id", Level::COLLECTION),
        ForeignKey::one("bin_type_id", BinType::COLLECTION),
    ];

    type Update = BinUpdate;
    type Filter = BinFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)
    }

    fn apply_update(&mut self, patch: BinUpdate) {
        apply_patch!(self, patch, [level_id, bin_type_id, code, status]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new("level_id", Level::COLLECTION, self.level_id),
            Reference::new("bin_type_id", BinType::COLLECTION, self.bin_type_id),
        ]
    }
}

/// How much of a product sits in a bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinContent {
    pub bin_id: RecordId,
    pub product_id: RecordId,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinContentUpdate {
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BinContentFilter {
    pub bin_id: Option<RecordId>,
    pub product_id: Option<RecordId>,
}

impl Resource for BinContent {
    const COLLECTION: &'static str = "bin_contents";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[
        ForeignKey::one("bin_id", Bin::COLLECTION),
        ForeignKey::one("product_id", Product::COLLECTION),
    ];

    type Update = BinContentUpdate;
    type Filter = BinContentFilter;

    fn validate(&self) -> DomainResult<()> {
        require_non_negative("quantity", self.quantity)
    }

    fn apply_update(&mut self, patch: BinContentUpdate) {
        apply_patch!(self, patch, [quantity]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::new("bin_id", Bin::COLLECTION, self.bin_id),
            Reference::new("product_id", Product::COLLECTION, self.product_id),
        ]
    }
}

/// A recorded transfer of stock.
///
/// A movement with no `from_bin_id` is a put-away (goods in); one with no
/// `to_bin_id` is a pick (goods out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinMovement {
    pub product_id: RecordId,
    #[serde(default)]
    pub from_bin_id: Option<RecordId>,
    #[serde(default)]
    pub to_bin_id: Option<RecordId>,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BinMovementUpdate {
    pub quantity: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BinMovementFilter {
    pub product_id: Option<RecordId>,
    pub from_bin_id: Option<RecordId>,
    pub to_bin_id: Option<RecordId>,
}

impl Resource for BinMovement {
    const COLLECTION: &'static str = "bin_movements";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[
        ForeignKey::one("product_id", Product::COLLECTION),
        ForeignKey::one("from_bin_id", Bin::COLLECTION),
        ForeignKey::one("to_bin_id", Bin::COLLECTION),
    ];

    type Update = BinMovementUpdate;
    type Filter = BinMovementFilter;

    fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        match (self.from_bin_id, self.to_bin_id) {
            (None, None) => {
                return Err(DomainError::validation(
                    "a movement needs from_bin_id, to_bin_id or both",
                ));
            }
            (Some(from), Some(to)) if from == to => {
                return Err(DomainError::validation(
                    "from_bin_id and to_bin_id must differ",
                ));
            }
            _ => {}
        }
        optional_text("reason", self.reason.as_deref())
    }

    fn apply_update(&mut self, patch: BinMovementUpdate) {
        apply_patch!(self, patch, [quantity], [reason]);
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![Reference::new("product_id", Product::COLLECTION, self.product_id)];
        if let Some(from) = self.from_bin_id {
            refs.push(Reference::new("from_bin_id", Bin::COLLECTION, from));
        }
        if let Some(to) = self.to_bin_id {
            refs.push(Reference::new("to_bin_id", Bin::COLLECTION, to));
        }
        refs
    }
}
