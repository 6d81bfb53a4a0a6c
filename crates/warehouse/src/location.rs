//! Physical layout: warehouse → zone → aisle → rack → level.
//!
//! Bins hang off levels (see [`crate::bin`]).

use serde::{Deserialize, Serialize};

use wms_core::{DomainError, DomainResult, RecordId};

use crate::resource::{
    DeleteMode, ForeignKey, Reference, Resource, apply_patch, optional_positive, optional_text, require_text,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WarehouseUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WarehouseFilter {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl Resource for Warehouse {
    const COLLECTION: &'static str = "warehouses";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;

    type Update = WarehouseUpdate;
    type Filter = WarehouseFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)?;
        require_text("name", &self.name)?;
        optional_text("address", self.address.as_deref())
    }

    fn apply_update(&mut self, patch: WarehouseUpdate) {
        apply_patch!(self, patch, [code, name], [address]);
    }
}

/// Functional purpose of a zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Storage,
    Receiving,
    Shipping,
    Staging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub warehouse_id: RecordId,
    pub code: String,
    pub name: String,
    pub zone_type: ZoneType,
}

#[derive(Debug, Default, Deserialize)]
pub struct ZoneUpdate {
    pub warehouse_id: Option<RecordId>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub zone_type: Option<ZoneType>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ZoneFilter {
    pub warehouse_id: Option<RecordId>,
    pub code: Option<String>,
    pub zone_type: Option<ZoneType>,
}

impl Resource for Zone {
    const COLLECTION: &'static str = "zones";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::one("warehouse_id", Warehouse::COLLECTION)];

    type Update = ZoneUpdate;
    type Filter = ZoneFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)?;
        require_text("name", &self.name)
    }

    fn apply_update(&mut self, patch: ZoneUpdate) {
        apply_patch!(self, patch, [warehouse_id, code, name, zone_type]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new("warehouse_id", Warehouse::COLLECTION, self.warehouse_id)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aisle {
    pub zone_id: RecordId,
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AisleUpdate {
    pub zone_id: Option<RecordId>,
    pub code: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AisleFilter {
    pub zone_id: Option<RecordId>,
    pub code: Option<String>,
}

impl Resource for Aisle {
    const COLLECTION: &'static str = "aisles";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::one("zone_id", Zone::COLLECTION)];

    type Update = AisleUpdate;
    type Filter = AisleFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)
    }

    fn apply_update(&mut self, patch: AisleUpdate) {
        apply_patch!(self, patch, [zone_id, code]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new("zone_id", Zone::COLLECTION, self.zone_id)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    pub aisle_id: RecordId,
    pub code: String,
    #[serde(default)]
    pub max_weight_kg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RackUpdate {
    pub aisle_id: Option<RecordId>,
    pub code: Option<String>,
    pub max_weight_kg: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RackFilter {
    pub aisle_id: Option<RecordId>,
    pub code: Option<String>,
}

impl Resource for Rack {
    const COLLECTION: &'static str = "racks";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::one("aisle_id", Aisle::COLLECTION)];

    type Update = RackUpdate;
    type Filter = RackFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)?;
        optional_positive("max_weight_kg", self.max_weight_kg)
    }

    fn apply_update(&mut self, patch: RackUpdate) {
        apply_patch!(self, patch, [aisle_id, code], [max_weight_kg]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new("aisle_id", Aisle::COLLECTION, self.aisle_id)]
    }
}

/// A shelf level on a rack. `position` 0 is the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub rack_id: RecordId,
    pub code: String,
    pub position: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct LevelUpdate {
    pub rack_id: Option<RecordId>,
    pub code: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LevelFilter {
    pub rack_id: Option<RecordId>,
    pub code: Option<String>,
}

impl Resource for Level {
    const COLLECTION: &'static str = "levels";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::one("rack_id", Rack::COLLECTION)];

    type Update = LevelUpdate;
    type Filter = LevelFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("code", &self.code)?;
        if self.position < 0 {
            return Err(DomainError::validation("position must not be negative"));
        }
        Ok(())
    }

    fn apply_update(&mut self, patch: LevelUpdate) {
        apply_patch!(self, patch, [rack_id, code, position]);
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new("rack_id", Rack::COLLECTION, self.rack_id)]
    }
}
