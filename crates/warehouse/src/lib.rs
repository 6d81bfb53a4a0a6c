//! `wms-warehouse`: the warehouse resource model.
//!
//! One type per stored table. Each implements [`Resource`], which tells the
//! storage and HTTP layers the collection name, how to validate a body, how to
//! apply a partial update, which other records it points at and whether
//! deletes are hard or soft.

pub mod access;
pub mod bin;
pub mod catalog;
pub mod location;
pub mod resource;

pub use access::{PermissionRecord, RoleRecord, User};
pub use bin::{Bin, BinContent, BinMovement, BinStatus, BinType};
pub use catalog::{Inventory, Product};
pub use location::{Aisle, Level, Rack, Warehouse, Zone, ZoneType};
pub use resource::{DeleteMode, ForeignKey, Reference, Resource};

/// Collections holding physical layout, stock and catalog data.
pub const WAREHOUSE_COLLECTIONS: [&str; 11] = [
    Warehouse::COLLECTION,
    Zone::COLLECTION,
    Aisle::COLLECTION,
    Rack::COLLECTION,
    Level::COLLECTION,
    BinType::COLLECTION,
    Bin::COLLECTION,
    BinContent::COLLECTION,
    BinMovement::COLLECTION,
    Inventory::COLLECTION,
    Product::COLLECTION,
];

/// Collections holding identity and access-control data.
pub const ACCESS_COLLECTIONS: [&str; 3] = [
    User::COLLECTION,
    RoleRecord::COLLECTION,
    PermissionRecord::COLLECTION,
];

/// Collections floor staff write to while moving stock.
pub const STOCK_COLLECTIONS: [&str; 3] = [
    BinContent::COLLECTION,
    BinMovement::COLLECTION,
    Inventory::COLLECTION,
];

/// Foreign-key columns of every collection, as `(collection, key)` pairs.
fn foreign_keys() -> impl Iterator<Item = (&'static str, &'static ForeignKey)> {
    fn of<R: Resource>() -> impl Iterator<Item = (&'static str, &'static ForeignKey)> {
        R::FOREIGN_KEYS.iter().map(|fk| (R::COLLECTION, fk))
    }

    of::<Warehouse>()
        .chain(of::<Zone>())
        .chain(of::<Aisle>())
        .chain(of::<Rack>())
        .chain(of::<Level>())
        .chain(of::<BinType>())
        .chain(of::<Bin>())
        .chain(of::<BinContent>())
        .chain(of::<BinMovement>())
        .chain(of::<Inventory>())
        .chain(of::<Product>())
        .chain(of::<User>())
        .chain(of::<RoleRecord>())
        .chain(of::<PermissionRecord>())
}

/// Columns (in any collection) that may point at a record of `target`.
pub fn referrers(target: &str) -> Vec<(&'static str, ForeignKey)> {
    foreign_keys()
        .filter(|(_, fk)| fk.target == target)
        .map(|(collection, fk)| (collection, *fk))
        .collect()
}
