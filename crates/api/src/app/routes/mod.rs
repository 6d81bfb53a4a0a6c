use axum::{Router, routing::get};

use wms_warehouse::{
    Aisle, Bin, BinContent, BinMovement, BinType, Inventory, Level, PermissionRecord, Product,
    Rack, RoleRecord, User, Warehouse, Zone,
};

pub mod crud;
pub mod system;

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        // Layout
        .merge(crud::resource_router::<Warehouse>())
        .merge(crud::resource_router::<Zone>())
        .merge(crud::resource_router::<Aisle>())
        .merge(crud::resource_router::<Rack>())
        .merge(crud::resource_router::<Level>())
        // Bins
        .merge(crud::resource_router::<BinType>())
        .merge(crud::resource_router::<Bin>())
        .merge(crud::resource_router::<BinContent>())
        .merge(crud::resource_router::<BinMovement>())
        // Catalog + stock
        .merge(crud::resource_router::<Product>())
        .merge(crud::resource_router::<Inventory>())
        // Access control
        .merge(crud::resource_router::<User>())
        .merge(crud::resource_router::<RoleRecord>())
        .merge(crud::resource_router::<PermissionRecord>())
}
