use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::ProductInfo;
use crate::domain::ports::ProductCatalog;
use crate::schema::products;

use super::models::ProductRow;

/// Read-only view of the storefront catalog; the wider application owns the
/// table, this subsystem only looks up authoritative prices.
pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn find_by_id(&self, id: i32) -> Result<Option<ProductInfo>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(|row| ProductInfo {
            id: row.id,
            name: row.name,
            sku: row.sku,
            price: row.price,
            images: serde_json::from_value(row.images).unwrap_or_default(),
            is_active: row.is_active,
        }))
    }
}
