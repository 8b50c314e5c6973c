//! Read-only lookup of organizations, products and repositories.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::catalog::{self, Organization, Product, Repository};
use async_trait::async_trait;

/// Lookup of catalog records by identifier.
///
/// Unknown identifiers are reported as [`AppError::NotFound`].
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn repository(&self, id: i64) -> Result<Repository, AppError>;

    /// A product with all of its repositories.
    async fn product(&self, id: i64) -> Result<Product, AppError>;

    async fn organization(&self, id: i64) -> Result<Organization, AppError>;

    /// All products of an organization, ordered by name.
    async fn organization_products(&self, organization_id: i64) -> Result<Vec<Product>, AppError>;
}

/// Catalog backed by the local SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn repository(&self, id: i64) -> Result<Repository, AppError> {
        catalog::get_repository(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Repository", id))
    }

    async fn product(&self, id: i64) -> Result<Product, AppError> {
        catalog::get_product(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Product", id))
    }

    async fn organization(&self, id: i64) -> Result<Organization, AppError> {
        catalog::get_organization(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Organization", id))
    }

    async fn organization_products(&self, organization_id: i64) -> Result<Vec<Product>, AppError> {
        // Surface an unknown organization rather than an empty list.
        self.organization(organization_id).await?;
        Ok(catalog::list_organization_products(&self.pool, organization_id).await?)
    }
}
