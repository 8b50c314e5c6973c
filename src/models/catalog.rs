//! Organization, product and repository records.
//!
//! These are owned by the catalog; sync code only reads them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An organization and its base ("locker") environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub label: String,

    /// Environment holding the repositories products are synced into.
    pub locker_environment_id: i64,
}

impl Organization {
    /// Whether a repository belongs to the locker scope.
    pub fn in_locker(&self, repository: &Repository) -> bool {
        repository.environment_id == self.locker_environment_id
    }

    /// Whether a product of this organization can be synced.
    pub fn syncable(&self, product: &Product) -> bool {
        product.organization_id == self.id && product.syncable
    }
}

/// A product grouping repositories of one content provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub organization_id: i64,
    pub provider_id: i64,
    pub name: String,

    /// Whether the product has a sync source configured.
    pub syncable: bool,

    /// Repositories across all environments, loaded separately.
    #[sqlx(skip)]
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

impl Product {
    /// Repositories of this product in the organization's locker scope.
    pub fn locker_repositories<'a>(
        &'a self,
        organization: &'a Organization,
    ) -> impl Iterator<Item = &'a Repository> + 'a {
        self.repositories
            .iter()
            .filter(move |repo| organization.in_locker(repo))
    }
}

/// A content repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: i64,
    pub product_id: i64,
    pub environment_id: i64,
    pub name: String,

    /// Identifier of the repository on the remote sync service.
    pub remote_id: String,

    /// Release-stream tag, e.g. `"6"` or `"6Server"`.
    pub minor: Option<String>,

    /// Architecture tag, e.g. `"x86_64"`.
    pub arch: String,
}

const REPOSITORY_COLUMNS: &str =
    "id, product_id, environment_id, name, remote_id, minor, arch";

/// Look up an organization by ID.
pub async fn get_organization(
    pool: &sqlx::SqlitePool,
    id: i64,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>(
        "SELECT id, name, label, locker_environment_id FROM organizations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Look up a repository by ID.
pub async fn get_repository(
    pool: &sqlx::SqlitePool,
    id: i64,
) -> Result<Option<Repository>, sqlx::Error> {
    sqlx::query_as::<_, Repository>(&format!(
        "SELECT {} FROM repositories WHERE id = ?",
        REPOSITORY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Look up a product by ID, with its repositories ordered by name.
pub async fn get_product(
    pool: &sqlx::SqlitePool,
    id: i64,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, organization_id, provider_id, name, syncable FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match product {
        Some(mut product) => {
            product.repositories = list_product_repositories(pool, product.id).await?;
            Ok(Some(product))
        }
        None => Ok(None),
    }
}

/// List an organization's products ordered by name, each with its repositories.
pub async fn list_organization_products(
    pool: &sqlx::SqlitePool,
    organization_id: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut products = sqlx::query_as::<_, Product>(
        "SELECT id, organization_id, provider_id, name, syncable FROM products
         WHERE organization_id = ? ORDER BY name, id",
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    for product in &mut products {
        product.repositories = list_product_repositories(pool, product.id).await?;
    }

    Ok(products)
}

/// List a product's repositories ordered by name.
pub async fn list_product_repositories(
    pool: &sqlx::SqlitePool,
    product_id: i64,
) -> Result<Vec<Repository>, sqlx::Error> {
    sqlx::query_as::<_, Repository>(&format!(
        "SELECT {} FROM repositories WHERE product_id = ? ORDER BY name, id",
        REPOSITORY_COLUMNS
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await
}

/// Upsert an organization (insert or update on conflict).
pub async fn upsert_organization(
    pool: &sqlx::SqlitePool,
    organization: &Organization,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organizations (id, name, label, locker_environment_id)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           label = excluded.label,
           locker_environment_id = excluded.locker_environment_id",
    )
    .bind(organization.id)
    .bind(&organization.name)
    .bind(&organization.label)
    .bind(organization.locker_environment_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert a product and all of its repositories.
pub async fn upsert_product(pool: &sqlx::SqlitePool, product: &Product) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO products (id, organization_id, provider_id, name, syncable)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           organization_id = excluded.organization_id,
           provider_id = excluded.provider_id,
           name = excluded.name,
           syncable = excluded.syncable",
    )
    .bind(product.id)
    .bind(product.organization_id)
    .bind(product.provider_id)
    .bind(&product.name)
    .bind(product.syncable)
    .execute(&mut *tx)
    .await?;

    for repo in &product.repositories {
        sqlx::query(
            "INSERT INTO repositories (id, product_id, environment_id, name, remote_id, minor, arch)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
               product_id = excluded.product_id,
               environment_id = excluded.environment_id,
               name = excluded.name,
               remote_id = excluded.remote_id,
               minor = excluded.minor,
               arch = excluded.arch",
        )
        .bind(repo.id)
        .bind(product.id)
        .bind(repo.environment_id)
        .bind(&repo.name)
        .bind(&repo.remote_id)
        .bind(&repo.minor)
        .bind(&repo.arch)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
