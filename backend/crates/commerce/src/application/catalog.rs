//! Catalog Use Cases
//!
//! Shoppers and anonymous callers only ever see active products; staff and
//! admins see the whole catalog.

use std::sync::Arc;

use listing::{FilterValue, ListParams, PageResult};
use platform::upload::ValidatedImage;

use crate::application::lists::PRODUCTS;
use crate::domain::entity::product::{Product, ProductDraft};
use crate::domain::repository::{ImageStore, ProductRepository};
use crate::domain::value_object::{
    ProductId, money::Money, product_status::ProductStatus,
};
use crate::error::{CommerceError, CommerceResult};

/// Who is looking at the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogView {
    /// Active products only
    Storefront,
    /// Every status
    Backoffice,
}

/// Raw product fields from a request body
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    /// `None` keeps the current status (new products start as drafts)
    pub status: Option<ProductStatus>,
}

impl ProductInput {
    fn into_draft(self, current: ProductStatus) -> CommerceResult<ProductDraft> {
        Ok(ProductDraft::new(
            &self.name,
            self.description.as_deref(),
            &self.category,
            self.price,
            self.stock,
            self.status.unwrap_or(current),
        )?)
    }
}

pub struct CatalogService<R>
where
    R: ProductRepository,
{
    repo: Arc<R>,
}

impl<R> CatalogService<R>
where
    R: ProductRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        params: &ListParams,
        view: CatalogView,
    ) -> CommerceResult<PageResult<Product>> {
        let mut query = PRODUCTS.build(params)?;
        if view == CatalogView::Storefront {
            query = query.restrict(
                "status",
                FilterValue::Text(ProductStatus::Active.code().to_string()),
            );
        }
        self.repo.list(&query).await
    }

    pub async fn get(&self, product_id: &ProductId, view: CatalogView) -> CommerceResult<Product> {
        self.repo
            .find_by_id(product_id)
            .await?
            .filter(|p| view == CatalogView::Backoffice || p.is_listed())
            .ok_or(CommerceError::ProductNotFound)
    }

    pub async fn create(&self, input: ProductInput) -> CommerceResult<Product> {
        let product = Product::new(input.into_draft(ProductStatus::default())?);
        self.repo.create(&product).await?;

        tracing::info!(product_id = %product.product_id, status = %product.status, "Product created");

        Ok(product)
    }

    pub async fn update(&self, product_id: &ProductId, input: ProductInput) -> CommerceResult<Product> {
        let mut product = self.get(product_id, CatalogView::Backoffice).await?;
        let draft = input.into_draft(product.status)?;
        product.apply(draft);
        self.repo.update(&product).await?;

        tracing::info!(product_id = %product.product_id, "Product updated");

        Ok(product)
    }

    pub async fn delete(&self, product_id: &ProductId) -> CommerceResult<()> {
        if !self.repo.delete(product_id).await? {
            return Err(CommerceError::ProductNotFound);
        }

        tracing::info!(product_id = %product_id, "Product deleted");

        Ok(())
    }

    /// Store a validated image and point the product at it
    pub async fn attach_image<I>(
        &self,
        product_id: &ProductId,
        image: &ValidatedImage,
        bytes: &[u8],
        store: &I,
    ) -> CommerceResult<Product>
    where
        I: ImageStore + Sync,
    {
        let mut product = self.get(product_id, CatalogView::Backoffice).await?;
        let path = store.save(&image.file_name, bytes).await?;
        product.set_image(path);
        self.repo.update(&product).await?;

        tracing::info!(
            product_id = %product.product_id,
            file_name = %image.file_name,
            size = image.size,
            "Product image stored"
        );

        Ok(product)
    }
}
