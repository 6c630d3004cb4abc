use async_trait::async_trait;

use crate::error::CatalogError;
use crate::filter::ProductQuery;

/// Source of raw price list documents.
///
/// Implementations return every product matching the query as the JSON
/// string the catalog serves, following pagination themselves. Retrying
/// transient failures is also their concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceCatalog: Send + Sync {
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<String>, CatalogError>;
}

#[async_trait]
impl<T: PriceCatalog + ?Sized> PriceCatalog for std::sync::Arc<T> {
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<String>, CatalogError> {
        (**self).get_products(query).await
    }
}
