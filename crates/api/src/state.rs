//! Shared application state.

use catalog::ProductCatalog;
use orders::{CatalogInventoryClient, OrderCoordinator, OrderStore};

/// State shared by all handlers: the catalog plus the order coordinator
/// wired to it through the in-process inventory client.
pub struct AppState<K, S> {
    pub catalog: K,
    pub coordinator: OrderCoordinator<CatalogInventoryClient<K>, S>,
}

impl<K, S> AppState<K, S>
where
    K: ProductCatalog + Clone,
    S: OrderStore + Clone,
{
    /// Wires a coordinator over the given catalog and order store.
    pub fn new(catalog: K, store: S) -> Self {
        let coordinator =
            OrderCoordinator::new(CatalogInventoryClient::new(catalog.clone()), store);
        Self {
            catalog,
            coordinator,
        }
    }
}
