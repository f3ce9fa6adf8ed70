use super::in_memory::InMemoryOrderService;
#[cfg(feature = "storage-rocksdb")]
use super::rocksdb::RocksDbOrderService;
use crate::domain::order::Order;
use crate::domain::ports::OrderServiceRef;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;
#[cfg(not(feature = "storage-rocksdb"))]
use tracing::warn;

/// The order backend selected at startup.
#[derive(Clone)]
pub enum OrderStore {
    InMemory(InMemoryOrderService),
    #[cfg(feature = "storage-rocksdb")]
    RocksDb(RocksDbOrderService),
}

impl OrderStore {
    /// Opens RocksDB at `db_path` when given, in-memory storage otherwise.
    ///
    /// Without the `storage-rocksdb` feature a `db_path` is ignored with a
    /// warning.
    pub fn open(db_path: Option<&Path>) -> Result<Self> {
        match db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => Ok(Self::RocksDb(RocksDbOrderService::open(path)?)),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => {
                warn!(
                    db_path = %path.display(),
                    "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                Ok(Self::InMemory(InMemoryOrderService::new()))
            }
            None => Ok(Self::InMemory(InMemoryOrderService::new())),
        }
    }

    pub async fn insert(&self, order: Order) -> Result<()> {
        match self {
            Self::InMemory(service) => {
                service.insert(order).await;
                Ok(())
            }
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDb(service) => service.put(&order),
        }
    }

    /// All stored orders sorted by id.
    pub async fn all(&self) -> Result<Vec<Order>> {
        match self {
            Self::InMemory(service) => Ok(service.all().await),
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDb(service) => service.all(),
        }
    }

    /// The store as the order service port handed to handlers.
    pub fn service(&self) -> OrderServiceRef {
        match self {
            Self::InMemory(service) => Arc::new(service.clone()),
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDb(service) => Arc::new(service.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderId, OrderStatus};

    #[tokio::test]
    async fn test_service_shares_state_with_store() {
        let store = OrderStore::open(None).unwrap();
        store
            .insert(Order::new(OrderId(4), OrderStatus::Completed))
            .await
            .unwrap();

        let service = store.service();
        let order = service
            .find_by_correlation_id(OrderId(4))
            .await
            .unwrap()
            .remove(0);
        service
            .transition(&order, OrderStatus::Refunded, "Payment Refunded.")
            .await
            .unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all[0].status, OrderStatus::Refunded);
    }
}
