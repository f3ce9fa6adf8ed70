use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::OrderService;
use crate::error::{Result, WebhookError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent order service backed by RocksDB.
///
/// Orders live in the `orders` Column Family keyed by the big-endian order id,
/// with JSON-encoded values.
///
/// `Clone` shares the underlying `Arc<DB>` and the update lock, so clones
/// handed to concurrent deliveries never interleave a transition.
#[derive(Clone)]
pub struct RocksDbOrderService {
    db: Arc<DB>,
    /// Held across the read-modify-write of a transition.
    update_lock: Arc<Mutex<()>>,
}

impl RocksDbOrderService {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])?;

        Ok(Self {
            db: Arc::new(db),
            update_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Inserts or replaces an order.
    pub fn put(&self, order: &Order) -> Result<()> {
        let cf = self.orders_cf()?;
        let value = serde_json::to_vec(order).map_err(|e| {
            WebhookError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(cf, order.id.0.to_be_bytes(), value)?;
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let cf = self.orders_cf()?;
        match self.db.get_cf(cf, id.0.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All orders in key (and therefore id) order.
    pub fn all(&self) -> Result<Vec<Order>> {
        let cf = self.orders_cf()?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(decode(&value)?);
        }
        Ok(orders)
    }

    fn orders_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ORDERS).ok_or_else(|| {
            WebhookError::InternalError(Box::new(std::io::Error::other(
                "Orders column family not found",
            )))
        })
    }
}

fn decode(bytes: &[u8]) -> Result<Order> {
    serde_json::from_slice(bytes).map_err(|e| {
        WebhookError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl OrderService for RocksDbOrderService {
    async fn find_by_correlation_id(&self, id: OrderId) -> Result<Vec<Order>> {
        Ok(self.get(id)?.into_iter().collect())
    }

    async fn transition(&self, order: &Order, status: OrderStatus, note: &str) -> Result<()> {
        let _guard = self.update_lock.lock().await;
        let mut stored = self.get(order.id)?.ok_or_else(|| {
            WebhookError::OrderService(format!("Order {} disappeared before transition", order.id))
        })?;
        stored.status = status;
        stored.notes.push(note.to_string());
        self.put(&stored)
    }
}
