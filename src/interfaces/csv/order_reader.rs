use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::error::{Result, WebhookError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct OrderRecord {
    id: u64,
    status: OrderStatus,
}

/// Reads order records (`id, status`) from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Order>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Creates a new `OrderReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes orders.
    ///
    /// Rows with a zero id are reported as errors, since no webhook can ever
    /// correlate to them.
    pub fn orders(self) -> impl Iterator<Item = Result<Order>> {
        self.reader.into_deserialize().map(|result| {
            let record: OrderRecord = result.map_err(WebhookError::from)?;
            if record.id == 0 {
                return Err(WebhookError::Config("order id must be positive".to_string()));
            }
            Ok(Order::new(OrderId(record.id), record.status))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, status\n1, pending\n2, on-hold";
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<Order>> = reader.orders().collect();

        assert_eq!(results.len(), 2);
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.id, OrderId(2));
        assert_eq!(second.status, OrderStatus::OnHold);
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = "id, status\n1, shipped\n0, pending\nabc, pending\n4, completed";
        let reader = OrderReader::new(data.as_bytes());
        let results: Vec<Result<Order>> = reader.orders().collect();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert!(results[2].is_err());
        assert!(results[3].is_ok());
    }
}
