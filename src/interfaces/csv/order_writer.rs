use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes orders as `id,status` CSV rows.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders<I>(&mut self, orders: I) -> Result<()>
    where
        I: IntoIterator<Item = Order>,
    {
        self.writer.write_record(["id", "status"])?;
        for order in orders {
            self.writer
                .write_record([order.id.to_string(), order.status.to_string()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
