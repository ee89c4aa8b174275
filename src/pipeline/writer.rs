//! Batch writer
//!
//! Binds records positionally into the cached insert statement and runs
//! them as a single batch.
//!
//! ## Write Path
//! 1. Prepare the entity's insert statement
//! 2. For each record, extract values in column order
//! 3. Replace unset time-ordered ids with freshly generated ones
//! 4. Bind and add to one local batch
//! 5. Execute the batch (inline, or on the write channel)

use std::borrow::Borrow;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::{new_time_uuid, Value};
use crate::session::{BatchStatement, PreparedStatement, Session};

use super::{EntityAdapter, WriteChannel};

/// Extract one record's values in binding order
pub fn record_values<T>(adapter: &EntityAdapter<T>, record: &T) -> Result<Vec<Value>> {
    adapter
        .schema()
        .columns
        .iter()
        .zip(adapter.accessors())
        .map(|(column, accessor)| {
            let value = accessor(record)?;
            if column.data_type.is_time_uuid() && value.is_unset_id() {
                return Ok(Value::Uuid(new_time_uuid()));
            }
            Ok(value)
        })
        .collect()
}

/// Bind every record into a batch, returning it with the record count
///
/// Nothing is executed here, so a record that fails extraction leaves the
/// store untouched.
pub fn build_batch<T, I>(
    adapter: &EntityAdapter<T>,
    prepared: &PreparedStatement,
    records: I,
) -> Result<(BatchStatement, usize)>
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    let records = records.into_iter();
    let mut batch = BatchStatement::with_capacity(records.size_hint().0);
    let mut count = 0;

    for record in records {
        let values = record_values(adapter, record.borrow())?;
        batch.add(prepared.bind(values)?);
        count += 1;
    }

    Ok((batch, count))
}

/// Run the whole write path for one call
pub fn write<T, I>(
    session: &Arc<dyn Session>,
    channel: Option<&WriteChannel>,
    adapter: &EntityAdapter<T>,
    records: I,
) -> Result<usize>
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    let prepared = session.prepare(&adapter.statements().insert)?;
    let (batch, count) = build_batch(adapter, &prepared, records)?;

    if batch.is_empty() {
        tracing::trace!("No records for {}, skipping batch", adapter.schema().name);
        return Ok(0);
    }

    tracing::debug!(
        "Writing batch of {} {} record(s) to {}.{}",
        count,
        adapter.schema().name,
        adapter.schema().table.database,
        adapter.schema().table_name
    );

    match channel {
        Some(channel) => {
            let session = Arc::clone(session);
            channel.execute(move || session.execute_batch(&batch))?;
        }
        None => session.execute_batch(&batch)?,
    }

    Ok(count)
}
