//! CSV output for account snapshots.

use serde::Serialize;
use std::io::Write;

/// Writes `records` as CSV rows under a header taken from the first record's
/// field names. Used for the shutdown snapshot of `name,amount` rows.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
