use std::io::Write;

use crate::report::ReportTable;

/// Header and cell values as CSV; highlights are not representable and are
/// dropped.
pub fn write_csv<W: Write>(table: &ReportTable, writer: W) -> csv::Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(&table.header)?;
    for row in table.rows.iter() {
        w.write_record(row.iter().map(|cell| cell.value.as_str()))?;
    }
    w.flush()?;
    Ok(())
}

/// The whole table, highlights and rules included.
pub fn write_json<W: Write>(table: &ReportTable, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, table)
}
