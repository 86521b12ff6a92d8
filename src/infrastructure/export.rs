use crate::domain::Record;
use std::path::Path;

pub struct CsvExporter;

impl CsvExporter {
    /// Writes `records` to `filename` with an `id,name,email` header.
    ///
    /// Returns the filename on success so the caller can report it.
    pub fn export_records(records: &[Record], filename: &str) -> Result<String, String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(Path::new(filename))
            .map_err(|e| e.to_string())?;
        // Header is written up front so an empty export is still a valid table
        writer
            .write_record(["id", "name", "email"])
            .map_err(|e| e.to_string())?;
        for record in records {
            writer.serialize(record).map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}
