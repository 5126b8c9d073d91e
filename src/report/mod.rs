use std::{fmt, fs::File, io::Write, path::Path};

use crate::datatype::Aggregates;
use crate::error::{Error, Result};

/// Text form of the final counts.
///
/// Tags and port/protocol pairs are listed in the order they were first
/// counted. The `Untagged` line is always present.
pub struct Report<'a>(pub &'a Aggregates);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let aggregates = self.0;

        writeln!(f, "Tag Counts:")?;
        writeln!(f, "Tag,Count")?;
        for (tag, count) in aggregates.tag_counts.iter() {
            writeln!(f, "{},{}", tag, count)?;
        }
        writeln!(f, "Untagged,{}", aggregates.untagged)?;
        writeln!(f)?;

        writeln!(f, "Port/Protocol Combination Counts:")?;
        writeln!(f, "Port,Protocol,Count")?;
        for (key, count) in aggregates.port_protocol_counts.iter() {
            // LookupKey displays as "port,protocol"
            writeln!(f, "{},{}", key, count)?;
        }

        Ok(())
    }
}

/// Render the report text.
pub fn render(aggregates: &Aggregates) -> String {
    Report(aggregates).to_string()
}

/// Write the report to `path`, replacing any previous content.
pub fn write_report(path: &Path, aggregates: &Aggregates) -> Result<()> {
    let io_error = |source| Error::Io { path: path.to_path_buf(), source };

    // Get the buffer
    let buffer = render(aggregates);

    // Open a file to write
    let mut file = File::create(path).map_err(io_error)?;

    // Write the entire buffer to the file
    file.write_all(buffer.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;

    Ok(())
}
