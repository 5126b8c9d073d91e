use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::datatype::LookupKey;
use crate::error::{Error, Result};

const PORT_COLUMN:     &str = "dstport";
const PROTOCOL_COLUMN: &str = "protocol";
const TAG_COLUMN:      &str = "tag";

/// Tags keyed by (destination port, protocol). Built once, read-only after.
#[derive(Debug, Default, Clone)]
pub struct LookupTable {
    entries: HashMap<LookupKey, String>,
}

// Positions of the three columns inside a row
struct Columns {
    port:     usize,
    protocol: usize,
    tag:      usize,
}

impl Columns {
    fn locate(header: &StringRecord) -> Option<Columns> {
        let find = |name: &str| header.iter().position(|cell| cell.trim() == name);
        Some(Columns {
            port:     find(PORT_COLUMN)?,
            protocol: find(PROTOCOL_COLUMN)?,
            tag:      find(TAG_COLUMN)?,
        })
    }
}

impl LookupTable {
    /// Load the table from a comma-separated file with a
    /// `dstport,protocol,tag` header.
    pub fn load(path: &Path) -> Result<LookupTable> {
        let file = File::open(path).map_err(|source| Error::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let table = LookupTable::from_reader(file, path)?;
        info!(path = %path.display(), entries = table.len(), "lookup table loaded");
        Ok(table)
    }

    /// Parse the table from any reader. `origin` only labels errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<LookupTable> {
        let csv_error = |source| Error::Csv { path: origin.to_path_buf(), source };

        // Row length is checked per row below, with the row's line number
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr.headers().map_err(csv_error)?.clone();
        let mut table = LookupTable::default();

        // An empty resource is an empty table
        if header.is_empty() {
            return Ok(table);
        }

        let columns = Columns::locate(&header).ok_or_else(|| Error::LookupFormat {
            path:   origin.to_path_buf(),
            line:   1,
            reason: format!(
                "header must name the columns {}, {}, {} (got {:?})",
                PORT_COLUMN, PROTOCOL_COLUMN, TAG_COLUMN,
                header.iter().collect::<Vec<_>>()
            ),
        })?;

        for row in rdr.records() {
            let row = row.map_err(csv_error)?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let (key, tag) = parse_row(&row, &columns).map_err(|reason| Error::LookupFormat {
                path: origin.to_path_buf(),
                line,
                reason,
            })?;

            debug!(line, key = %key, tag = %tag, "lookup entry");
            if let Some(previous) = table.entries.insert(key, tag) {
                debug!(line, previous = %previous, "duplicate lookup key overwritten");
            }
        }

        Ok(table)
    }

    pub fn get(&self, key: &LookupKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(LookupKey, String)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (LookupKey, String)>>(iter: I) -> Self {
        LookupTable { entries: iter.into_iter().collect() }
    }
}

fn parse_row(row: &StringRecord, columns: &Columns) -> std::result::Result<(LookupKey, String), String> {
    let field = |index: usize, name: &str| {
        row.get(index).ok_or_else(|| format!("missing column {}", name))
    };

    let port = field(columns.port, PORT_COLUMN)?.trim();
    let port: u16 = port
        .parse()
        .map_err(|_| format!("{} {:?} is not a port number", PORT_COLUMN, port))?;

    let protocol = field(columns.protocol, PROTOCOL_COLUMN)?.trim().to_lowercase();
    let tag = field(columns.tag, TAG_COLUMN)?.trim().to_string();

    Ok((LookupKey::new(u32::from(port), protocol), tag))
}
