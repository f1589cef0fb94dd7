//! Tab-separated sentence input.
//!
//! Each line is `id<TAB>language<TAB>text`. Quotes carry no meaning.

use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::models::Item;

/// Read every row tagged with `language` from the TSV file at `path`.
pub fn read_items(path: &Path, language: &str) -> Result<Vec<Item>> {
    let file = std::fs::File::open(path)?;
    parse_items(file, language)
}

/// Select rows tagged with `language`, in input order, duplicates kept.
///
/// Rows with fewer than three columns or an empty id or text are skipped.
pub fn parse_items<R: Read>(reader: R, language: &str) -> Result<Vec<Item>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 3 {
            continue;
        }

        let id = record[0].trim();
        let tag = record[1].trim();
        let text = record[2].trim();

        if tag == language && !id.is_empty() && !text.is_empty() {
            items.push(Item::new(id, text));
        }
    }
    Ok(items)
}
