//! Text and JSON rendering of image records.

use std::io::{self, Write};

use crate::engine::tools::path_to_display_string;
use crate::types::ImageRecord;

/// Write one record. Text is `digest  path` (as `md5sum` prints it) followed by indented metadata
/// lines for the fields that are present. JSON is one object per line.
pub fn write_record<W: Write>(out: &mut W, record: &ImageRecord, json: bool) -> io::Result<()> {
    if json {
        // Render the whole line first so a failure never leaves half an object on `out`.
        let line = serde_json::to_string(record)?;
        return writeln!(out, "{}", line);
    }
    writeln!(
        out,
        "{}  {}",
        record.digest,
        path_to_display_string(&record.file_name)
    )?;
    let m = &record.metadata;
    if let Some(taken) = &m.taken {
        writeln!(out, "    Date: {}", taken)?;
    }
    if let Some(camera) = &m.camera {
        writeln!(out, "    Camera Model: {}", camera)?;
    }
    if let Some(owner) = &m.owner {
        writeln!(out, "    Owner Name: {}", owner)?;
    }
    Ok(())
}

pub fn write_records<W: Write>(out: &mut W, records: &[ImageRecord], json: bool) -> io::Result<()> {
    for r in records {
        write_record(out, r, json)?;
    }
    Ok(())
}
