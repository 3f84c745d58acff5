use std::io::Write;

use bitflake::DecodedLine;
use serde_json::json;

/// CSV header for batch decode output: one column per [`ParsedId`] field
/// plus an error column.
///
/// [`ParsedId`]: bitflake::ParsedId
pub const CSV_HEADER: &str = "line,id,timestamp_offset,instant_ms,node_primary,node_secondary,\
                              sequence,total_bits_exceeded,timestamp_field_exceeded,error";

/// Quotes a CSV field if it contains a delimiter, quote, or newline.
///
/// Every numeric column is plain digits; only the error column can need
/// quoting.
fn csv_field(text: &str) -> String {
    if text.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_owned()
    }
}

/// One human-readable block per input line.
pub fn write_text(out: &mut impl Write, lines: &[DecodedLine]) -> std::io::Result<()> {
    for entry in lines {
        match &entry.result {
            Ok(parsed) => {
                writeln!(out, "line {}: {}", entry.line, parsed.id)?;
                writeln!(
                    out,
                    "  timestamp_offset={} instant_ms={}",
                    parsed.timestamp_offset, parsed.instant_ms
                )?;
                writeln!(
                    out,
                    "  node_primary={} node_secondary={} sequence={}",
                    parsed.node_primary, parsed.node_secondary, parsed.sequence
                )?;
                if parsed.overflow.total_bits_exceeded {
                    writeln!(out, "  warning: value exceeds the layout's total bits")?;
                }
                if parsed.overflow.timestamp_field_exceeded {
                    writeln!(out, "  warning: timestamp offset exceeds its field width")?;
                }
            }
            Err(err) => {
                writeln!(out, "line {}: error: {err}", entry.line)?;
            }
        }
    }
    Ok(())
}

/// One CSV row per input line, errors included in-band.
pub fn write_csv(out: &mut impl Write, lines: &[DecodedLine]) -> std::io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for entry in lines {
        match &entry.result {
            Ok(parsed) => writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},",
                entry.line,
                parsed.id,
                parsed.timestamp_offset,
                parsed.instant_ms,
                parsed.node_primary,
                parsed.node_secondary,
                parsed.sequence,
                parsed.overflow.total_bits_exceeded,
                parsed.overflow.timestamp_field_exceeded,
            )?,
            Err(err) => writeln!(
                out,
                "{},{},,,,,,,,{}",
                entry.line,
                csv_field(&entry.text),
                csv_field(&err.to_string())
            )?,
        }
    }
    Ok(())
}

/// A JSON array with one object per input line.
pub fn write_json(out: &mut impl Write, lines: &[DecodedLine]) -> anyhow::Result<()> {
    let rows: Vec<serde_json::Value> = lines
        .iter()
        .map(|entry| match &entry.result {
            Ok(parsed) => {
                let mut row = serde_json::to_value(parsed).unwrap_or_else(|_| json!({}));
                row["line"] = json!(entry.line);
                row
            }
            Err(err) => json!({
                "line": entry.line,
                "input": entry.text,
                "error": err.to_string(),
            }),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}
