use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row with minimal quoting (quotes doubled inside
/// quoted fields).
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Write one table: a header line followed by data rows.
pub fn write_table(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    let header_row: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &header_row)
        .with_context(|| format!("Failed to write header to {}", path.display()))?;
    for row in rows {
        write_row(&mut w, row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut buf = Vec::new();
        write_row(
            &mut buf,
            &[
                "plain".to_string(),
                "with, comma".to_string(),
                "with \"quote\"".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "plain,\"with, comma\",\"with \"\"quote\"\"\"\n"
        );
    }

    #[test]
    fn writes_header_and_rows_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_table(
            &path,
            &["id", "name"],
            &[vec!["1".to_string(), "Hotel | One".to_string()]],
        )
        .unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "id,name\n1,Hotel | One\n");
    }
}
