use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Writes JSON documents pretty-printed with a four-space indent
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        JsonWriter { writer }
    }

    pub fn write_document(&mut self, document: &Value) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut self.writer, formatter);
        document
            .serialize(&mut serializer)
            .context("Failed to serialize document")?;
        writeln!(self.writer).context("Failed to write document")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

/// Write `document` to `path` as pretty JSON, creating parent directories
pub fn write_json_file<P: AsRef<Path>>(path: P, document: &Value) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = JsonWriter::new(std::io::BufWriter::new(file));
    writer.write_document(document)?;
    writer.flush()
}

/// Write a rendered HTML page to `path`, creating parent directories
pub fn write_html_file<P: AsRef<Path>>(path: P, html: &str) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    std::fs::write(path, html).with_context(|| format!("Failed to write file: {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display())),
        _ => Ok(()),
    }
}
