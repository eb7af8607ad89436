//! Stable re-indentation of uncompressed diagram XML

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::Path;

const INDENT_SIZE: usize = 2;

/// Parse `xml` and serialize it again with two-space indentation
///
/// Text made only of whitespace is dropped so repeated runs produce
/// identical output. Any other text is written back byte for byte.
pub fn reformat(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(text)) if text.iter().all(|b| b.is_ascii_whitespace()) => {}
            Ok(event) => writer
                .write_event(event)
                .context("Failed to write XML event")?,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Malformed XML at position {}: {}",
                    reader.error_position(),
                    e
                ))
            }
        }
    }

    let mut formatted =
        String::from_utf8(writer.into_inner()).context("Reformatted XML is not UTF-8")?;
    formatted.push('\n');
    Ok(formatted)
}

/// Reformat an XML file in place
pub fn reformat_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let formatted =
        reformat(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    fs::write(path, formatted).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
