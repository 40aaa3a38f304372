//! DOCX text extraction. Reads `word/document.xml` from the package and
//! flattens the run text: one line per paragraph, tabs and breaks preserved.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractionError::Parse(format!("DOCX is not a valid package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Parse(format!("DOCX has no document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Parse(format!("DOCX body unreadable: {e}")))?;

    document_text(&xml)
}

fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Parse(format!("DOCX text invalid: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Parse(format!(
                    "DOCX XML error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(out.trim().to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Cursor, Write};

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::DOCUMENT_PART;

    /// A minimal .docx package whose body part is `body`.
    pub fn docx_with(body: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    /// One paragraph per line of `text`.
    pub fn docx_from_lines(text: &str) -> Vec<u8> {
        let paragraphs: String = text
            .lines()
            .map(|line| format!("<w:p><w:r><w:t xml:space=\"preserve\">{line}</w:t></w:r></w:p>"))
            .collect();
        docx_with(&format!(
            "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{paragraphs}</w:body></w:document>"
        ))
    }
}
