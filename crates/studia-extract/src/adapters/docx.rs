//! DOCX structural adapter: reads paragraph text straight out of
//! `word/document.xml` without any model call.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use studia_core::defaults::MAX_DOCX_XML_BYTES;
use studia_core::{Error, ExtractionAdapter, ExtractionResult, ExtractionStrategy, Result};

const DOCUMENT_XML: &str = "word/document.xml";
const PARAGRAPH_END: &str = "</w:p>";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Text of one run: `<w:t>` or `<w:t xml:space="preserve">` up to `</w:t>`.
static RUN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("run text pattern is valid")
});

/// Adapter for Office Open XML word processing documents.
pub struct DocxAdapter {
    max_xml_bytes: u64,
}

impl DocxAdapter {
    pub fn new() -> Self {
        Self {
            max_xml_bytes: MAX_DOCX_XML_BYTES,
        }
    }

    /// Override the decompressed `document.xml` ceiling.
    pub fn with_max_xml_bytes(mut self, bytes: u64) -> Self {
        self.max_xml_bytes = bytes;
        self
    }
}

impl Default for DocxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionAdapter for DocxAdapter {
    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::DocxStructural
    }

    async fn extract(
        &self,
        data: &[u8],
        file_name: &str,
        _mime_type: &str,
    ) -> Result<ExtractionResult> {
        let bytes = data.to_vec();
        let limit = self.max_xml_bytes;

        let (text, paragraphs, xml_bytes) =
            tokio::task::spawn_blocking(move || -> Result<(String, usize, usize)> {
                let xml = read_document_xml(&bytes, limit)?;
                let paragraphs = paragraphs_from_xml(&xml);
                let count = paragraphs.len();
                Ok((paragraphs.join(PARAGRAPH_SEPARATOR), count, xml.len()))
            })
            .await
            .map_err(|e| Error::Internal(format!("DOCX parse task failed: {}", e)))??;

        debug!(
            subsystem = "extraction",
            component = "docx",
            file_name,
            paragraphs,
            xml_bytes,
            "DOCX parsed"
        );

        Ok(ExtractionResult {
            extracted_text: text,
            metadata: serde_json::json!({
                "file_name": file_name,
                "paragraphs": paragraphs,
                "xml_bytes": xml_bytes,
            }),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "docx_structural"
    }
}

/// Read `word/document.xml` out of a DOCX container.
///
/// Any container problem becomes a single `Parse` error. Reading stops one
/// byte past `max_bytes` so a ZIP bomb cannot inflate unbounded.
pub fn read_document_xml(data: &[u8], max_bytes: u64) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::Parse(format!("Not a valid DOCX file: {}", e)))?;

    let entry = archive.by_name(DOCUMENT_XML).map_err(|_| {
        Error::Parse(format!("Not a valid DOCX file: {} is missing", DOCUMENT_XML))
    })?;

    let mut xml = String::new();
    entry
        .take(max_bytes.saturating_add(1))
        .read_to_string(&mut xml)
        .map_err(|e| Error::Parse(format!("Failed to read {}: {}", DOCUMENT_XML, e)))?;

    if xml.len() as u64 > max_bytes {
        return Err(Error::Parse(format!(
            "{} exceeds the {} byte limit",
            DOCUMENT_XML, max_bytes
        )));
    }
    Ok(xml)
}

/// Collect the non-empty paragraphs of a `document.xml` body.
///
/// Runs inside a paragraph are concatenated with no separator, so words split
/// across formatting runs come back whole.
pub fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    xml.split(PARAGRAPH_END)
        .filter_map(|fragment| {
            let text: String = RUN_TEXT
                .captures_iter(fragment)
                .filter_map(|cap| cap.get(1))
                .map(|m| decode_xml_entities(m.as_str()))
                .collect();
            if text.trim().is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

/// Longest reference body between `&` and `;` that is decoded (`#x0010FFFF`).
const MAX_REFERENCE_BYTES: usize = 10;

/// Decode the predefined XML entities and numeric character references.
/// Unknown or malformed references are left untouched.
pub fn decode_xml_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        // Only a short window is scanned for ';' so runs of bare '&' stay linear.
        let window = &tail.as_bytes()[..tail.len().min(MAX_REFERENCE_BYTES + 2)];
        match window
            .iter()
            .position(|&b| b == b';')
            .and_then(|end| decode_reference(&tail[1..end]).map(|decoded| (decoded, end)))
        {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
