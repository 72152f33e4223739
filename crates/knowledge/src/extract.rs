//! Raw text extraction from PDF, DOCX and plain-text files.

use crate::types::DocType;
use docqa_core::{AppError, AppResult};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Text pulled out of one file, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// The file name
    pub source_id: String,
    pub doc_type: DocType,
    pub raw_text: String,
}

/// Extract the text of a PDF, DOCX or TXT file.
///
/// The type comes from the extension; anything else is an input error
/// carrying the unsupported-type message.
pub fn extract_file(path: &Path) -> AppResult<ExtractedDocument> {
    let doc_type = DocType::from_path(path)?;
    let source_id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Input(format!("Not a file: {}", path.display())))?;

    let raw_text = match doc_type {
        DocType::Txt => fs::read_to_string(path)?,
        DocType::Pdf => extract_pdf(path)?,
        DocType::Docx => extract_docx(path)?,
    };

    tracing::debug!(
        source_id = %source_id,
        doc_type = %doc_type,
        chars = raw_text.chars().count(),
        "Extracted document"
    );

    Ok(ExtractedDocument {
        source_id,
        doc_type,
        raw_text,
    })
}

fn extract_pdf(path: &Path) -> AppResult<String> {
    let document = lopdf::Document::load(path)
        .map_err(|e| AppError::Extraction(format!("Failed to parse PDF {}: {}", path.display(), e)))?;

    let mut text = String::new();
    for page_no in document.get_pages().keys() {
        let page_text = document.extract_text(&[*page_no]).map_err(|e| {
            AppError::Extraction(format!("Failed to read page {} of {}: {}", page_no, path.display(), e))
        })?;

        if page_text.trim().is_empty() {
            continue;
        }
        text.push_str(&format!("\n---- Page {} ----\n", page_no));
        text.push_str(&page_text);
    }

    Ok(text)
}

fn extract_docx(path: &Path) -> AppResult<String> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::Extraction(format!("Failed to open DOCX {}: {}", path.display(), e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| {
            AppError::Extraction(format!("{} has no word/document.xml: {}", path.display(), e))
        })?
        .read_to_string(&mut xml)?;

    Ok(docx_xml_to_text(&xml))
}

/// Paragraph text of a WordprocessingML body.
///
/// Only `<w:t>` run text is kept. Paragraphs become lines; tabs and breaks
/// inside runs are preserved, tab stop definitions are not.
fn docx_xml_to_text(xml: &str) -> String {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_props = false;
    let mut rest = xml;

    while let Some(lt) = rest.find('<') {
        if in_text {
            current.push_str(&decode_entities(&rest[..lt]));
        }
        let Some(gt) = rest[lt..].find('>').map(|g| lt + g) else {
            break;
        };

        let tag = &rest[lt + 1..gt];
        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        match (name, closing) {
            ("w:t", false) => in_text = !self_closing,
            ("w:t", true) => in_text = false,
            ("w:pPr", false) => in_props = !self_closing,
            ("w:pPr", true) => in_props = false,
            ("w:tab", false) if !in_props => current.push('\t'),
            ("w:br", false) | ("w:cr", false) => current.push('\n'),
            ("w:p", false) if self_closing => paragraphs.push(String::new()),
            ("w:p", true) => paragraphs.push(std::mem::take(&mut current)),
            _ => {}
        }

        rest = &rest[gt + 1..];
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs.join("\n")
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match tail.find(';').and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi))) {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
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

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Expand files and directories into the documents to ingest.
///
/// Files named explicitly are kept whatever their type, so the caller can
/// report unsupported ones. Directories contribute only supported files,
/// sorted by path.
pub fn discover_documents(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| DocType::from_path(p).is_ok())
                .collect();
            found.sort();
            documents.extend(found);
        } else {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            )));
        }
    }

    Ok(documents)
}
