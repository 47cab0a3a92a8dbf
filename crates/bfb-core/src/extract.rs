//! Default document extraction: plain-text files only.
//!
//! Format-specific parsers (PDF, DOCX, ...) plug in behind the
//! `DocumentExtractor` port; this implementation covers the text-like
//! extensions and refuses everything else with an empty excerpt, which the
//! dispatcher turns into a validation reply.

use async_trait::async_trait;

use crate::{
    ports::{DocumentExtractor, Extracted},
    Result,
};

const TEXT_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".json", ".yaml", ".yml", ".csv", ".xml", ".html", ".css", ".js", ".ts", ".py",
    ".sh", ".log", ".cfg", ".ini", ".toml",
];

fn is_text_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    TEXT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn format_label(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{} file", ext.to_lowercase()),
        _ => "file".to_string(),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<Extracted> {
        let label = format_label(file_name);

        if !is_text_file(file_name) {
            return Ok(Extracted {
                label,
                text: String::new(),
            });
        }

        let text = String::from_utf8_lossy(bytes).into_owned();
        Ok(Extracted { label, text })
    }
}
