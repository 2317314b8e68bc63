use readability::extractor;
use reqwest::Url;
use std::io::Cursor;
use thiserror::Error;

/// Text rendering width. Wide enough that article prose never hard-wraps.
const RENDER_WIDTH: usize = 10_000;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid source url: {0}")]
    Url(String),
    #[error("readability extraction failed: {0}")]
    Readability(String),
    #[error("text rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone)]
pub struct Extracted {
    pub title: Option<String>,
    pub content_text: String,
}

/// Isolate the main article content of a fetched page and render it as
/// markdown-ish text (links kept as reference footnotes, images dropped,
/// no hard wrapping at prose widths).
pub fn extract_readable(html: &str, url: &str) -> Result<Extracted, ExtractError> {
    let base = Url::parse(url).map_err(|e| ExtractError::Url(e.to_string()))?;
    let mut cursor = Cursor::new(html.as_bytes());

    let product = extractor::extract(&mut cursor, &base)
        .map_err(|e| ExtractError::Readability(e.to_string()))?;

    // The isolated fragment is still HTML; render it to text.
    let content_text = html2text::from_read(product.content.as_bytes(), RENDER_WIDTH)
        .map_err(|e| ExtractError::Render(e.to_string()))?;

    let title = product.title.trim().to_string();
    Ok(Extracted {
        title: (!title.is_empty()).then_some(title),
        content_text,
    })
}
