// src/process/extract.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::process::records::{RawRecord, FIELD_COUNT};
use crate::process::utils::normalize_ws;

static TBODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody").expect("tbody selector should parse"));

/// Visible text of one table cell.
pub trait CellText {
    fn cell_text(&self) -> String;
}

impl CellText for ElementRef<'_> {
    /// `<br>` becomes a space, every other tag is dropped, whitespace collapses.
    fn cell_text(&self) -> String {
        let mut raw = String::new();
        for node in self.descendants() {
            match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(el) if el.name() == "br" => raw.push(' '),
                _ => {}
            }
        }
        normalize_ws(&raw)
    }
}

impl CellText for &str {
    fn cell_text(&self) -> String {
        normalize_ws(self)
    }
}

/// Build a record from the first six cells of row `row` (1-based, for messages).
pub fn record_from_cells<C: CellText>(row: usize, cells: &[C]) -> Result<RawRecord> {
    if cells.len() < FIELD_COUNT {
        return Err(ScrapeError::MalformedInput(format!(
            "row {}: expected at least {} cells, found {}",
            row,
            FIELD_COUNT,
            cells.len()
        )));
    }
    let texts: Vec<String> = cells[..FIELD_COUNT].iter().map(CellText::cell_text).collect();
    RawRecord::try_from(texts)
}

/// Byte offset of the first `<tbody` written in `html`, ignoring case.
pub fn table_body_offset(html: &str) -> Option<usize> {
    html.to_ascii_lowercase().find("<tbody")
}

/// Whether `html` contains a table body at all. An unloaded report page does not.
pub fn has_table_body(html: &str) -> bool {
    table_body_offset(html).is_some()
}

/// Extract every data row of the first `<tbody>` in `html`, in document order.
pub fn extract(html: &str) -> Result<Vec<RawRecord>> {
    let offset = table_body_offset(html).ok_or_else(|| {
        ScrapeError::MalformedInput("no <tbody> marker found".to_string())
    })?;

    // Earlier tables with bare rows get an implied <tbody> from the tree builder,
    // so parsing starts at the written marker, re-opened inside a <table>.
    let doc = Html::parse_document(&format!("<table>{}", &html[offset..]));
    let tbody = doc.select(&TBODY).next().ok_or_else(|| {
        ScrapeError::MalformedInput("<tbody> marker is not inside a parsable table".to_string())
    })?;

    let mut records = Vec::new();
    for (i, tr) in child_elements(tbody, "tr").enumerate() {
        let cells: Vec<ElementRef> = child_elements(tr, "td").collect();
        if cells.is_empty() {
            debug!(row = i + 1, "skipping row without data cells");
            continue;
        }
        records.push(record_from_cells(i + 1, &cells)?);
    }

    debug!(rows = records.len(), "extracted report rows");
    Ok(records)
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}
