//! Extraction of typed records from the three portal pages.
//!
//! Each parser looks for one fixed anchor (a table id, a caption, a form
//! field) and fails loudly when it is missing, so markup changes on the
//! portal show up as errors rather than as empty results.

mod activity;
mod login;
mod overview;

pub use activity::parse_activity;
pub use login::parse_login;
pub(crate) use login::TOKEN_FIELD;
pub use overview::parse_overview;

use std::borrow::Cow;

use scraper::{ElementRef, Html};

use crate::error::{Error, Page, Result};
use crate::html;

fn document(input: &[u8]) -> Html {
    let source = match std::str::from_utf8(input) {
        Ok(source) => Cow::Borrowed(source),
        Err(err) => {
            tracing::warn!(error = %err, "Page is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(input)
        }
    };
    Html::parse_document(&source)
}

/// The `<table>` whose id is `id`.
fn table_by_id<'a>(doc: &'a Html, page: Page, id: &str) -> Result<ElementRef<'a>> {
    html::find_by_attr(doc.root_element(), "id", id)
        .filter(|table| table.value().name() == "table")
        .ok_or_else(|| Error::missing(page, &format!("<table id=\"{id}\">")))
}

fn tbody<'a>(table: ElementRef<'a>, page: Page) -> Result<ElementRef<'a>> {
    html::find_by_name(table, "tbody").ok_or_else(|| Error::missing(page, "<tbody>"))
}
