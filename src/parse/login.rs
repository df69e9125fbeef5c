use crate::error::{Error, Page, Result};
use crate::html;

use super::document;

/// Name of the hidden form field carrying the login form's CSRF token.
pub(crate) const TOKEN_FIELD: &str = "CSRFToken";

/// Extract the CSRF token from the login page.
pub fn parse_login(input: &[u8]) -> Result<String> {
    let doc = document(input);

    let field = html::find_by_attr(doc.root_element(), "name", TOKEN_FIELD)
        .ok_or_else(|| Error::missing(Page::Login, &format!("{TOKEN_FIELD} <input>")))?;

    html::attr(field, "value")
        .map(str::to_string)
        .ok_or_else(|| {
            Error::structure(
                Page::Login,
                format!("unexpected form of {TOKEN_FIELD}: {}", html::render(field)),
            )
        })
}
