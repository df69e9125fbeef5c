//! Error type for portal access and page extraction.

use std::fmt;

use reqwest::StatusCode;

use crate::fields::FieldError;

/// Which portal page an extraction error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Overview,
    Activity,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Page::Login => "login",
            Page::Overview => "overview",
            Page::Activity => "activity",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response.
    #[error("HTTP request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The portal answered with a non-success status.
    #[error("HTTP response {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// An expected anchor, row or cell was missing or had the wrong shape.
    #[error("{page} page: {detail}")]
    Structure { page: Page, detail: String },

    /// A cell was present but did not parse.
    #[error("{page} page: {context}")]
    Field {
        page: Page,
        context: String,
        #[source]
        source: FieldError,
    },

    /// The session could not be (re-)established.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("auth store: {0:#}")]
    AuthStore(anyhow::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn structure(page: Page, detail: impl Into<String>) -> Self {
        Error::Structure {
            page,
            detail: detail.into(),
        }
    }

    pub(crate) fn missing(page: Page, anchor: &str) -> Self {
        Error::structure(page, format!("did not find {anchor}"))
    }

    pub(crate) fn field(page: Page, context: impl Into<String>, source: FieldError) -> Self {
        Error::Field {
            page,
            context: context.into(),
            source,
        }
    }

    pub(crate) fn authentication(reason: impl Into<String>) -> Self {
        Error::Authentication {
            reason: reason.into(),
        }
    }

    /// True when the portal rejected the stored credentials or kept
    /// bouncing us back to the login page.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// True for errors raised while reading a page's markup.
    pub fn is_extraction(&self) -> bool {
        matches!(self, Error::Structure { .. } | Error::Field { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
