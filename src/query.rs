//! Query construction: turn a document reference into a parameter bag.
//!
//! A conversion source is either a URL the service fetches or inline HTML it
//! renders. [`ConvertQuery`] classifies the caller's string with a plain
//! `"http"` prefix test and files it under the matching parameter name. No
//! other validation happens here; the client checks presence and the service
//! checks everything else.

use crate::params::{ConvertParameters, ParamValue, DOCUMENT_HTML, DOCUMENT_URL};
use serde::{Deserialize, Serialize};

/// The conversion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentReference {
    /// A URL the service will fetch and render.
    Url(String),
    /// Inline HTML markup.
    Html(String),
}

impl DocumentReference {
    /// Classify `document`: anything starting with the literal `http`
    /// (case-sensitive) is a URL, everything else is HTML.
    pub fn classify(document: impl Into<String>) -> Self {
        let document = document.into();
        if is_url(&document) {
            DocumentReference::Url(document)
        } else {
            DocumentReference::Html(document)
        }
    }

    /// The parameter name this reference is sent under.
    pub fn param_name(&self) -> &'static str {
        match self {
            DocumentReference::Url(_) => DOCUMENT_URL,
            DocumentReference::Html(_) => DOCUMENT_HTML,
        }
    }

    /// The raw, unencoded value.
    pub fn value(&self) -> &str {
        match self {
            DocumentReference::Url(s) | DocumentReference::Html(s) => s,
        }
    }

    /// The parameter name of the other variant.
    fn other_param_name(&self) -> &'static str {
        match self {
            DocumentReference::Url(_) => DOCUMENT_HTML,
            DocumentReference::Html(_) => DOCUMENT_URL,
        }
    }
}

/// Check if the document string should be sent as a URL.
pub fn is_url(document: &str) -> bool {
    document.starts_with("http")
}

/// A document reference plus parameter overrides, ready to hand to
/// [`crate::Client::convert`].
///
/// # Example
/// ```rust
/// use pdflayer::{ConvertQuery, ConvertParameters};
/// use pdflayer::params::{PageSize, DOCUMENT_URL};
///
/// let query = ConvertQuery::new(
///     "https://en.wikipedia.org/wiki/Special:Random",
///     Some(ConvertParameters::new().page_size(PageSize::A4)),
/// );
/// let params = query.into_params();
/// assert!(params.contains(DOCUMENT_URL));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertQuery {
    document: DocumentReference,
    params: ConvertParameters,
}

impl ConvertQuery {
    /// Build a query for `document`, overlaying `overrides`.
    ///
    /// The document key always wins over an entry of the same name in
    /// `overrides`, and the other document key is dropped, so the resulting
    /// bag holds exactly one of `document_url` / `document_html`.
    pub fn new(document: impl Into<String>, overrides: Option<ConvertParameters>) -> Self {
        let document = DocumentReference::classify(document);
        let mut params = overrides.unwrap_or_default();
        params.remove(document.other_param_name());
        params.set(document.param_name(), document.value());
        Self { document, params }
    }

    pub fn document(&self) -> &DocumentReference {
        &self.document
    }

    pub fn params(&self) -> &ConvertParameters {
        &self.params
    }

    /// Set an additional parameter on the query.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let key = key.into();
        // The document keys are owned by the classifier.
        if key != DOCUMENT_URL && key != DOCUMENT_HTML {
            self.params.set(key, value);
        }
        self
    }

    pub fn into_params(self) -> ConvertParameters {
        self.params
    }
}

impl From<ConvertQuery> for ConvertParameters {
    fn from(query: ConvertQuery) -> Self {
        query.into_params()
    }
}
