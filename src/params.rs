//! Parameter catalogue and the parameter bag sent to the service.
//!
//! The service accepts a flat set of named query parameters. Every name it
//! knows is listed here as a constant, together with the enumerated values
//! and documented defaults for the few parameters that have them. The names
//! are data, not behaviour: the client forwards whatever is in a
//! [`ConvertParameters`] bag and lets the service validate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ── Parameter names ──────────────────────────────────────────────────────

pub const SECRET_KEY: &str = "secret_key";
pub const DOCUMENT_URL: &str = "document_url";
pub const DOCUMENT_HTML: &str = "document_html";
pub const EXPORT: &str = "export";
pub const DOCUMENT_NAME: &str = "document_name";
pub const DOCUMENT_UNIT: &str = "document_unit";
pub const USER_AGENT: &str = "user_agent";
pub const ACCEPT_LANG: &str = "accept_lang";
pub const TEXT_ENCODING: &str = "text_encoding";
pub const TTL: &str = "ttl";
pub const FORCE: &str = "force";
pub const INLINE: &str = "inline";
pub const AUTH_USER: &str = "auth_user";
pub const AUTH_PASSWORD: &str = "auth_password";
pub const ENCRYPTION: &str = "encryption";
pub const NO_IMAGES: &str = "no_images";
pub const NO_HYPERLINKS: &str = "no_hyperlinks";
pub const NO_BACKGROUNDS: &str = "no_backgrounds";
pub const NO_JAVASCRIPT: &str = "no_javascript";
pub const USE_PRINT_MEDIA: &str = "use_print_media";
pub const GRAYSCALE: &str = "grayscale";
pub const LOW_QUALITY: &str = "low_quality";
pub const FORMS: &str = "forms";
pub const NO_PRINT: &str = "no_print";
pub const NO_MODIFY: &str = "no_modify";
pub const NO_COPY: &str = "no_copy";
pub const PAGE_SIZE: &str = "page_size";
pub const PAGE_WIDTH: &str = "page_width";
pub const PAGE_HEIGHT: &str = "page_height";
pub const ORIENTATION: &str = "orientation";
pub const HEADER_TEXT: &str = "header_text";
pub const HEADER_ALIGN: &str = "header_align";
pub const HEADER_URL: &str = "header_url";
pub const HEADER_HTML: &str = "header_html";
pub const HEADER_SPACING: &str = "header_spacing";
pub const FOOTER_TEXT: &str = "footer_text";
pub const FOOTER_ALIGN: &str = "footer_align";
pub const FOOTER_URL: &str = "footer_url";
pub const FOOTER_HTML: &str = "footer_html";
pub const FOOTER_SPACING: &str = "footer_spacing";
pub const CSS_URL: &str = "css_url";
pub const DELAY: &str = "delay";
pub const DPI: &str = "dpi";
pub const ZOOM: &str = "zoom";
pub const PAGE_NUMBERING_OFFSET: &str = "page_numbering_offset";
pub const WATERMARK_URL: &str = "watermark_url";
pub const WATERMARK_OPACITY: &str = "watermark_opacity";
pub const WATERMARK_OFFSET_X: &str = "watermark_offset_x";
pub const WATERMARK_OFFSET_Y: &str = "watermark_offset_y";
pub const WATERMARK_IN_BACKGROUND: &str = "watermark_in_background";
pub const TITLE: &str = "title";
pub const SUBJECT: &str = "subject";
pub const CREATOR: &str = "creator";
pub const AUTHOR: &str = "author";

// ── Documented defaults ──────────────────────────────────────────────────

pub const DOCUMENT_NAME_DEFAULT: &str = "pdflayer.com";
pub const DOCUMENT_UNIT_DEFAULT: DocumentUnit = DocumentUnit::Px;
pub const TEXT_ENCODING_DEFAULT: TextEncoding = TextEncoding::Utf8;
/// Cache lifetime of a generated document, in seconds (30 days).
pub const TTL_DEFAULT: i64 = 2_592_000;
pub const HEADER_ALIGN_DEFAULT: Align = Align::Center;
pub const FOOTER_ALIGN_DEFAULT: Align = Align::Center;
pub const DPI_DEFAULT: i64 = 96;
pub const WATERMARK_OPACITY_DEFAULT: i64 = 20;
pub const CREATOR_DEFAULT: &str = "pdflayer.com";

/// Value of the boolean flags (`no_images`, `no_hyperlinks`,
/// `watermark_in_background`, …) when switched on.
pub const FLAG_TRUE: i64 = 1;
/// Value of the boolean flags when switched off.
pub const FLAG_FALSE: i64 = 0;

// ── Enumerations ─────────────────────────────────────────────────────────

/// Implements `as_str`, `Display` and `From<_> for ParamValue` for a
/// wire-enumeration.
macro_rules! wire_enum {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// All values in catalogue order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The value as sent on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$ty> for ParamValue {
            fn from(v: $ty) -> Self {
                ParamValue::Text(v.as_str().to_string())
            }
        }
    };
}

/// Unit for `page_width`, `page_height` and the spacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentUnit {
    Mm,
    In,
    #[default]
    Px,
    Pt,
}

wire_enum!(DocumentUnit { Mm => "mm", In => "in", Px => "px", Pt => "pt" });

/// Text encoding of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16,
}

wire_enum!(TextEncoding { Utf8 => "utf8", Utf16 => "utf16" });

/// PDF encryption strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encryption {
    Bits40,
    Bits128,
}

wire_enum!(Encryption { Bits40 => "encryption_40", Bits128 => "encryption_128" });

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

wire_enum!(Orientation { Portrait => "portrait", Landscape => "landscape" });

/// Header/footer alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Center,
    Left,
    Right,
}

wire_enum!(Align { Center => "center", Left => "left", Right => "right" });

/// Named page sizes accepted by `page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    C5E,
    Comm10E,
    DLE,
    Executive,
    Folio,
    Ledger,
    Legal,
    Letter,
    Tabloid,
}

wire_enum!(PageSize {
    A0 => "A0", A1 => "A1", A2 => "A2", A3 => "A3", A4 => "A4",
    A5 => "A5", A6 => "A6", A7 => "A7", A8 => "A8", A9 => "A9",
    B0 => "B0", B1 => "B1", B2 => "B2", B3 => "B3", B4 => "B4",
    B5 => "B5", B6 => "B6", B7 => "B7", B8 => "B8", B9 => "B9",
    C5E => "C5E",
    Comm10E => "Comm10E",
    DLE => "DLE",
    Executive => "Executive",
    Folio => "Folio",
    Ledger => "Ledger",
    Legal => "Legal",
    Letter => "Letter",
    Tabloid => "Tabloid",
});

impl PageSize {
    /// Look up a page size by its wire name (case-sensitive, as the service is).
    pub fn from_wire(name: &str) -> Option<PageSize> {
        PageSize::ALL.iter().copied().find(|p| p.as_str() == name)
    }
}

// ── Parameter values ─────────────────────────────────────────────────────

/// A single parameter value: text or integer.
///
/// Enumerated constants convert into `Text` via `From`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Int(i64),
}

impl ParamValue {
    /// The value as a string slice, when it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n.into())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(n.into())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Int(if b { FLAG_TRUE } else { FLAG_FALSE })
    }
}

// ── Parameter bag ────────────────────────────────────────────────────────

/// The set of query parameters for one conversion request.
///
/// Keys are parameter names from this module's catalogue; unknown keys are
/// kept and forwarded as-is. Iteration order is by key, which keeps the
/// dispatched query string stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConvertParameters {
    values: BTreeMap<String, ParamValue>,
}

impl ConvertParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Chainable form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay every entry of `other` onto `self`; entries in `other` win.
    pub fn extend(&mut self, other: ConvertParameters) {
        self.values.extend(other.values);
    }

    /// Whether the bag names a document to convert.
    pub fn has_document(&self) -> bool {
        self.contains(DOCUMENT_URL) || self.contains(DOCUMENT_HTML)
    }

    /// The local export path, if the caller asked for one.
    pub fn export_path(&self) -> Option<String> {
        self.get(EXPORT).map(ParamValue::to_string)
    }

    /// Render the bag as string pairs for a query string.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    // ── Typed setters for the enumerated parameters ──────────────────────

    pub fn page_size(self, size: PageSize) -> Self {
        self.with(PAGE_SIZE, size)
    }

    pub fn orientation(self, orientation: Orientation) -> Self {
        self.with(ORIENTATION, orientation)
    }

    pub fn document_unit(self, unit: DocumentUnit) -> Self {
        self.with(DOCUMENT_UNIT, unit)
    }

    pub fn text_encoding(self, encoding: TextEncoding) -> Self {
        self.with(TEXT_ENCODING, encoding)
    }

    pub fn encryption(self, encryption: Encryption) -> Self {
        self.with(ENCRYPTION, encryption)
    }

    pub fn header_align(self, align: Align) -> Self {
        self.with(HEADER_ALIGN, align)
    }

    pub fn footer_align(self, align: Align) -> Self {
        self.with(FOOTER_ALIGN, align)
    }

    pub fn document_name(self, name: impl Into<String>) -> Self {
        self.with(DOCUMENT_NAME, name.into())
    }

    /// Ask the client to save the PDF to `path` instead of returning it.
    ///
    /// If the service answers with a JSON body that carries no `error`
    /// field, that JSON is written to `path` as-is and a warning is logged.
    pub fn export(self, path: impl Into<String>) -> Self {
        self.with(EXPORT, path.into())
    }
}

impl<K, V> FromIterator<(K, V)> for ConvertParameters
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ConvertParameters::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_catalogue_is_complete() {
        assert_eq!(PageSize::ALL.len(), 29);
        assert_eq!(PageSize::from_wire("A4"), Some(PageSize::A4));
        assert_eq!(PageSize::from_wire("Comm10E"), Some(PageSize::Comm10E));
        assert_eq!(PageSize::from_wire("a4"), None);
    }

    #[test]
    fn enum_values_render_wire_text() {
        let params = ConvertParameters::new()
            .page_size(PageSize::Letter)
            .orientation(Orientation::Landscape)
            .encryption(Encryption::Bits128)
            .document_unit(DOCUMENT_UNIT_DEFAULT);

        assert_eq!(params.get(PAGE_SIZE), Some(&ParamValue::from("Letter")));
        assert_eq!(params.get(ORIENTATION), Some(&ParamValue::from("landscape")));
        assert_eq!(params.get(ENCRYPTION), Some(&ParamValue::from("encryption_128")));
        assert_eq!(params.get(DOCUMENT_UNIT), Some(&ParamValue::from("px")));
    }

    #[test]
    fn flags_render_as_integers() {
        let params = ConvertParameters::new()
            .with(NO_IMAGES, true)
            .with(GRAYSCALE, false)
            .with(DPI, DPI_DEFAULT);
        let pairs = params.to_query_pairs();
        assert!(pairs.contains(&("no_images".into(), "1".into())));
        assert!(pairs.contains(&("grayscale".into(), "0".into())));
        assert!(pairs.contains(&("dpi".into(), "96".into())));
    }

    #[test]
    fn extend_overrides_existing_keys() {
        let mut base = ConvertParameters::new().with(TITLE, "old").with(AUTHOR, "me");
        base.extend(ConvertParameters::new().with(TITLE, "new"));
        assert_eq!(base.get(TITLE), Some(&ParamValue::from("new")));
        assert_eq!(base.get(AUTHOR), Some(&ParamValue::from("me")));
    }

    #[test]
    fn export_path_and_document_presence() {
        let params = ConvertParameters::new().export("out/doc.pdf");
        assert_eq!(params.export_path().as_deref(), Some("out/doc.pdf"));
        assert!(!params.has_document());
        assert!(params.with(DOCUMENT_HTML, "<p>x</p>").has_document());
    }

    #[test]
    fn serialises_as_flat_object() {
        let params: ConvertParameters =
            [(TTL, ParamValue::from(TTL_DEFAULT))].into_iter().collect();
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"ttl":2592000}"#);
    }
}
