//! Request line parsing
//!
//! A request is one line: `<selector>[TAB<search terms>]`. Parsing never
//! fails; malformed input degrades to the root selector, because the
//! protocol has no way to report a parse error before the response.

use crate::constants::protocol::{ROOT_SELECTOR, TAB};

/// A parsed client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    selector: String,
    search_terms: Option<Vec<String>>,
}

impl Request {
    /// Parse a raw request line
    ///
    /// Trailing CR/LF are stripped. The first tab-separated field is the
    /// selector (empty becomes `/`); every later field is split on
    /// whitespace into search terms.
    ///
    /// # Examples
    /// ```
    /// use gopher_server::protocol::Request;
    ///
    /// let req = Request::parse("/docs\tfoo bar\r\n");
    /// assert_eq!(req.selector(), "/docs");
    /// assert_eq!(req.search_terms(), Some(&["foo".to_string(), "bar".to_string()][..]));
    ///
    /// assert_eq!(Request::parse("").selector(), "/");
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.split(TAB);

        let selector = match fields.next() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => ROOT_SELECTOR.to_string(),
        };

        let terms: Vec<String> = fields
            .flat_map(str::split_whitespace)
            .map(str::to_string)
            .collect();

        Self {
            selector,
            search_terms: (!terms.is_empty()).then_some(terms),
        }
    }

    /// Parse raw bytes, replacing invalid UTF-8
    ///
    /// Replacement characters are later rejected by selector validation.
    #[must_use]
    pub fn parse_bytes(line: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(line))
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn search_terms(&self) -> Option<&[String]> {
        self.search_terms.as_deref()
    }

    #[must_use]
    pub fn is_search(&self) -> bool {
        self.search_terms.is_some()
    }
}
