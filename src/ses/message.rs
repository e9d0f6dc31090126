//! Email envelope

/// A single email: sender, recipients, subject and body.
///
/// `html` is the primary body. When `text` is unset the plain-text part is
/// rendered from the HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

impl Mail {
    pub fn new(from: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn to<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn cc<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc.extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn bcc<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Explicit plain-text alternative
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Plain-text part sent alongside the HTML
    pub fn text_body(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => html_to_text(&self.html),
        }
    }
}

/// Strip tags, decode the common entities and collapse whitespace
pub fn html_to_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // a '<' only opens a tag when a name, closing slash, comment or
            // processing instruction follows it
            '<' if !in_tag
                && chars
                    .peek()
                    .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?')) =>
            {
                in_tag = true
            }
            '>' if in_tag => {
                in_tag = false;
                // tags separate words
                stripped.push(' ');
            }
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
