use quick_xml::events::attributes::AttrError;

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Recoverable")]
    Recoverable,
    #[error("Missing child")]
    MissingChild,
    #[error("Wrong token")]
    WrongToken,
    #[error("Tag not found: {0}")]
    TagNotFound(&'static str),
    #[error("Utf8 Error")]
    Utf8Error(#[from] std::str::Utf8Error),
    #[error("Quick XML error")]
    QuickXml(#[from] quick_xml::Error),
    #[error("Invalid URI")]
    Uri(#[from] http::uri::InvalidUri),
    #[error("Found EOF while expecting data")]
    Eof,
    #[error("Nesting deeper than {0} elements")]
    TooDeep(usize),
}

impl From<AttrError> for ParsingError {
    fn from(value: AttrError) -> Self {
        Self::QuickXml(value.into())
    }
}

/// Errors surfaced to the client by the strict decoders.
///
/// Only the multistatus envelope decoder reports errors, the other
/// parsers degrade to an empty value.
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    #[error("XML parsing failed")]
    XmlParsing(#[source] ParsingError),
}
