use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use http::Uri;
use percent_encoding::percent_decode_str;

use super::error::ParsingError;

/// Content type reported when the server does not send `getcontenttype`
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The resource type token of a collection
pub const COLLECTION: &str = "collection";

// ---- Multistatus envelope, as sent by the server ----

/// 14.16.  multistatus XML Element
///
/// Name:   multistatus
///
/// Purpose:   Contains multiple response messages.
///
/// <!ELEMENT multistatus (response*, responsedescription?)  >
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<Response>,
    pub responsedescription: Option<ResponseDescription>,
}

/// 14.24.  response XML Element
///
/// <!ELEMENT response (href, ((href*, status)|(propstat+)),
///                     error?, responsedescription? , location?) >
///
/// Kept loose on purpose: a response without `href` must not abort the
/// decoding of its siblings, it is discarded when building resources.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Response {
    pub href: Vec<Href>,
    pub status: Option<Status>,
    pub propstat: Vec<PropStat>,
    pub responsedescription: Option<ResponseDescription>,
}

/// 14.22.  propstat XML Element
///
/// Purpose:   Groups together a prop and status element that is
/// associated with a particular 'href' element.
///
/// <!ELEMENT propstat (prop, status, error?, responsedescription?) >
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PropStat {
    pub prop: Vec<Property>,
    pub status: Option<Status>,
    pub responsedescription: Option<ResponseDescription>,
}

/// One child of a `prop` element.
///
/// `value` holds the trimmed text content, or for elements that only
/// contain elements (eg. `resourcetype`) the space separated local names
/// of these children. Empty elements carry no value.
#[derive(Debug, PartialEq, Clone)]
pub struct Property {
    pub name: String,
    pub namespace: Option<String>,
    pub value: Option<String>,
}

/// 14.7.  href XML Element
///
/// <!ELEMENT href (#PCDATA)>
#[derive(Debug, PartialEq, Clone)]
pub struct Href(pub String);

/// 14.28.  status XML Element
///
/// Value:   status-line (defined in Section 6.1 of [RFC2616])
///
/// <!ELEMENT status (#PCDATA) >
///
/// The raw line is kept, servers are creative with the reason phrase.
#[derive(Debug, PartialEq, Clone)]
pub struct Status(pub String);

/// 14.25.  responsedescription XML Element
///
/// <!ELEMENT responsedescription (#PCDATA) >
#[derive(Debug, PartialEq, Clone)]
pub struct ResponseDescription(pub String);

impl Status {
    pub fn is_ok(&self) -> bool {
        self.0.contains("200")
    }

    pub fn code(&self) -> Option<http::StatusCode> {
        let txtcode = self.0.split_whitespace().nth(1)?;
        http::StatusCode::from_bytes(txtcode.as_bytes()).ok()
    }
}

impl PropStat {
    pub fn is_ok(&self) -> bool {
        self.status.as_ref().map(Status::is_ok).unwrap_or(false)
    }
}

impl Response {
    pub fn href(&self) -> Option<&Href> {
        self.href.first()
    }

    /// Properties of all the successful propstat, merged.
    ///
    /// The first value seen for a name wins. A property listed without
    /// any captured value is still recorded, with an empty string.
    pub fn ok_properties(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        let ok_props = self
            .propstat
            .iter()
            .filter(|ps| ps.is_ok())
            .flat_map(|ps| ps.prop.iter());
        for prop in ok_props {
            merged
                .entry(prop.name.clone())
                .or_insert_with(|| prop.value.clone().unwrap_or_default());
        }
        merged
    }
}

// ---- Client side model ----

/// A resource listed in a multistatus response
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DavResource {
    pub href: Uri,
    pub creation: Option<DateTime<FixedOffset>>,
    pub modified: Option<DateTime<FixedOffset>>,
    pub display_name: Option<String>,
    pub content_length: u64,
    pub content_type: String,
    pub etag: Option<String>,
    pub resource_types: Vec<String>,
    pub custom_properties: BTreeMap<String, String>,
}

impl DavResource {
    pub fn new(href: Uri) -> Self {
        Self {
            href,
            creation: None,
            modified: None,
            display_name: None,
            content_length: 0,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            etag: None,
            resource_types: vec![],
            custom_properties: BTreeMap::new(),
        }
    }

    /// Build a resource from its href and the merged properties of its
    /// successful propstat.
    ///
    /// Only the href can make the build fail, unparsable properties are
    /// left unset.
    pub fn from_properties(
        href: &str,
        properties: BTreeMap<String, String>,
    ) -> Result<Self, ParsingError> {
        let href = Uri::from_str(href.trim())?;
        let prop = |name: &str| {
            properties
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let creation = prop("creationdate").and_then(parse_date);
        let modified = prop("getlastmodified").and_then(parse_date);
        let display_name = prop("displayname").map(str::to_string);
        let content_length = prop("getcontentlength")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let content_type = prop("getcontenttype")
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let etag = prop("getetag").map(str::to_string);
        let resource_types = match prop("resourcetype") {
            Some(rt) if rt.split_whitespace().any(|t| t == COLLECTION) => {
                vec![COLLECTION.to_string()]
            }
            _ => vec![],
        };

        Ok(Self {
            href,
            creation,
            modified,
            display_name,
            content_length,
            content_type,
            etag,
            resource_types,
            custom_properties: properties,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.resource_types.iter().any(|t| t == COLLECTION)
    }

    /// Percent-decoded path of the href
    pub fn path(&self) -> String {
        percent_decode_str(self.href.path())
            .decode_utf8_lossy()
            .into_owned()
    }

    /// Last segment of the path, ignoring the trailing slash of collections
    pub fn name(&self) -> String {
        self.href
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn custom_property(&self, name: &str) -> Option<&str> {
        self.custom_properties.get(name).map(String::as_str)
    }

    pub fn with_display_name(self, display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..self
        }
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..self
        }
    }

    pub fn with_content_length(self, content_length: u64) -> Self {
        Self {
            content_length,
            ..self
        }
    }

    pub fn with_etag(self, etag: impl Into<String>) -> Self {
        Self {
            etag: Some(etag.into()),
            ..self
        }
    }

    pub fn with_custom_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.custom_properties.insert(name.into(), value.into());
        self
    }
}

// creationdate is RFC3339, getlastmodified is an HTTP-date,
// both are seen in the wild for each of them.
fn parse_date(v: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(v)
        .or_else(|_| DateTime::parse_from_rfc2822(v))
        .ok()
}

/// 14.13.  lockscope XML Element
///
/// Purpose:   Specifies whether a lock is an exclusive lock, or a shared
/// lock.
/// <!ELEMENT lockscope (exclusive | shared) >
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LockScope {
    #[default]
    Exclusive,
    Shared,
}

/// 14.15.  locktype XML Element
///
/// Purpose:   Specifies the access type of a lock.  At present, this
/// specification only defines one lock type, the write lock.
///
/// <!ELEMENT locktype (write) >
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LockType {
    #[default]
    Write,
}

impl LockScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Shared => "shared",
        }
    }
}

impl LockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Write => "write",
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 14.1.  activelock XML Element
///
/// Purpose:   Describes a lock on a resource.
/// <!ELEMENT activelock (lockscope, locktype, depth, owner?, timeout?,
///           locktoken?, lockroot)>
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Activelock {
    pub lockscope: LockScope,
    pub locktype: LockType,
    pub depth: String,
    pub owner: Option<String>,
    pub timeout: Option<String>,
    pub locktoken: Option<String>,
}

impl Default for Activelock {
    fn default() -> Self {
        Self {
            lockscope: LockScope::Exclusive,
            locktype: LockType::Write,
            depth: "0".to_string(),
            owner: None,
            timeout: None,
            locktoken: None,
        }
    }
}

impl Activelock {
    pub fn is_shared(&self) -> bool {
        self.lockscope == LockScope::Shared
    }
}
