// utils
pub mod error;
pub mod tree;
pub mod xml;

// webdav
pub mod decoder;
pub mod types;

// acl
pub mod acldecoder;
pub mod acltypes;

// versioning (reports only)
pub mod versioningdecoder;

// quota
pub mod quotadecoder;
pub mod quotatypes;

pub use acldecoder::{parse_acl, parse_current_user_privilege_set};
pub use acltypes::{DavAce, DavAcl};
pub use decoder::{parse_lockdiscovery, parse_resources};
pub use error::{DavError, ParsingError};
pub use quotadecoder::parse_quota;
pub use quotatypes::DavQuota;
pub use types::{Activelock, DavResource, LockScope, LockType};
pub use versioningdecoder::parse_supported_report_set;
