//! Negotiation of the `Authorization` header of a WebDAV client.
//!
//! ## Trace
//!
//! ```text
//! C: PROPFIND /dav/ HTTP/1.1
//! S: HTTP/1.1 401 Unauthorized
//! S: WWW-Authenticate: NTLM
//! C: PROPFIND /dav/ HTTP/1.1
//! C: Authorization: NTLM TlRMTVNTUAABAAAAB4IIogAAAAAAAAAAAAAAAAAAAAAGAbEdAAAADw==
//! S: HTTP/1.1 401 Unauthorized
//! S: WWW-Authenticate: NTLM TlRMTVNTUAACAAAADAAMADgAAAAFgomi...
//! C: PROPFIND /dav/ HTTP/1.1
//! C: Authorization: NTLM TlRMTVNTUAADAAAAGAAYAHIAAAAYABgAigAAAAwADABIAAAA...
//! S: HTTP/1.1 207 Multi-Status
//! ```
//!
//! ## RFC References
//!
//! HTTP Authentication - https://datatracker.ietf.org/doc/html/rfc7235
//! Basic - https://datatracker.ietf.org/doc/html/rfc7617
//! Digest - https://datatracker.ietf.org/doc/html/rfc7616
//!
//! ## NTLM References
//!
//! https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-nlmp/

pub mod types;

pub mod decode;
pub mod encode;
pub mod error;
pub mod flow;

pub mod config;
pub mod handler;

pub mod basic;
pub mod custom;
pub mod digest;
pub mod ntlm;

pub use basic::BasicAuthHandler;
pub use config::AuthConfig;
pub use custom::CustomAuthHandler;
pub use digest::{DigestAuthHandler, DigestEngine};
pub use error::AuthError;
pub use flow::AuthChain;
pub use handler::AuthHandler;
pub use ntlm::{NtlmAuthHandler, NtlmEngine};
pub use types::{Challenge, Credentials, DigestChallenge, RequestContext};
