use base64::Engine;

use super::types::*;

/// `<scheme> <token>`, the value of an `Authorization` header
pub fn authorization(scheme: &str, token: &str) -> String {
    format!("{} {}", scheme, token)
}

/// RFC 7617, 2. The 'Basic' Authentication Scheme
///
/// The user-id is prefixed by the Windows domain when there is one.
pub fn basic_token(creds: &Credentials) -> String {
    let user_pass = format!("{}:{}", creds.user_part(), creds.password);
    base64::engine::general_purpose::STANDARD.encode(user_pass)
}
