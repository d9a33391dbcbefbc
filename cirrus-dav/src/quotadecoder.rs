use super::error::ParsingError;
use super::quotatypes::DavQuota;
use super::tree::Element;

const QUOTA_AVAILABLE_BYTES: &str = "quota-available-bytes";
const QUOTA_USED_BYTES: &str = "quota-used-bytes";
// not in RFC4331, sent by some servers
const QUOTA_TOTAL_BYTES: &str = "quota-total-bytes";

/// Decode the quota properties (RFC4331) of the first `prop` of a
/// PROPFIND answer. Any other property having a text value is kept as
/// an extension property.
pub fn parse_quota(src: &str) -> DavQuota {
    try_parse_quota(src).unwrap_or_else(|err| {
        tracing::debug!(err=%err, "unusable quota answer, assuming unknown quota");
        DavQuota::default()
    })
}

pub fn try_parse_quota(src: &str) -> Result<DavQuota, ParsingError> {
    let doc = Element::parse(src)?;
    let prop = doc.find_first("prop").ok_or(ParsingError::TagNotFound("prop"))?;
    let bytes = |name: &str| {
        prop.child(name)
            .and_then(|e| e.text().parse::<u64>().ok())
    };

    let resource_url = doc
        .find_first("response")
        .and_then(|r| r.child("href"))
        .map(Element::text)
        .filter(|h| !h.is_empty());

    let extension_properties = prop
        .elements()
        .filter(|e| {
            ![QUOTA_AVAILABLE_BYTES, QUOTA_USED_BYTES, QUOTA_TOTAL_BYTES].contains(&e.name.as_str())
        })
        .map(|e| (e.name.clone(), e.text()))
        .filter(|(_, v)| !v.is_empty())
        .collect();

    Ok(DavQuota {
        quota_available_bytes: bytes(QUOTA_AVAILABLE_BYTES),
        quota_used_bytes: bytes(QUOTA_USED_BYTES),
        quota_total_bytes: bytes(QUOTA_TOTAL_BYTES),
        resource_url,
        extension_properties,
    })
}
