use std::collections::BTreeSet;

use super::acltypes::*;
use super::error::ParsingError;
use super::tree::Element;

/// Decode the DAV:acl property of a PROPFIND answer.
///
/// ACLs are optional in most servers, an unusable answer is considered
/// as an empty ACL.
pub fn parse_acl(src: &str) -> DavAcl {
    try_parse_acl(src).unwrap_or_else(|err| {
        tracing::debug!(err=%err, "unusable acl, assuming no entry");
        DavAcl::default()
    })
}

pub fn try_parse_acl(src: &str) -> Result<DavAcl, ParsingError> {
    let doc = Element::parse(src)?;
    let response = doc
        .find_first("response")
        .ok_or(ParsingError::TagNotFound("response"))?;
    let acl = response
        .find_first("prop")
        .and_then(|prop| prop.find_first("acl"))
        .ok_or(ParsingError::TagNotFound("acl"))?;

    let resource_url = response.child("href").map(Element::text).filter(|h| !h.is_empty());
    let aces = acl.elements().filter(|e| e.name == "ace").map(ace).collect();

    Ok(DavAcl::new(aces, resource_url))
}

/// <!ELEMENT ace ((principal | invert), (grant|deny), protected?, inherited?)>
fn ace(elem: &Element) -> DavAce {
    // a deny wins over a grant sent in the same entry
    let grant = elem.has_child("grant") && !elem.has_child("deny");
    let privileges = elem
        .find_all("privilege")
        .filter_map(Element::first_child_name)
        .map(str::to_string)
        .collect::<BTreeSet<_>>();

    DavAce {
        principal: principal(elem),
        grant,
        privileges,
        inherited: elem.has_child("inherited"),
        protected: elem.has_child("protected"),
    }
}

/// <!ELEMENT principal (href | all | authenticated | unauthenticated
///                      | property | self)>
fn principal(ace: &Element) -> String {
    let principal = match ace.child("principal") {
        Some(p) => p,
        None => return UNKNOWN_PRINCIPAL.to_string(),
    };

    if let Some(href) = principal.child("href").map(Element::text) {
        if !href.is_empty() {
            return href;
        }
    }

    WELL_KNOWN_PRINCIPALS
        .iter()
        .find(|(marker, _)| principal.has_child(marker))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| UNKNOWN_PRINCIPAL.to_string())
}

/// Privileges the authenticated user has on the resource (RFC3744 5.4).
pub fn parse_current_user_privilege_set(src: &str) -> Vec<String> {
    try_parse_current_user_privilege_set(src).unwrap_or_else(|err| {
        tracing::debug!(err=%err, "unusable current-user-privilege-set, assuming no privilege");
        vec![]
    })
}

pub fn try_parse_current_user_privilege_set(src: &str) -> Result<Vec<String>, ParsingError> {
    let doc = Element::parse(src)?;
    let set = doc
        .find_first("current-user-privilege-set")
        .ok_or(ParsingError::TagNotFound("current-user-privilege-set"))?;

    Ok(set
        .elements()
        .filter(|e| e.name == "privilege")
        .filter_map(Element::first_child_name)
        .map(str::to_string)
        .collect())
}
