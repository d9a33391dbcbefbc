use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

//RFC covered: RFC3744 (ACL core) + RFC5397 (ACL Current Principal Extension)

/// Principal of an ACE that could not be resolved
pub const UNKNOWN_PRINCIPAL: &str = "unknown";

/// 5.5.1.  ACE Principal
///
/// The well known principals, checked in this order when an ACE has no
/// `href` principal.
pub const WELL_KNOWN_PRINCIPALS: [(&str, &str); 4] = [
    ("all", "DAV:all"),
    ("authenticated", "DAV:authenticated"),
    ("unauthenticated", "DAV:unauthenticated"),
    ("self", "DAV:self"),
];

pub const ALL_PRINCIPAL: &str = "DAV:all";

/// 3.12.  Aggregation of Privileges
///
/// DAV:all contains all privileges.
pub const ALL_PRIVILEGE: &str = "all";

/// 5.5.  DAV:acl
///
/// <!ELEMENT ace ((principal | invert), (grant|deny), protected?,
///                inherited?)>
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct DavAce {
    pub principal: String,
    /// `true` for a grant entry, `false` for a deny entry
    pub grant: bool,
    pub privileges: BTreeSet<String>,
    pub inherited: bool,
    pub protected: bool,
}

impl DavAce {
    pub fn is_deny(&self) -> bool {
        !self.grant
    }

    /// This entry concerns this principal, directly or through DAV:all
    pub fn applies_to(&self, principal: &str) -> bool {
        self.principal == principal || self.principal == ALL_PRINCIPAL
    }

    /// This entry lists this privilege, directly or through the aggregate
    pub fn lists(&self, privilege: &str) -> bool {
        self.privileges.contains(privilege) || self.privileges.contains(ALL_PRIVILEGE)
    }
}

/// The DAV:acl property of a resource.
///
/// Entries are kept in the order sent by the server.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default, Serialize, Deserialize)]
pub struct DavAcl {
    pub aces: Vec<DavAce>,
    pub resource_url: Option<String>,
}

impl DavAcl {
    pub fn new(aces: Vec<DavAce>, resource_url: Option<String>) -> Self {
        Self { aces, resource_url }
    }

    pub fn is_empty(&self) -> bool {
        self.aces.is_empty()
    }

    pub fn aces_for_principal<'a>(
        &'a self,
        principal: &'a str,
    ) -> impl Iterator<Item = &'a DavAce> {
        self.aces.iter().filter(move |ace| ace.principal == principal)
    }

    pub fn granted(&self) -> impl Iterator<Item = &DavAce> {
        self.aces.iter().filter(|ace| ace.grant)
    }

    pub fn denied(&self) -> impl Iterator<Item = &DavAce> {
        self.aces.iter().filter(|ace| ace.is_deny())
    }

    pub fn inherited(&self) -> impl Iterator<Item = &DavAce> {
        self.aces.iter().filter(|ace| ace.inherited)
    }

    pub fn protected(&self) -> impl Iterator<Item = &DavAce> {
        self.aces.iter().filter(|ace| ace.protected)
    }

    /// Distinct principals, sorted
    pub fn principals(&self) -> BTreeSet<&str> {
        self.aces.iter().map(|ace| ace.principal.as_str()).collect()
    }

    /// Deny overrides grant: a single matching deny entry is enough to
    /// refuse the privilege, wherever it sits in the list.
    pub fn has_privilege(&self, principal: &str, privilege: &str) -> bool {
        let relevant = self
            .aces
            .iter()
            .filter(|ace| ace.applies_to(principal) && ace.lists(privilege))
            .collect::<Vec<_>>();

        if relevant.iter().any(|ace| ace.is_deny()) {
            return false;
        }
        relevant.iter().any(|ace| ace.grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ace(principal: &str, grant: bool, privileges: &[&str]) -> DavAce {
        DavAce {
            principal: principal.into(),
            grant,
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
            inherited: false,
            protected: false,
        }
    }

    #[test]
    fn deny_overrides_grant_in_any_order() {
        let grant = ace("/principals/bob", true, &["read", "write"]);
        let deny = ace("/principals/bob", false, &["write"]);

        for aces in [
            vec![grant.clone(), deny.clone()],
            vec![deny.clone(), grant.clone()],
            vec![grant.clone(), grant.clone(), deny.clone(), grant.clone()],
        ] {
            let acl = DavAcl::new(aces, None);
            assert!(acl.has_privilege("/principals/bob", "read"));
            assert!(!acl.has_privilege("/principals/bob", "write"));
        }
    }

    #[test]
    fn no_entry_means_no_privilege() {
        let acl = DavAcl::new(vec![ace("/principals/bob", true, &["read"])], None);
        assert!(!acl.has_privilege("/principals/alice", "read"));
        assert!(!acl.has_privilege("/principals/bob", "write"));
        assert!(!DavAcl::default().has_privilege("/principals/bob", "read"));
    }

    #[test]
    fn all_principal_and_aggregate_privilege() {
        let acl = DavAcl::new(
            vec![
                ace("DAV:all", true, &["read"]),
                ace("/principals/admin", true, &["all"]),
                ace("DAV:all", false, &["write-acl"]),
            ],
            None,
        );
        assert!(acl.has_privilege("/principals/bob", "read"));
        assert!(!acl.has_privilege("/principals/bob", "write"));
        assert!(acl.has_privilege("/principals/admin", "bind"));
        assert!(!acl.has_privilege("/principals/admin", "write-acl"));
    }

    #[test]
    fn filters() {
        let mut inherited = ace("/principals/bob", false, &["write"]);
        inherited.inherited = true;
        let mut protected = ace("DAV:authenticated", true, &["read"]);
        protected.protected = true;
        let acl = DavAcl::new(
            vec![
                ace("/principals/bob", true, &["read"]),
                inherited.clone(),
                protected.clone(),
            ],
            Some("/file".into()),
        );

        assert_eq!(acl.aces_for_principal("/principals/bob").count(), 2);
        assert_eq!(acl.granted().count(), 2);
        assert_eq!(acl.denied().collect::<Vec<_>>(), vec![&inherited]);
        assert_eq!(acl.inherited().collect::<Vec<_>>(), vec![&inherited]);
        assert_eq!(acl.protected().collect::<Vec<_>>(), vec![&protected]);
        assert_eq!(
            acl.principals().into_iter().collect::<Vec<_>>(),
            vec!["/principals/bob", "DAV:authenticated"]
        );
    }

    #[test]
    fn serde_roundtrip() {
        let mut inherited = ace("/principals/bob", false, &["write", "bind"]);
        inherited.inherited = true;
        let acl = DavAcl::new(
            vec![ace("DAV:all", true, &["read"]), inherited],
            Some("http://example.com/file".into()),
        );

        let json = serde_json::to_value(&acl).unwrap();
        assert_eq!(json["resource_url"], "http://example.com/file");
        assert_eq!(json["aces"][1]["grant"], false);

        let back: DavAcl = serde_json::from_value(json).unwrap();
        assert_eq!(back, acl);
    }
}
