use quick_xml::events::Event;

use super::error::{DavError, ParsingError};
use super::tree::Element;
use super::types::*;
use super::xml::{QRead, Reader};

// ---- ROOT ----

/// Decode a PROPFIND answer into the resources it lists.
///
/// The envelope must be valid, otherwise the whole call fails. Inside a
/// valid envelope, a response that can't be turned into a resource
/// (no href, invalid href) is dropped and the others are kept in order.
pub fn parse_resources(src: &str) -> Result<Vec<DavResource>, DavError> {
    let multistatus = decode_multistatus(src).map_err(DavError::XmlParsing)?;

    let resources = multistatus
        .responses
        .iter()
        .filter_map(|response| match resource(response) {
            Ok(res) => Some(res),
            Err(err) => {
                tracing::warn!(err=%err, href=?response.href(), "dropping unusable response");
                None
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        responses = multistatus.responses.len(),
        resources = resources.len(),
        "decoded multistatus"
    );
    Ok(resources)
}

pub fn decode_multistatus(src: &str) -> Result<Multistatus, ParsingError> {
    let mut rdr = Reader::from_str(src)?;
    rdr.find::<Multistatus>()
}

fn resource(response: &Response) -> Result<DavResource, ParsingError> {
    let href = response.href().ok_or(ParsingError::MissingChild)?;
    DavResource::from_properties(&href.0, response.ok_properties())
}

/// Lock discovery, best effort: an unusable fragment means no lock.
pub fn parse_lockdiscovery(src: &str) -> Vec<Activelock> {
    try_parse_lockdiscovery(src).unwrap_or_else(|err| {
        tracing::debug!(err=%err, "unusable lockdiscovery, assuming no active lock");
        vec![]
    })
}

pub fn try_parse_lockdiscovery(src: &str) -> Result<Vec<Activelock>, ParsingError> {
    let doc = Element::parse(src)?;
    let discovery = doc
        .find_first("lockdiscovery")
        .ok_or(ParsingError::TagNotFound("lockdiscovery"))?;

    Ok(discovery
        .elements()
        .filter(|e| e.name == "activelock")
        .map(activelock)
        .collect())
}

fn activelock(elem: &Element) -> Activelock {
    let non_empty = |v: String| if v.is_empty() { None } else { Some(v) };

    let lockscope = match elem.find_first("lockscope") {
        Some(scope) if scope.has_child("shared") => LockScope::Shared,
        _ => LockScope::Exclusive,
    };
    let depth = elem
        .find_text("depth")
        .and_then(non_empty)
        .unwrap_or_else(|| "0".to_string());
    // 14.17. owner may be a bare text or an href
    let owner = elem.child("owner").and_then(|owner| match owner.child("href") {
        Some(href) => non_empty(href.text()),
        None => non_empty(owner.text()),
    });
    let timeout = elem.find_text("timeout").and_then(non_empty);
    let locktoken = elem
        .find_first("locktoken")
        .and_then(|token| token.find_text("href"))
        .and_then(non_empty);

    Activelock {
        lockscope,
        locktype: LockType::Write,
        depth,
        owner,
        timeout,
        locktoken,
    }
}

// ---- INNER XML ----

impl QRead<Multistatus> for Multistatus {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("multistatus")?;
        let mut responses = Vec::new();
        let mut responsedescription = None;

        loop {
            let mut dirty = false;
            xml.maybe_push(&mut responses, &mut dirty)?;
            xml.maybe_read(&mut responsedescription, &mut dirty)?;
            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip()?,
                };
            }
        }

        xml.close()?;
        Ok(Multistatus {
            responses,
            responsedescription,
        })
    }
}

impl QRead<Response> for Response {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("response")?;
        let (mut status, mut responsedescription) = (None, None);
        let mut href = Vec::new();
        let mut propstat = Vec::new();

        loop {
            let mut dirty = false;
            xml.maybe_read::<Status>(&mut status, &mut dirty)?;
            xml.maybe_push::<Href>(&mut href, &mut dirty)?;
            xml.maybe_push::<PropStat>(&mut propstat, &mut dirty)?;
            xml.maybe_read::<ResponseDescription>(&mut responsedescription, &mut dirty)?;

            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip()?,
                };
            }
        }

        xml.close()?;
        Ok(Response {
            href,
            status,
            propstat,
            responsedescription,
        })
    }
}

impl QRead<PropStat> for PropStat {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("propstat")?;

        let (mut m_prop, mut status, mut responsedescription) = (None, None, None);

        loop {
            let mut dirty = false;
            xml.maybe_read::<Prop>(&mut m_prop, &mut dirty)?;
            xml.maybe_read::<Status>(&mut status, &mut dirty)?;
            xml.maybe_read::<ResponseDescription>(&mut responsedescription, &mut dirty)?;

            if !dirty {
                match xml.peek() {
                    Event::End(_) => break,
                    _ => xml.skip()?,
                };
            }
        }

        xml.close()?;
        Ok(PropStat {
            prop: m_prop.map(|Prop(p)| p).unwrap_or_default(),
            status,
            responsedescription,
        })
    }
}

/// The `prop` container of a propstat
#[derive(Debug, PartialEq, Clone)]
struct Prop(Vec<Property>);

impl QRead<Prop> for Prop {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("prop")?;
        let acc = xml.collect::<Property>()?;
        xml.close()?;
        Ok(Prop(acc))
    }
}

impl QRead<Property> for Property {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        let (name, namespace) = xml.open_any()?;

        let mut text = Vec::new();
        let mut children = Vec::new();
        if xml.parent_has_child() {
            loop {
                match xml.peek() {
                    Event::End(_) => break,
                    Event::Eof => return Err(ParsingError::Eof),
                    Event::Text(_) | Event::CData(_) => push_text(&mut text, xml.tag_string()?),
                    Event::Start(_) | Event::Empty(_) => {
                        let (child, _) = xml.open_any()?;
                        children.push(child);
                        text_below(xml, &mut text)?;
                        xml.close()?;
                    }
                    _ => {
                        xml.skip()?;
                    }
                }
            }
        }
        xml.close()?;

        // <resourcetype><collection/></resourcetype> has no text but is
        // still meaningful, its children names are kept instead.
        let value = match (text.is_empty(), children.is_empty()) {
            (true, true) => None,
            (true, false) => Some(children.join(" ")),
            (false, _) => Some(text.join(" ")),
        };

        Ok(Property {
            name,
            namespace,
            value,
        })
    }
}

fn push_text(acc: &mut Vec<String>, txt: String) {
    if !txt.is_empty() {
        acc.push(txt)
    }
}

/// Collect all the text nodes below the opened tag
fn text_below(xml: &mut Reader<'_>, acc: &mut Vec<String>) -> Result<(), ParsingError> {
    if !xml.parent_has_child() {
        return Ok(());
    }

    loop {
        match xml.peek() {
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ParsingError::Eof),
            Event::Text(_) | Event::CData(_) => push_text(acc, xml.tag_string()?),
            Event::Start(_) | Event::Empty(_) => {
                xml.open_any()?;
                text_below(xml, acc)?;
                xml.close()?;
            }
            _ => {
                xml.skip()?;
            }
        }
    }
}

impl QRead<Href> for Href {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("href")?;
        let mut url = String::new();
        if xml.parent_has_child() {
            url = xml.tag_string()?;
        }
        xml.close()?;
        Ok(Href(url))
    }
}

impl QRead<Status> for Status {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("status")?;
        let mut line = String::new();
        if xml.parent_has_child() {
            line = xml.tag_string()?;
        }
        xml.close()?;
        Ok(Status(line))
    }
}

impl QRead<ResponseDescription> for ResponseDescription {
    fn qread(xml: &mut Reader<'_>) -> Result<Self, ParsingError> {
        xml.open("responsedescription")?;
        let mut cnt = String::new();
        if xml.parent_has_child() {
            cnt = xml.tag_string()?;
        }
        xml.close()?;
        Ok(ResponseDescription(cnt))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn rfc_multistatus_value() {
        let src = r#"<?xml version="1.0" encoding="utf-8" ?>
     <D:multistatus xmlns:D="DAV:">
       <D:response>
         <D:href>/container/</D:href>
         <D:propstat>
           <D:prop xmlns:R="http://ns.example.com/boxschema/">
             <R:bigbox><R:BoxType>Box type A</R:BoxType></R:bigbox>
             <R:author><R:Name>Hadrian</R:Name></R:author>
             <D:creationdate>1997-12-01T17:42:21-08:00</D:creationdate>
             <D:displayname>Example collection</D:displayname>
             <D:resourcetype><D:collection/></D:resourcetype>
             <D:supportedlock>
               <D:lockentry>
                 <D:lockscope><D:exclusive/></D:lockscope>
                 <D:locktype><D:write/></D:locktype>
               </D:lockentry>
             </D:supportedlock>
           </D:prop>
           <D:status>HTTP/1.1 200 OK</D:status>
         </D:propstat>
       </D:response>
       <D:response>
         <D:href>/container/front.html</D:href>
         <D:propstat>
           <D:prop xmlns:R="http://ns.example.com/boxschema/">
             <R:bigbox><R:BoxType>Box type B</R:BoxType>
             </R:bigbox>
             <D:creationdate>1997-12-01T18:27:21-08:00</D:creationdate>
             <D:displayname>Example HTML resource</D:displayname>
             <D:getcontentlength>4525</D:getcontentlength>
             <D:getcontenttype>text/html</D:getcontenttype>
             <D:getetag>"zzyzx"</D:getetag>
             <D:getlastmodified
               >Mon, 12 Jan 1998 09:25:56 GMT</D:getlastmodified>
             <D:resourcetype/>
           </D:prop>
           <D:status>HTTP/1.1 200 OK</D:status>
         </D:propstat>
       </D:response>
     </D:multistatus>"#;

        let got = parse_resources(src).unwrap();
        assert_eq!(got.len(), 2);

        let dir = &got[0];
        assert_eq!(dir.href, "/container/");
        assert!(dir.is_directory());
        assert_eq!(dir.display_name.as_deref(), Some("Example collection"));
        assert_eq!(dir.custom_property("bigbox"), Some("Box type A"));
        assert_eq!(dir.custom_property("author"), Some("Hadrian"));
        assert_eq!(dir.custom_property("supportedlock"), Some("lockentry"));

        let file = &got[1];
        assert_eq!(file.href, "/container/front.html");
        assert!(!file.is_directory());
        assert_eq!(file.content_length, 4525);
        assert_eq!(file.content_type, "text/html");
        assert_eq!(file.etag.as_deref(), Some("\"zzyzx\""));
        assert!(file.modified.is_some());
        assert!(file.creation.is_some());
        // present but empty is not the same as absent
        assert_eq!(file.custom_property("resourcetype"), Some(""));
        assert_eq!(dir.custom_property("getcontentlength"), None);
    }

    #[test]
    fn default_namespace_and_failed_propstat() {
        let src = r#"<multistatus xmlns="DAV:">
  <response>
    <href>/file.txt</href>
    <propstat>
      <prop><getcontentlength>12</getcontentlength></prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
    <propstat>
      <prop><getetag/><displayname/></prop>
      <status>HTTP/1.1 404 Not Found</status>
    </propstat>
  </response>
</multistatus>"#;

        let got = parse_resources(src).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].content_length, 12);
        assert_eq!(got[0].etag, None);
        assert_eq!(
            got[0].custom_properties,
            BTreeMap::from([("getcontentlength".to_string(), "12".to_string())])
        );
    }

    #[test]
    fn response_without_href_is_dropped() {
        let src = r#"<D:multistatus xmlns:D="DAV:">
  <D:response><D:href>/a</D:href><D:propstat><D:prop/><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>
  <D:response><D:propstat><D:prop><D:displayname>lost</D:displayname></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>
  <D:response><D:href>/b c</D:href><D:status>HTTP/1.1 200 OK</D:status></D:response>
  <D:response><D:href>/c</D:href><D:status>HTTP/1.1 404 Not Found</D:status></D:response>
</D:multistatus>"#;

        let got = parse_resources(src)
            .unwrap()
            .into_iter()
            .map(|r| r.href.to_string())
            .collect::<Vec<_>>();
        assert_eq!(got, vec!["/a".to_string(), "/c".to_string()]);
    }

    #[test]
    fn resource_with_no_usable_property() {
        let src = r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/x</D:href></D:response></D:multistatus>"#;
        let got = parse_resources(src).unwrap();
        assert_eq!(got, vec![DavResource::new(http::Uri::from_static("/x"))]);
    }

    #[test]
    fn broken_envelope_is_an_error() {
        for src in [
            "",
            "definitely not xml",
            r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href>"#,
            r#"<D:error xmlns:D="DAV:"/>"#,
        ] {
            assert!(
                matches!(parse_resources(src), Err(DavError::XmlParsing(_))),
                "{src:?} should not decode"
            );
        }
    }

    #[test]
    fn multistatus_model() {
        let src = r#"<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/a</D:href>
    <D:propstat>
      <D:prop><D:displayname>A</D:displayname><D:getetag/></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:responsedescription>done</D:responsedescription>
</D:multistatus>"#;

        assert_eq!(
            decode_multistatus(src).unwrap(),
            Multistatus {
                responses: vec![Response {
                    href: vec![Href("/a".into())],
                    status: None,
                    propstat: vec![PropStat {
                        prop: vec![
                            Property {
                                name: "displayname".into(),
                                namespace: Some("DAV:".into()),
                                value: Some("A".into()),
                            },
                            Property {
                                name: "getetag".into(),
                                namespace: Some("DAV:".into()),
                                value: None,
                            },
                        ],
                        status: Some(Status("HTTP/1.1 200 OK".into())),
                        responsedescription: None,
                    }],
                    responsedescription: None,
                }],
                responsedescription: Some(ResponseDescription("done".into())),
            }
        );
    }

    #[test]
    fn rfc_lockdiscovery() {
        let src = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:prop xmlns:D="DAV:">
  <D:lockdiscovery>
    <D:activelock>
      <D:locktype><D:write/></D:locktype>
      <D:lockscope><D:exclusive/></D:lockscope>
      <D:depth>infinity</D:depth>
      <D:owner>
        <D:href>http://example.org/~ejw/contact.html</D:href>
      </D:owner>
      <D:timeout>Second-604800</D:timeout>
      <D:locktoken>
        <D:href>urn:uuid:e71d4fae-5dec-22d6-fea5-00a0c91e6be4</D:href>
      </D:locktoken>
      <D:lockroot>
        <D:href>http://example.com/workspace/webdav/proposal.doc</D:href>
      </D:lockroot>
    </D:activelock>
    <D:activelock>
      <D:lockscope><D:shared/></D:lockscope>
      <D:owner>Jane</D:owner>
    </D:activelock>
  </D:lockdiscovery>
</D:prop>"#;

        assert_eq!(
            parse_lockdiscovery(src),
            vec![
                Activelock {
                    lockscope: LockScope::Exclusive,
                    locktype: LockType::Write,
                    depth: "infinity".into(),
                    owner: Some("http://example.org/~ejw/contact.html".into()),
                    timeout: Some("Second-604800".into()),
                    locktoken: Some("urn:uuid:e71d4fae-5dec-22d6-fea5-00a0c91e6be4".into()),
                },
                Activelock {
                    lockscope: LockScope::Shared,
                    owner: Some("Jane".into()),
                    ..Activelock::default()
                },
            ]
        );
    }

    #[test]
    fn lockdiscovery_fails_soft() {
        assert!(parse_lockdiscovery("<D:lockdiscovery xmlns:D=\"DAV:\"><D:activelock>").is_empty());
        assert!(parse_lockdiscovery("no xml here").is_empty());
        assert!(parse_lockdiscovery("<D:prop xmlns:D=\"DAV:\"/>").is_empty());
        assert!(parse_lockdiscovery("<lockdiscovery/>").is_empty());
        assert!(matches!(
            try_parse_lockdiscovery("<D:prop xmlns:D=\"DAV:\"/>"),
            Err(ParsingError::TagNotFound("lockdiscovery"))
        ));
    }

    #[test]
    fn deeply_nested_property_is_rejected() {
        let depth = 10_000;
        let src = format!(
            r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href><D:propstat><D:prop><D:x>{}deep{}</D:x></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response></D:multistatus>"#,
            "<D:y>".repeat(depth),
            "</D:y>".repeat(depth),
        );

        assert!(matches!(
            parse_resources(&src),
            Err(DavError::XmlParsing(ParsingError::TooDeep(_)))
        ));
        assert!(parse_lockdiscovery(&src).is_empty());
    }

    #[test]
    fn nested_property_below_the_limit() {
        let src = format!(
            r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href><D:propstat><D:prop><D:x>{}deep{}</D:x></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response></D:multistatus>"#,
            "<D:y>".repeat(100),
            "</D:y>".repeat(100),
        );

        let resources = parse_resources(&src).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].custom_property("x"), Some("deep"));
    }
}
