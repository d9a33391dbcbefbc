//! Owned XML tree and namespace agnostic lookups.
//!
//! The fragments returned by servers for ACL, locks or reports are often
//! partial and use whatever prefix the server likes. Instead of decoding
//! them strictly, they are loaded in a small tree that is searched by
//! local name.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::error::ParsingError;

/// Deepest element nesting accepted in a document
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Element {
    /// Local name, without prefix
    pub name: String,
    pub namespace: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a document.
    ///
    /// The returned element is a nameless document node holding the root
    /// element, so the root is itself reachable by the lookups below.
    pub fn parse(src: &str) -> Result<Element, ParsingError> {
        let mut rdr = NsReader::from_str(src);
        let mut stack = vec![Element::default()];

        loop {
            let (ns, evt) = rdr.read_resolved_event()?;
            match evt {
                Event::Start(bs) => {
                    too_deep(&stack)?;
                    let mut elem = Element::new(String::from_utf8_lossy(
                        bs.local_name().into_inner(),
                    ));
                    elem.namespace = bound(&ns);
                    stack.push(elem);
                }
                Event::Empty(bs) => {
                    too_deep(&stack)?;
                    let mut elem = Element::new(String::from_utf8_lossy(
                        bs.local_name().into_inner(),
                    ));
                    elem.namespace = bound(&ns);
                    parent(&mut stack)?.children.push(Node::Element(elem));
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(ParsingError::WrongToken);
                    }
                    let elem = stack.pop().ok_or(ParsingError::WrongToken)?;
                    parent(&mut stack)?.children.push(Node::Element(elem));
                }
                Event::Text(escaped) => {
                    let txt = escaped.unescape()?.into_owned();
                    parent(&mut stack)?.children.push(Node::Text(txt));
                }
                Event::CData(cdata) => {
                    let txt = std::str::from_utf8(cdata.as_ref())?.to_string();
                    parent(&mut stack)?.children.push(Node::Text(txt));
                }
                Event::Eof => break,
                _ => (),
            }
        }

        // Unclosed tags
        if stack.len() != 1 {
            return Err(ParsingError::Eof);
        }
        let doc = stack.pop().ok_or(ParsingError::Eof)?;
        if doc.elements().next().is_none() {
            return Err(ParsingError::TagNotFound("root element"));
        }
        Ok(doc)
    }

    /// Direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child with this local name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Local name of the first child element, eg. `read` in
    /// `<privilege><read/></privilege>`
    pub fn first_child_name(&self) -> Option<&str> {
        self.elements().next().map(|e| e.name.as_str())
    }

    /// All descendants in document order, lazily
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    pub fn find_first(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.name == name)
    }

    /// Trimmed text content of the first descendant with this name
    pub fn find_text(&self, name: &str) -> Option<String> {
        self.find_first(name).map(Element::text)
    }

    /// Concatenation of all the text below this element, trimmed
    pub fn text(&self) -> String {
        let mut acc = String::new();
        let mut stack = vec![self.children.iter()];
        while let Some(top) = stack.last_mut() {
            match top.next() {
                Some(Node::Text(t)) => acc.push_str(t),
                Some(Node::Element(e)) => stack.push(e.children.iter()),
                None => {
                    stack.pop();
                }
            }
        }
        acc.trim().to_string()
    }
}

pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Node::Element(e)) => {
                    self.stack.push(e.children.iter());
                    return Some(e);
                }
                Some(Node::Text(_)) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

fn bound(ns: &ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

// the document node sits at the bottom of the stack
fn too_deep(stack: &[Element]) -> Result<(), ParsingError> {
    match stack.len() > MAX_DEPTH {
        true => Err(ParsingError::TooDeep(MAX_DEPTH)),
        false => Ok(()),
    }
}

fn parent(stack: &mut [Element]) -> Result<&mut Element, ParsingError> {
    stack.last_mut().ok_or(ParsingError::WrongToken)
}
