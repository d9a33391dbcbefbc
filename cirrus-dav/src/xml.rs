use quick_xml::events::Event;
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;

use super::error::ParsingError;
use super::tree::MAX_DEPTH;

// Deserialization traits
pub trait QRead<T> {
    fn qread(xml: &mut Reader<'_>) -> Result<T, ParsingError>;
}

// The representation of an XML node in Rust
pub trait Node<T>: QRead<T> + std::fmt::Debug + PartialEq + Clone {}
impl<T: QRead<T> + std::fmt::Debug + PartialEq + Clone> Node<T> for T {}

// ---------------

/// Transform an XML stream of characters into a Rust object
///
/// Servers are not consistent in the way they bind the `DAV:` namespace:
/// some use a prefix, some the default namespace, some forget it entirely.
/// Tags are thus matched on their local name only.
pub struct Reader<'a> {
    pub rdr: NsReader<&'a [u8]>,
    cur: Event<'static>,
    parents: Vec<Event<'static>>,
}
impl<'a> Reader<'a> {
    pub fn new(mut rdr: NsReader<&'a [u8]>) -> Result<Self, ParsingError> {
        let cur = rdr.read_event()?.into_owned();
        let parents = vec![];
        Ok(Self {
            cur,
            parents,
            rdr,
        })
    }

    pub fn from_str(src: &'a str) -> Result<Self, ParsingError> {
        Self::new(NsReader::from_str(src))
    }

    /// read one more tag
    /// do not expose it publicly
    fn next(&mut self) -> Result<Event<'static>, ParsingError> {
        let evt = self.rdr.read_event()?.into_owned();
        Ok(std::mem::replace(&mut self.cur, evt))
    }

    /// skip a node at current level
    pub fn skip(&mut self) -> Result<Event<'static>, ParsingError> {
        match &self.cur {
            Event::Start(b) => {
                let _span = self.rdr.read_to_end(b.to_end().name())?;
                self.next()
            }
            Event::End(_) => Err(ParsingError::WrongToken),
            Event::Eof => Err(ParsingError::Eof),
            _ => self.next(),
        }
    }

    fn current_name(&self) -> Option<QName<'_>> {
        match self.peek() {
            Event::Start(bs) | Event::Empty(bs) => Some(bs.name()),
            Event::End(be) => Some(be.name()),
            _ => None,
        }
    }

    /// check if this is the desired tag
    fn is_tag(&self, key: &str) -> bool {
        match self.current_name() {
            Some(qname) => qname.local_name().into_inner() == key.as_bytes(),
            None => false,
        }
    }

    /// local name of the tag under the cursor, if any
    pub fn peek_local_name(&self) -> Option<String> {
        self.current_name()
            .map(|qname| String::from_utf8_lossy(qname.local_name().into_inner()).into_owned())
    }

    /// namespace bound to the tag under the cursor, if any
    pub fn peek_namespace(&self) -> Option<String> {
        let qname = self.current_name()?;
        match self.rdr.resolve_element(qname) {
            (ResolveResult::Bound(ns), _) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            _ => None,
        }
    }

    pub fn parent_has_child(&self) -> bool {
        matches!(self.parents.last(), Some(Event::Start(_)) | None)
    }

    fn ensure_parent_has_child(&self) -> Result<(), ParsingError> {
        match self.parent_has_child() {
            true => Ok(()),
            false => Err(ParsingError::Recoverable),
        }
    }

    pub fn peek(&self) -> &Event<'static> {
        &self.cur
    }

    /// Concatenated text until the next tag, trimmed
    pub fn tag_string(&mut self) -> Result<String, ParsingError> {
        self.ensure_parent_has_child()?;

        let mut acc = String::new();
        loop {
            match self.peek() {
                Event::CData(unescaped) => {
                    acc.push_str(std::str::from_utf8(unescaped.as_ref())?);
                    self.next()?
                }
                Event::Text(escaped) => {
                    acc.push_str(escaped.unescape()?.as_ref());
                    self.next()?
                }
                Event::End(_) | Event::Start(_) | Event::Empty(_) => {
                    return Ok(acc.trim().to_string())
                }
                Event::Eof => return Err(ParsingError::Eof),
                _ => self.next()?,
            };
        }
    }

    pub fn maybe_read<N: Node<N>>(
        &mut self,
        t: &mut Option<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self) {
            Ok(v) => {
                *t = Some(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn maybe_push<N: Node<N>>(
        &mut self,
        t: &mut Vec<N>,
        dirty: &mut bool,
    ) -> Result<(), ParsingError> {
        if !self.parent_has_child() {
            return Ok(());
        }

        match N::qread(self) {
            Ok(v) => {
                t.push(v);
                *dirty = true;
                Ok(())
            }
            Err(ParsingError::Recoverable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn find<N: Node<N>>(&mut self) -> Result<N, ParsingError> {
        self.ensure_parent_has_child()?;

        loop {
            // Try parse
            match N::qread(self) {
                Err(ParsingError::Recoverable) => (),
                otherwise => return otherwise,
            }

            // If recovered, skip the element
            self.skip()?;
        }
    }

    pub fn collect<N: Node<N>>(&mut self) -> Result<Vec<N>, ParsingError> {
        let mut acc = Vec::new();
        if !self.parent_has_child() {
            return Ok(acc);
        }

        loop {
            match N::qread(self) {
                Err(ParsingError::Recoverable) => match self.peek() {
                    Event::End(_) => return Ok(acc),
                    _ => {
                        self.skip()?;
                    }
                },
                Ok(v) => acc.push(v),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn open(&mut self, key: &str) -> Result<Event<'static>, ParsingError> {
        let evt = match self.peek() {
            Event::Empty(_) | Event::Start(_)
                if self.is_tag(key) && self.parents.len() >= MAX_DEPTH =>
            {
                return Err(ParsingError::TooDeep(MAX_DEPTH))
            }
            // an empty tag is virtually opened without moving the cursor,
            // `close` will then consume it
            Event::Empty(_) if self.is_tag(key) => self.cur.clone(),
            Event::Start(_) if self.is_tag(key) => self.next()?,
            _ => return Err(ParsingError::Recoverable),
        };

        self.parents.push(evt.clone());
        Ok(evt)
    }

    /// Open whatever tag is under the cursor, returning its local name
    /// and its resolved namespace
    pub fn open_any(&mut self) -> Result<(String, Option<String>), ParsingError> {
        let (name, namespace) = match (self.peek_local_name(), self.peek()) {
            (Some(name), Event::Start(_) | Event::Empty(_)) => (name, self.peek_namespace()),
            _ => return Err(ParsingError::Recoverable),
        };
        self.open(&name)?;
        Ok((name, namespace))
    }

    // find stop tag
    pub fn close(&mut self) -> Result<Event<'static>, ParsingError> {
        // Handle the empty case
        if !self.parent_has_child() {
            self.parents.pop();
            return self.next();
        }

        // Handle the start/end case
        loop {
            match self.peek() {
                Event::End(_) => {
                    self.parents.pop();
                    return self.next();
                }
                _ => self.skip()?,
            };
        }
    }
}
