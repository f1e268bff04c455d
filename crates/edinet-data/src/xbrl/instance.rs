//! Streaming reader for XBRL instance documents.
//!
//! One pass over the XML collects the namespace declarations of the root
//! element, every `xbrli:context` declaration and every element (at any
//! depth) in a selected namespace.

use super::context::{ContextMap, RawContext, resolve_contexts};
use super::facts::{RawFact, extract_facts};
use super::filename::FilenameMetadata;
use super::namespace::{TargetNamespace, candidate_prefixes, select_namespaces};
use super::table::FactTable;
use crate::error::{DataError, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, PrefixDeclaration, ResolveResult};
use tracing::debug;

/// XBRL instance namespace
pub const XBRLI_NS: &str = "http://www.xbrl.org/2003/instance";

/// Everything collected from one pass over an instance.
#[derive(Debug, Clone, Default)]
pub struct InstanceScan {
    /// `(prefix, uri)` declarations on the root element
    pub declared: Vec<(String, String)>,
    /// Candidate namespaces that are declared
    pub targets: Vec<TargetNamespace>,
    /// Context declarations in document order
    pub contexts: Vec<RawContext>,
    /// Elements of the target namespaces, grouped by target, in document
    /// order within a target
    pub facts: Vec<RawFact>,
}

/// A fully parsed instance.
#[derive(Debug, Clone)]
pub struct XbrlInstance {
    /// Metadata decoded from the instance filename
    pub filename: FilenameMetadata,
    /// Namespaces facts were read from
    pub targets: Vec<TargetNamespace>,
    /// Resolved contexts
    pub contexts: ContextMap,
    /// Extracted facts
    pub facts: FactTable,
}

/// Parse an instance given its filename and XML content.
///
/// # Errors
/// Fails on a malformed filename, malformed XML, an invalid context or a
/// fact whose context cannot be resolved.
pub fn parse_instance(file_name: &str, xml: &[u8]) -> Result<XbrlInstance> {
    let filename = FilenameMetadata::parse(file_name)?;
    let candidates = candidate_prefixes(&filename);
    let scan = scan_instance(xml, &candidates)?;
    debug!(
        "XBRL filename: {file_name}, namespaces: {:?}",
        scan.targets.iter().map(|t| t.prefix.as_str()).collect::<Vec<_>>()
    );
    let contexts = resolve_contexts(scan.contexts)?;
    let facts = extract_facts(scan.facts, &contexts)?;
    Ok(XbrlInstance {
        filename,
        targets: scan.targets,
        contexts,
        facts,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeriodField {
    Instant,
    Start,
    End,
}

impl PeriodField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"instant" => Some(Self::Instant),
            b"startDate" => Some(Self::Start),
            b"endDate" => Some(Self::End),
            _ => None,
        }
    }

    fn assign(self, context: &mut RawContext, value: String) {
        let slot = match self {
            Self::Instant => &mut context.instant,
            Self::Start => &mut context.start_date,
            Self::End => &mut context.end_date,
        };
        *slot = Some(value);
    }
}

/// Open element on the reader stack.
#[derive(Debug)]
enum Frame {
    Fact {
        target: usize,
        fact: RawFact,
        /// Still reading text that precedes the first child element
        leading: bool,
    },
    Context(RawContext),
    PeriodDate {
        field: PeriodField,
        text: String,
    },
    Other,
}

/// What a start tag opens.
enum Opened {
    Root,
    Frame(Frame),
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| DataError::XmlParse(e.to_string()))
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

struct Scanner<'c> {
    candidates: &'c [String],
    scan: InstanceScan,
    grouped: Vec<Vec<RawFact>>,
    stack: Vec<Frame>,
    root_seen: bool,
}

impl<'c> Scanner<'c> {
    fn new(candidates: &'c [String]) -> Self {
        Self {
            candidates,
            scan: InstanceScan::default(),
            grouped: Vec::new(),
            stack: Vec::new(),
            root_seen: false,
        }
    }

    fn open(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<Opened> {
        if !self.root_seen {
            self.root_seen = true;
            for attr in e.attributes() {
                let attr = attr?;
                if let Some(PrefixDeclaration::Named(prefix)) = attr.key.as_namespace_binding() {
                    let prefix = utf8(prefix)?;
                    let uri = attr.unescape_value()?.into_owned();
                    self.scan.declared.push((prefix, uri));
                }
            }
            self.scan.targets = select_namespaces(self.candidates, &self.scan.declared);
            self.grouped = vec![Vec::new(); self.scan.targets.len()];
            return Ok(Opened::Root);
        }

        if let Some(Frame::Fact { leading, .. }) = self.stack.last_mut() {
            *leading = false;
        }

        let (ns, local) = reader.resolve_element(e.name());
        let ResolveResult::Bound(Namespace(uri)) = ns else {
            return Ok(Opened::Frame(Frame::Other));
        };
        let local: &[u8] = local.as_ref();

        if uri == XBRLI_NS.as_bytes() {
            if local == b"context" {
                let id = attribute(e, "id")?.unwrap_or_default();
                return Ok(Opened::Frame(Frame::Context(RawContext {
                    id,
                    ..Default::default()
                })));
            }
            if let Some(field) = PeriodField::from_local_name(local)
                && self.stack.iter().any(|f| matches!(f, Frame::Context(_)))
            {
                return Ok(Opened::Frame(Frame::PeriodDate {
                    field,
                    text: String::new(),
                }));
            }
        }

        if let Some(target) = self
            .scan
            .targets
            .iter()
            .position(|t| t.uri.as_bytes() == uri)
        {
            let fact = RawFact {
                namespace_prefix: self.scan.targets[target].prefix.clone(),
                tag: utf8(local)?,
                context_ref: attribute(e, "contextRef")?,
                text: None,
                unit: attribute(e, "unitRef")?,
            };
            return Ok(Opened::Frame(Frame::Fact {
                target,
                fact,
                leading: true,
            }));
        }

        Ok(Opened::Frame(Frame::Other))
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Fact {
                fact, leading: true, ..
            }) => fact.text.get_or_insert_with(String::new).push_str(text),
            Some(Frame::PeriodDate { text: buf, .. }) => buf.push_str(text),
            _ => {}
        }
    }

    fn close(&mut self, frame: Frame) {
        match frame {
            Frame::Fact { target, fact, .. } => self.grouped[target].push(fact),
            Frame::Context(context) => self.scan.contexts.push(context),
            Frame::PeriodDate { field, text } => {
                if let Some(Frame::Context(context)) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|f| matches!(f, Frame::Context(_)))
                {
                    field.assign(context, text);
                }
            }
            Frame::Other => {}
        }
    }

    fn finish(mut self) -> InstanceScan {
        self.scan.facts = self.grouped.into_iter().flatten().collect();
        self.scan
    }
}

/// Read an instance, collecting contexts and the elements of the declared
/// candidate namespaces.
pub fn scan_instance(xml: &[u8], candidates: &[String]) -> Result<InstanceScan> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut scanner = Scanner::new(candidates);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if let Opened::Frame(frame) = scanner.open(&reader, &e)? {
                    scanner.stack.push(frame);
                }
            }
            Event::Empty(e) => {
                if let Opened::Frame(frame) = scanner.open(&reader, &e)? {
                    scanner.close(frame);
                }
            }
            Event::End(_) => {
                if let Some(frame) = scanner.stack.pop() {
                    scanner.close(frame);
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                scanner.text(&text);
            }
            Event::CData(c) => {
                let text = utf8(&c)?;
                scanner.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !scanner.root_seen {
        return Err(DataError::XmlParse("document has no root element".to_string()));
    }
    Ok(scanner.finish())
}
