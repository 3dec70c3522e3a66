//! The [`Render`] builder.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use super::segment::Segment;
use crate::chain::{chain, AsDynError};
use crate::code::{global, CodeRegistry};

/// Renders any error chain under a combination of flags.
///
/// ```
/// use faultline::{wrap, Error, Render};
///
/// let err = wrap(Some(Error::new("disk full")), "save failed").unwrap();
/// assert_eq!(Render::new(&err).to_string(), "save failed: disk full");
/// assert!(Render::new(&err).detail(true).to_string().contains(" - #2 "));
/// ```
#[derive(Clone, Copy)]
pub struct Render<'a> {
    err: &'a (dyn StdError + 'static),
    registry: &'a CodeRegistry,
    detail: bool,
    trace: bool,
    json: bool,
}

impl<'a> Render<'a> {
    /// Plain rendering through the process-wide registry.
    pub fn new<E>(err: &'a E) -> Self
    where
        E: AsDynError + ?Sized,
    {
        Self {
            err: err.as_dyn_error(),
            registry: global(),
            detail: false,
            trace: false,
            json: false,
        }
    }

    /// Resolves codes through `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: &'a CodeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Adds code, caller and external message to each segment.
    pub fn detail(mut self, detail: bool) -> Self {
        self.detail = detail;
        self
    }

    /// Renders every node of the chain instead of the outermost one.
    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Emits a JSON array instead of text.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Every node of the chain, outermost first, regardless of flags.
    pub fn segments(&self) -> Vec<Segment> {
        let nodes: Vec<_> = chain(self.err).collect();
        let len = nodes.len();
        nodes
            .into_iter()
            .enumerate()
            .map(|(position, node)| Segment::of(node, len - position - 1, self.registry))
            .collect()
    }

    fn verbose(&self) -> bool {
        self.detail || self.trace
    }

    fn visible(&self) -> Vec<Segment> {
        let mut segments = self.segments();
        if !self.trace {
            segments.truncate(1);
        }
        segments
    }

    fn write_plain(&self, out: &mut String) {
        let verbose = self.verbose();
        for (position, segment) in self.visible().iter().enumerate() {
            if !verbose {
                out.push_str(&segment.error);
                continue;
            }
            if position > 0 {
                out.push_str("; ");
            }
            let line = match &segment.caller {
                Some(caller) => format!(
                    "{} - #{} [{}] ({}) {}",
                    segment.error, segment.index, caller, segment.code, segment.message
                ),
                None => format!("{} - #{} {}", segment.error, segment.index, segment.message),
            };
            out.push_str(&line);
        }
    }

    fn write_json(&self, out: &mut String) -> fmt::Result {
        let verbose = self.verbose();
        let segments = self.visible();
        let rows: Vec<JsonSegment<'_>> = segments
            .iter()
            .map(|segment| {
                if verbose {
                    JsonSegment {
                        message: Some(segment.message.as_str()),
                        code: Some(segment.code),
                        error: &segment.error,
                        caller: Some(segment.caller_label()),
                    }
                } else {
                    JsonSegment {
                        message: None,
                        code: None,
                        error: &segment.message,
                        caller: None,
                    }
                }
            })
            .collect();

        let encoded = serde_json::to_string(&rows).map_err(|_| fmt::Error)?;
        out.push_str(&encoded);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonSegment<'s> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'s str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
    error: &'s str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if self.json {
            self.write_json(&mut out)?;
        } else {
            self.write_plain(&mut out);
        }
        f.write_str(out.trim_matches(|c| matches!(c, '\r' | '\n' | '\t')))
    }
}

impl fmt::Debug for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Render")
            .field("err", &self.err.to_string())
            .field("detail", &self.detail)
            .field("trace", &self.trace)
            .field("json", &self.json)
            .finish()
    }
}
