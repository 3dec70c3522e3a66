//! Per-node rendering data.

use std::error::Error as StdError;

use crate::chain::{Error, ErrorNode};
use crate::code::{CodeRegistry, UNKNOWN_CODE};
use crate::trace::LocationRecord;

/// What the renderer knows about one node of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position counted from the innermost node, which is `0`.
    pub index: usize,
    /// Registered code, or the unknown code for unclassified nodes.
    pub code: i32,
    /// External message: the registered one for coded nodes, else the node text.
    pub message: String,
    /// Internal message of the node.
    pub error: String,
    /// Where the node was constructed, when it captured a trace.
    pub caller: Option<LocationRecord>,
}

impl Segment {
    pub(crate) fn of(node: &(dyn StdError + 'static), index: usize, registry: &CodeRegistry) -> Self {
        let Some(err) = node.downcast_ref::<Error>() else {
            return Self::unclassified(node.to_string(), index, None);
        };

        match err.node() {
            ErrorNode::Fundamental { message, trace } => {
                Self::unclassified(message.clone(), index, Some(trace.caller()))
            }
            ErrorNode::Stacked { trace, .. } => {
                Self::unclassified(err.to_string(), index, Some(trace.caller()))
            }
            ErrorNode::Messaged { .. } => Self::unclassified(err.to_string(), index, None),
            ErrorNode::Coded {
                message,
                code,
                trace,
                ..
            } => {
                let coder = registry.lookup(*code);
                let external = if coder.message().is_empty() {
                    message.clone()
                } else {
                    coder.message().to_string()
                };
                Self {
                    index,
                    code: coder.code(),
                    message: external,
                    error: message.clone(),
                    caller: Some(trace.caller()),
                }
            }
        }
    }

    fn unclassified(text: String, index: usize, caller: Option<LocationRecord>) -> Self {
        Self {
            index,
            code: UNKNOWN_CODE,
            message: text.clone(),
            error: text,
            caller,
        }
    }

    /// `"#k file:line (function)"`, or `"#k"` without a trace.
    pub fn caller_label(&self) -> String {
        match &self.caller {
            Some(caller) => format!("#{} {}", self.index, caller),
            None => format!("#{}", self.index),
        }
    }
}
