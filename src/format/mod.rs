//! Rendering error chains for humans and machines.
//!
//! Output is controlled by three flags:
//!
//! - `detail`: each segment shows index, caller, code and external message;
//! - `trace`: every node of the chain is rendered, joined by `"; "`;
//! - `json`: a JSON array of objects instead of text.
//!
//! Segments are indexed from the innermost node (`#0`) outwards. Without
//! `trace` only the outermost segment is rendered.

mod render;
mod segment;

pub use render::Render;
pub use segment::Segment;
