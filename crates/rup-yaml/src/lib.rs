//! # rup-yaml
//!
//! Bounded loading of YAML and JSON files into an ordered [`Document`] tree.
//!
//! Input to the RUP validators is untrusted: protocol files and agent outputs
//! may be oversized, or may be YAML "billion laughs" payloads whose aliases
//! expand exponentially. Every entry point in this crate enforces the limits
//! in [`LoadOptions`] before or while parsing:
//!
//! - the byte size of a file is checked against `max_bytes` before it is read;
//! - every YAML alias expansion is counted (transitively, through nested
//!   anchors) against `max_aliases`, and the nodes those expansions copy are
//!   counted against `max_alias_nodes`; parsing stops as soon as either is
//!   exceeded;
//! - container nesting is bounded by `max_nesting`.
//!
//! Both formats produce the same tree: mapping keys keep their source order,
//! duplicate keys are rejected rather than silently merged, and YAML-only
//! constructs without a JSON counterpart (non-string keys, merge keys, custom
//! tags) are rejected.
//!
//! ## Example
//!
//! ```rust
//! use rup_yaml::{Format, LoadOptions, parse_str};
//!
//! let doc = parse_str("name: demo\ntags: [a, b]\n", Format::Yaml, &LoadOptions::default()).unwrap();
//! assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("demo"));
//! ```

mod document;
mod error;
mod json;
mod loader;
mod parser;

pub use document::{Document, Number};
pub use error::{LoadError, Result};
pub use loader::{Format, LoadOptions, load, parse_str};
