//! YAML parser that builds [`Document`] trees under resource limits.
//!
//! Events are pulled from `yaml-rust2`'s parser one at a time and assembled
//! with an explicit stack, so neither deep nesting nor alias expansion can
//! recurse on the call stack. Pulling (rather than handing the parser a
//! receiver) lets the builder stop the parse at the first violated limit.

use crate::document::{Document, Number};
use crate::error::{LoadError, Result};
use crate::loader::LoadOptions;
use indexmap::IndexMap;
use std::collections::HashMap;
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Tag handle for the YAML core schema (`!!str` and friends).
const CORE_TAG_HANDLE: &str = "tag:yaml.org,2002:";

/// Parse the first YAML document in `content`.
///
/// An empty stream yields [`Document::Null`]. Later documents in a
/// multi-document stream are not read.
pub(crate) fn parse_yaml(content: &str, options: &LoadOptions) -> Result<Document> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = DocumentBuilder::new(options);

    loop {
        let (event, marker) = parser.next_token().map_err(LoadError::from)?;
        if builder.on_event(event, marker)? == Flow::Done {
            break;
        }
    }

    Ok(builder.finish())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

/// A finished node with the bookkeeping needed for alias accounting.
struct Built {
    node: Document,
    /// Alias expansions contained in this node, transitively.
    weight: usize,
    /// Container levels in this node (0 for scalars).
    height: usize,
    /// Nodes in this subtree, itself included.
    size: usize,
}

/// A node whose anchor has been seen and whose construction is complete.
struct Anchored {
    node: Document,
    weight: usize,
    height: usize,
    size: usize,
}

/// A container being constructed.
enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Document>,
        weight: usize,
        height: usize,
        size: usize,
    },
    Mapping {
        anchor: usize,
        entries: IndexMap<String, Document>,
        pending_key: Option<String>,
        weight: usize,
        height: usize,
        size: usize,
    },
}

impl Frame {
    fn absorb(&mut self, child: &Built) {
        let (w, h, n) = match self {
            Frame::Sequence {
                weight, height, size, ..
            }
            | Frame::Mapping {
                weight, height, size, ..
            } => (weight, height, size),
        };
        *w = w.saturating_add(child.weight);
        *h = (*h).max(child.height + 1);
        *n = n.saturating_add(child.size);
    }
}

struct DocumentBuilder<'o> {
    options: &'o LoadOptions,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Anchored>,
    /// Running total of alias expansions in this document.
    expansions: usize,
    /// Running total of nodes copied by those expansions.
    copied: usize,
    root: Option<Document>,
}

impl<'o> DocumentBuilder<'o> {
    fn new(options: &'o LoadOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            anchors: HashMap::new(),
            expansions: 0,
            copied: 0,
            root: None,
        }
    }

    fn finish(self) -> Document {
        self.root.unwrap_or(Document::Null)
    }

    fn on_event(&mut self, event: Event, marker: Marker) -> Result<Flow> {
        match event {
            Event::Nothing | Event::StreamStart | Event::DocumentStart => Ok(Flow::Continue),

            Event::StreamEnd | Event::DocumentEnd => Ok(Flow::Done),

            Event::Scalar(value, style, anchor, tag) => {
                if self.expecting_key() && matches!(style, TScalarStyle::Plain) && value == "<<" {
                    return Err(LoadError::unsupported("merge keys (<<) are not supported", &marker));
                }
                let tag = tag.map(|t| (t.handle, t.suffix));
                let node = resolve_scalar(&value, &style, tag.as_ref(), &marker)?;
                if anchor > 0 {
                    self.anchors.insert(
                        anchor,
                        Anchored {
                            node: node.clone(),
                            weight: 0,
                            height: 0,
                            size: 1,
                        },
                    );
                }
                self.push_complete(
                    Built {
                        node,
                        weight: 0,
                        height: 0,
                        size: 1,
                    },
                    &marker,
                )
            }

            Event::SequenceStart(anchor, tag) => {
                check_container_tag(tag.map(|t| (t.handle, t.suffix)), "seq", &marker)?;
                self.open(
                    Frame::Sequence {
                        anchor,
                        items: Vec::new(),
                        weight: 0,
                        height: 1,
                        size: 1,
                    },
                    &marker,
                )
            }

            Event::MappingStart(anchor, tag) => {
                check_container_tag(tag.map(|t| (t.handle, t.suffix)), "map", &marker)?;
                self.open(
                    Frame::Mapping {
                        anchor,
                        entries: IndexMap::new(),
                        pending_key: None,
                        weight: 0,
                        height: 1,
                        size: 1,
                    },
                    &marker,
                )
            }

            Event::SequenceEnd | Event::MappingEnd => {
                let frame = self
                    .stack
                    .pop()
                    .ok_or_else(|| LoadError::malformed("unbalanced collection end", &marker))?;
                let (anchor, built) = match frame {
                    Frame::Sequence {
                        anchor,
                        items,
                        weight,
                        height,
                        size,
                    } => (
                        anchor,
                        Built {
                            node: Document::Sequence(items),
                            weight,
                            height,
                            size,
                        },
                    ),
                    Frame::Mapping {
                        anchor,
                        entries,
                        pending_key,
                        weight,
                        height,
                        size,
                    } => {
                        if let Some(key) = pending_key {
                            return Err(LoadError::malformed(
                                format!("mapping key '{}' has no value", key),
                                &marker,
                            ));
                        }
                        (
                            anchor,
                            Built {
                                node: Document::Mapping(entries),
                                weight,
                                height,
                                size,
                            },
                        )
                    }
                };
                if anchor > 0 {
                    self.anchors.insert(
                        anchor,
                        Anchored {
                            node: built.node.clone(),
                            weight: built.weight,
                            height: built.height,
                            size: built.size,
                        },
                    );
                }
                self.push_complete(built, &marker)
            }

            Event::Alias(anchor) => self.expand_alias(anchor, &marker),
        }
    }

    fn open(&mut self, frame: Frame, marker: &Marker) -> Result<Flow> {
        if self.stack.len() + 1 > self.options.max_nesting {
            tracing::debug!(line = marker.line(), "YAML nesting limit reached");
            return Err(LoadError::NestingLimitExceeded {
                limit: self.options.max_nesting,
            });
        }
        self.stack.push(frame);
        Ok(Flow::Continue)
    }

    /// Charge the expansion cost of an alias, then splice in a copy of the
    /// anchored node. Both limits are checked before anything is cloned.
    fn expand_alias(&mut self, anchor: usize, marker: &Marker) -> Result<Flow> {
        let Some(anchored) = self.anchors.get(&anchor) else {
            return Err(LoadError::malformed(
                "alias refers to a node that contains it",
                marker,
            ));
        };

        let cost = anchored.weight.saturating_add(1);
        self.expansions = self.expansions.saturating_add(cost);
        if self.expansions > self.options.max_aliases {
            tracing::debug!(
                expansions = self.expansions,
                limit = self.options.max_aliases,
                "YAML alias limit exceeded"
            );
            return Err(LoadError::AliasLimitExceeded {
                limit: self.options.max_aliases,
                line: marker.line(),
            });
        }
        self.copied = self.copied.saturating_add(anchored.size);
        if self.copied > self.options.max_alias_nodes {
            tracing::debug!(
                copied = self.copied,
                limit = self.options.max_alias_nodes,
                "YAML alias node limit exceeded"
            );
            return Err(LoadError::AliasNodesExceeded {
                limit: self.options.max_alias_nodes,
                line: marker.line(),
            });
        }
        if self.stack.len() + anchored.height > self.options.max_nesting {
            return Err(LoadError::NestingLimitExceeded {
                limit: self.options.max_nesting,
            });
        }

        let built = Built {
            node: anchored.node.clone(),
            weight: cost,
            height: anchored.height,
            size: anchored.size,
        };
        self.push_complete(built, marker)
    }

    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_complete(&mut self, built: Built, marker: &Marker) -> Result<Flow> {
        if let Some(Frame::Mapping {
            entries,
            pending_key: None,
            ..
        }) = self.stack.last()
            && let Document::String(key) = &built.node
            && entries.contains_key(key)
        {
            return Err(LoadError::DuplicateKey {
                key: key.clone(),
                path: self.current_path(),
            });
        }

        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(built.node);
            return Ok(Flow::Continue);
        };
        parent.absorb(&built);

        match parent {
            Frame::Sequence { items, .. } => items.push(built.node),
            Frame::Mapping {
                entries,
                pending_key,
                ..
            } => match pending_key.take() {
                Some(key) => {
                    entries.insert(key, built.node);
                }
                None => {
                    let key = match built.node {
                        Document::String(key) => key,
                        other => {
                            return Err(LoadError::unsupported(
                                format!(
                                    "mapping keys must be strings, found {} key {}",
                                    other.type_name(),
                                    other.shape()
                                ),
                                marker,
                            ));
                        }
                    };
                    *pending_key = Some(key);
                }
            },
        }
        Ok(Flow::Continue)
    }

    /// Path of the innermost open container, e.g. `metadata.changelog[0]`.
    fn current_path(&self) -> String {
        let mut path = String::new();
        // Each frame's position is recorded by its parent.
        for parent in self.stack.iter().take(self.stack.len().saturating_sub(1)) {
            match parent {
                Frame::Sequence { items, .. } => path.push_str(&format!("[{}]", items.len())),
                Frame::Mapping { pending_key, .. } => {
                    if let Some(key) = pending_key {
                        if !path.is_empty() {
                            path.push('.');
                        }
                        path.push_str(key);
                    }
                }
            }
        }
        if path.is_empty() {
            "(root)".to_string()
        } else {
            path
        }
    }
}

/// Resolve a scalar event to a document value.
///
/// Only plain scalars are type-resolved; quoted and block scalars are strings.
fn resolve_scalar(
    value: &str,
    style: &TScalarStyle,
    tag: Option<&(String, String)>,
    marker: &Marker,
) -> Result<Document> {
    if let Some((handle, suffix)) = tag {
        if handle == CORE_TAG_HANDLE || handle == "!!" {
            return match suffix.as_str() {
                "str" => Ok(Document::String(value.to_string())),
                "null" | "bool" | "int" | "float" => resolve_plain(value, marker),
                other => Err(LoadError::unsupported(
                    format!("tag !!{} is not supported on scalars", other),
                    marker,
                )),
            };
        }
        if handle == "!" && suffix.is_empty() {
            return Ok(Document::String(value.to_string()));
        }
        return Err(LoadError::unsupported(
            format!("custom tag {}{} is not supported", handle, suffix),
            marker,
        ));
    }

    if matches!(style, TScalarStyle::Plain) {
        resolve_plain(value, marker)
    } else {
        Ok(Document::String(value.to_string()))
    }
}

/// YAML 1.2 core schema resolution for plain scalars.
fn resolve_plain(value: &str, marker: &Marker) -> Result<Document> {
    // Integers above i64::MAX stay exact, matching the JSON loader.
    if !value.starts_with(['+', '-'])
        && let Ok(u) = value.parse::<u64>()
    {
        return Ok(Document::Number(Number::from_u64(u)));
    }

    match Yaml::from_str(value) {
        Yaml::Null => Ok(Document::Null),
        Yaml::Boolean(b) => Ok(Document::Bool(b)),
        Yaml::Integer(i) => Ok(Document::Number(Number::Int(i))),
        real @ Yaml::Real(_) => real
            .as_f64()
            .and_then(Number::from_f64)
            .map(Document::Number)
            .ok_or_else(|| {
                LoadError::malformed(
                    format!("'{}' is not a finite number and has no JSON equivalent", value),
                    marker,
                )
            }),
        _ => Ok(Document::String(value.to_string())),
    }
}

fn check_container_tag(tag: Option<(String, String)>, core: &str, marker: &Marker) -> Result<()> {
    match tag {
        None => Ok(()),
        Some((handle, suffix))
            if (handle == CORE_TAG_HANDLE || handle == "!!") && suffix == core =>
        {
            Ok(())
        }
        Some((handle, suffix)) => Err(LoadError::unsupported(
            format!("tag {}{} is not supported on collections", handle, suffix),
            marker,
        )),
    }
}
