use std::collections::HashSet;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Node};

use crate::extractor::images::{expand_protocol_relative, resolve_img_src};

/// Tags that survive sanitization. Everything else is unwrapped.
pub const ALLOWED_TAGS: [&str; 13] = [
    "p", "h1", "h2", "h3", "ul", "ol", "li", "img", "strong", "em", "b", "i", "a",
];

/// Tags removed together with everything inside them.
const DROPPED_TAGS: [&str; 4] = ["script", "style", "svg", "noscript"];

/// Formatting tags the HTML parser looks through when closing list items.
const FORMATTING_TAGS: [&str; 5] = ["a", "strong", "em", "b", "i"];

const DEFAULT_ALT: &str = "Image";

/// A node of the sanitized output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanNode {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<CleanNode>,
    },
    Text(String),
}

// Deeply nested trees are torn down with a work list, not recursion.
impl Drop for CleanNode {
    fn drop(&mut self) {
        let CleanNode::Element { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let CleanNode::Element { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

/// Sanitized markup, rebuilt from scratch rather than edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanFragment {
    nodes: Vec<CleanNode>,
}

enum Emit<'a> {
    Open(&'a CleanNode),
    Close(&'static str),
}

impl CleanFragment {
    pub fn nodes(&self) -> &[CleanNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut pending: Vec<Emit<'_>> = self.nodes.iter().rev().map(Emit::Open).collect();

        while let Some(emit) = pending.pop() {
            match emit {
                Emit::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                Emit::Open(CleanNode::Text(text)) => out.push_str(&html_escape::encode_text(text)),
                Emit::Open(CleanNode::Element {
                    tag,
                    attrs,
                    children,
                }) => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attrs {
                        out.push(' ');
                        out.push_str(name);
                        out.push_str("=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(value));
                        out.push('"');
                    }
                    out.push('>');
                    if *tag != "img" {
                        pending.push(Emit::Close(*tag));
                        pending.extend(children.iter().rev().map(Emit::Open));
                    }
                }
            }
        }
        out
    }
}

/// Sanitize `root` and its descendants.
pub fn clean(root: ElementRef<'_>) -> CleanFragment {
    clean_excluding(root, &HashSet::new())
}

enum Step<'a> {
    Visit(NodeRef<'a, Node>),
    Close,
}

struct OpenElement {
    tag: &'static str,
    children: Vec<CleanNode>,
}

/// Sanitize `root`, skipping any node whose id is in `excluded` along with
/// its descendants.
///
/// The walk keeps its own stack, so nesting depth is bounded by memory
/// rather than by the thread's call stack.
pub fn clean_excluding(root: ElementRef<'_>, excluded: &HashSet<NodeId>) -> CleanFragment {
    let mut nodes = Vec::new();
    let mut open: Vec<OpenElement> = Vec::new();
    let mut steps = vec![Step::Visit(*root)];

    while let Some(step) = steps.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::Close => {
                if let Some(done) = open.pop() {
                    let element = CleanNode::Element {
                        tag: done.tag,
                        attrs: Vec::new(),
                        children: done.children,
                    };
                    current(&mut nodes, &mut open).push(element);
                }
                continue;
            }
        };

        if excluded.contains(&node.id()) {
            continue;
        }

        match node.value() {
            Node::Text(text) => push_text(current(&mut nodes, &mut open), text),
            Node::Element(element) => {
                let name = element.name();
                if DROPPED_TAGS.contains(&name) {
                    continue;
                }

                match allowed_tag(name).filter(|tag| nests_cleanly(tag, &open)) {
                    // Unwrap: children take this element's place in the parent.
                    None => push_children(&mut steps, node),
                    Some("img") => {
                        let src = resolve_img_src(element)
                            .map(expand_protocol_relative)
                            .unwrap_or_default();
                        let alt = element.attr("alt").unwrap_or(DEFAULT_ALT).trim().to_string();
                        current(&mut nodes, &mut open).push(CleanNode::Element {
                            tag: "img",
                            attrs: vec![("src", src), ("alt", alt)],
                            children: Vec::new(),
                        });
                    }
                    Some(tag) => {
                        open.push(OpenElement {
                            tag,
                            children: Vec::new(),
                        });
                        steps.push(Step::Close);
                        push_children(&mut steps, node);
                    }
                }
            }
            // Comments, doctypes and processing instructions carry no content.
            _ => {}
        }
    }

    CleanFragment { nodes }
}

fn push_children<'a>(steps: &mut Vec<Step<'a>>, node: NodeRef<'a, Node>) {
    steps.extend(node.children().rev().map(Step::Visit));
}

fn current<'o>(nodes: &'o mut Vec<CleanNode>, open: &'o mut [OpenElement]) -> &'o mut Vec<CleanNode> {
    match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => nodes,
    }
}

fn allowed_tag(name: &str) -> Option<&'static str> {
    ALLOWED_TAGS.iter().copied().find(|tag| *tag == name)
}

// Placements the HTML parser would close or split on reparse are unwrapped
// instead, so the output reads back as the same tree.
fn nests_cleanly(tag: &str, open: &[OpenElement]) -> bool {
    match tag {
        "a" => !any_open(open, &["a"]),
        "p" | "ul" | "ol" => !any_open(open, &["p"]),
        "h1" | "h2" | "h3" => !any_open(open, &["p", "h1", "h2", "h3"]),
        "li" => {
            !any_open(open, &["p"])
                && open
                    .iter()
                    .rev()
                    .map(|parent| parent.tag)
                    .find(|parent| !FORMATTING_TAGS.contains(parent))
                    != Some("li")
        }
        _ => true,
    }
}

fn any_open(open: &[OpenElement], names: &[&str]) -> bool {
    open.iter().any(|parent| names.contains(&parent.tag))
}

// Adjacent text runs are merged so unwrapping does not change how the
// output reparses.
fn push_text(out: &mut Vec<CleanNode>, text: &str) {
    if let Some(CleanNode::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(CleanNode::Text(text.to_string()));
    }
}
