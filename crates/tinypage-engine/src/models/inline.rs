use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Link targets the compiler accepts: site paths, anchors, bare `.html` files,
/// http(s), mailto and tel.
static HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(/[a-z0-9._/-]*|#[a-z0-9-]*|[a-z0-9-]+\.html|https?://[^\s]+|mailto:[^\s]+|tel:[^\s]+)$",
    )
    .expect("href pattern is valid")
});

/// Returns true if `href` is a link target the compiler will emit.
pub fn is_valid_href(href: &str) -> bool {
    !href.is_empty() && HREF_PATTERN.is_match(href)
}

/// Browsing context a link opens in. Only a new tab is ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkTarget {
    #[serde(rename = "_blank")]
    Blank,
}

/// Reads any stored target, keeping only `_blank`.
fn lenient_target<'de, D>(deserializer: D) -> Result<Option<LinkTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|t| t == "_blank").map(|_| LinkTarget::Blank))
}

/// A node of rich inline markup inside a text-bearing block.
///
/// Serialized in the compiler's inline format, e.g.
/// `{"type":"bold","children":[{"type":"text","text":"hi"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InlineNode {
    Text {
        text: String,
    },
    Linebreak,
    Bold {
        #[serde(default)]
        children: Vec<InlineNode>,
    },
    Italic {
        #[serde(default)]
        children: Vec<InlineNode>,
    },
    Underline {
        #[serde(default)]
        children: Vec<InlineNode>,
    },
    Strikethrough {
        #[serde(default)]
        children: Vec<InlineNode>,
    },
    Code {
        #[serde(default)]
        children: Vec<InlineNode>,
    },
    Link {
        href: String,
        #[serde(
            default,
            deserialize_with = "lenient_target",
            skip_serializing_if = "Option::is_none"
        )]
        target: Option<LinkTarget>,
        #[serde(default)]
        children: Vec<InlineNode>,
    },
}

/// Formatting elements that can be toggled over a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineTag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl InlineTag {
    /// Builds an element of this tag around `children`.
    pub fn wrap(self, children: Vec<InlineNode>) -> InlineNode {
        match self {
            InlineTag::Bold => InlineNode::Bold { children },
            InlineTag::Italic => InlineNode::Italic { children },
            InlineTag::Underline => InlineNode::Underline { children },
            InlineTag::Strikethrough => InlineNode::Strikethrough { children },
            InlineTag::Code => InlineNode::Code { children },
        }
    }

    /// HTML element name, as used by the editor toolbar.
    pub fn element_name(self) -> &'static str {
        match self {
            InlineTag::Bold => "b",
            InlineTag::Italic => "i",
            InlineTag::Underline => "u",
            InlineTag::Strikethrough => "s",
            InlineTag::Code => "code",
        }
    }
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text { text: text.into() }
    }

    /// Tag of this node if it is a toggleable formatting element.
    pub fn tag(&self) -> Option<InlineTag> {
        match self {
            InlineNode::Bold { .. } => Some(InlineTag::Bold),
            InlineNode::Italic { .. } => Some(InlineTag::Italic),
            InlineNode::Underline { .. } => Some(InlineTag::Underline),
            InlineNode::Strikethrough { .. } => Some(InlineTag::Strikethrough),
            InlineNode::Code { .. } => Some(InlineTag::Code),
            InlineNode::Text { .. } | InlineNode::Linebreak | InlineNode::Link { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<InlineNode>> {
        match self {
            InlineNode::Bold { children }
            | InlineNode::Italic { children }
            | InlineNode::Underline { children }
            | InlineNode::Strikethrough { children }
            | InlineNode::Code { children }
            | InlineNode::Link { children, .. } => Some(children),
            InlineNode::Text { .. } | InlineNode::Linebreak => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<InlineNode>> {
        match self {
            InlineNode::Bold { children }
            | InlineNode::Italic { children }
            | InlineNode::Underline { children }
            | InlineNode::Strikethrough { children }
            | InlineNode::Code { children }
            | InlineNode::Link { children, .. } => Some(children),
            InlineNode::Text { .. } | InlineNode::Linebreak => None,
        }
    }

    /// Length in characters; a linebreak counts as one.
    pub fn char_len(&self) -> usize {
        match self {
            InlineNode::Text { text } => text.chars().count(),
            InlineNode::Linebreak => 1,
            _ => self.children().map_or(0, |c| char_len(c)),
        }
    }

    /// Plain text with linebreaks rendered as `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            InlineNode::Text { text } => out.push_str(text),
            InlineNode::Linebreak => out.push('\n'),
            _ => {
                for child in self.children().into_iter().flatten() {
                    child.push_plain_text(out);
                }
            }
        }
    }
}

/// Total character length of a node sequence.
pub fn char_len(nodes: &[InlineNode]) -> usize {
    nodes.iter().map(InlineNode::char_len).sum()
}

/// Plain text of a node sequence.
pub fn plain_text(nodes: &[InlineNode]) -> String {
    nodes.iter().map(InlineNode::plain_text).collect()
}

/// Merges adjacent text siblings and drops empty ones.
///
/// Only touches `nodes` itself, not nested children. A sequence that ends up
/// empty is left empty.
pub fn merge_adjacent_text(nodes: &mut Vec<InlineNode>) {
    let mut merged: Vec<InlineNode> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            InlineNode::Text { text } if text.is_empty() => {}
            InlineNode::Text { text } => {
                if let Some(InlineNode::Text { text: prev }) = merged.last_mut() {
                    prev.push_str(&text);
                } else {
                    merged.push(InlineNode::Text { text });
                }
            }
            other => merged.push(other),
        }
    }
    *nodes = merged;
}

/// Repairs inline markup read from a stored source.
///
/// Links with a missing or rejected href are replaced by their children.
pub fn sanitize(nodes: Vec<InlineNode>) -> Vec<InlineNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            InlineNode::Link {
                href,
                target,
                children,
            } => {
                let children = sanitize(children);
                if is_valid_href(&href) {
                    out.push(InlineNode::Link {
                        href,
                        target,
                        children,
                    });
                } else {
                    log::warn!("dropping link with invalid href {href:?}");
                    out.extend(children);
                }
            }
            mut other => {
                if let Some(children) = other.children_mut() {
                    *children = sanitize(std::mem::take(children));
                }
                out.push(other);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/blog/post-1", true)]
    #[case("#top", true)]
    #[case("about.html", true)]
    #[case("https://example.com/x?y=1", true)]
    #[case("mailto:me@example.com", true)]
    #[case("tel:+49123", true)]
    #[case("www.example.com", false)]
    #[case("javascript:alert(1)", false)]
    #[case("", false)]
    fn href_pattern(#[case] href: &str, #[case] valid: bool) {
        assert_eq!(is_valid_href(href), valid);
    }

    #[test]
    fn char_len_counts_linebreak_as_one() {
        let nodes = vec![
            InlineNode::text("ab"),
            InlineNode::Linebreak,
            InlineNode::Bold {
                children: vec![InlineNode::text("cdé")],
            },
        ];
        assert_eq!(char_len(&nodes), 6);
        assert_eq!(plain_text(&nodes), "ab\ncdé");
    }

    #[test]
    fn merge_joins_text_and_drops_empty() {
        let mut nodes = vec![
            InlineNode::text("a"),
            InlineNode::text(""),
            InlineNode::text("b"),
            InlineNode::Linebreak,
            InlineNode::text("c"),
        ];
        merge_adjacent_text(&mut nodes);
        assert_eq!(
            nodes,
            vec![
                InlineNode::text("ab"),
                InlineNode::Linebreak,
                InlineNode::text("c")
            ]
        );
    }

    #[test]
    fn sanitize_unwraps_invalid_links() {
        let nodes = vec![InlineNode::Link {
            href: "javascript:void(0)".to_string(),
            target: None,
            children: vec![InlineNode::text("click")],
        }];
        assert_eq!(sanitize(nodes), vec![InlineNode::text("click")]);
    }

    #[rstest]
    #[case(r#"{"type":"link","href":"/a","target":"_self"}"#, None)]
    #[case(r#"{"type":"link","href":"/a","target":"_blank"}"#, Some(LinkTarget::Blank))]
    #[case(r#"{"type":"link","href":"/a"}"#, None)]
    fn only_blank_target_is_read(#[case] json: &str, #[case] expected: Option<LinkTarget>) {
        let node: InlineNode = serde_json::from_str(json).unwrap();
        let InlineNode::Link { target, .. } = node else {
            panic!("expected link");
        };
        assert_eq!(target, expected);
    }

    #[test]
    fn blank_target_is_written_as_html_value() {
        let node = InlineNode::Link {
            href: "/a".to_string(),
            target: Some(LinkTarget::Blank),
            children: vec![],
        };
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"type":"link","href":"/a","target":"_blank","children":[]}"#
        );
    }

    #[test]
    fn serde_uses_compiler_format() {
        let node = InlineNode::Bold {
            children: vec![InlineNode::text("hi"), InlineNode::Linebreak],
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"bold","children":[{"type":"text","text":"hi"},{"type":"linebreak"}]}"#
        );
    }
}
