//! Byte estimates for the editor's cost rail and an offline [`Measurer`].
//!
//! Estimates render each block to the markup the compiler would emit and
//! count its UTF-8 bytes. Page chrome is approximated by a fixed overhead.

use async_trait::async_trait;
use html_escape::{encode_quoted_attribute, encode_text};

use crate::models::{InlineNode, LinkTarget};
use crate::publish::{Limits, Measurer, PageMeasurement, Preview};
use crate::serialize::{BlockRecord, ListItemRecord, SerializedDocument};

/// Default bytes of page chrome around the content.
pub const DEFAULT_PAGE_OVERHEAD: usize = 2048;
/// Default bytes the previous/next links add to each page of a split.
pub const DEFAULT_PAGINATION_NAV_BYTES: usize = 160;

const AUTHOR_PUBLISHED: &str = "Published: YYYY-MM-DD";
const AUTHOR_MODIFIED: &str = "Modified: YYYY-MM-DD";
const AUTHOR_BYLINE: &str = "By Author";

fn inline_html(nodes: &[InlineNode], out: &mut String) {
    for node in nodes {
        let tag = match node {
            InlineNode::Text { text } => {
                out.push_str(&encode_text(text));
                continue;
            }
            InlineNode::Linebreak => {
                out.push_str("<br>");
                continue;
            }
            InlineNode::Link {
                href,
                target,
                children,
            } => {
                out.push_str(&format!("<a href=\"{href}\""));
                if *target == Some(LinkTarget::Blank) {
                    out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                }
                out.push('>');
                inline_html(children, out);
                out.push_str("</a>");
                continue;
            }
            other => other.tag().map_or("span", |t| t.element_name()),
        };
        out.push_str(&format!("<{tag}>"));
        inline_html(node.children().map_or(&[][..], Vec::as_slice), out);
        out.push_str(&format!("</{tag}>"));
    }
}

/// Escaping for code and tag text, which the compiler also applies to quotes.
fn escape_all(text: &str) -> String {
    encode_quoted_attribute(text).replace('\'', "&#039;")
}

fn inline(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    inline_html(nodes, &mut out);
    out
}

fn safe_token(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Splits `#id.class.class` or `.a.b` into an id and classes, keeping only
/// characters that are safe in attributes.
pub fn parse_selector(selector: &str) -> (Option<String>, Vec<String>) {
    let selector = selector.trim();
    if let Some(rest) = selector.strip_prefix('#') {
        let mut tokens = rest.split('.');
        let id = tokens.next().map(safe_token).filter(|id| !id.is_empty());
        let classes = tokens.map(safe_token).filter(|c| !c.is_empty()).collect();
        return (id, classes);
    }
    let rest = selector.strip_prefix('.').unwrap_or(selector);
    let classes = rest
        .split(|c: char| c == '.' || c.is_whitespace())
        .map(safe_token)
        .filter(|c| !c.is_empty())
        .collect();
    (None, classes)
}

fn attributes(selector: Option<&str>, base_classes: &[&str]) -> String {
    let (id, classes) = selector.map(parse_selector).unwrap_or_default();
    let mut out = String::new();
    if let Some(id) = id {
        out.push_str(&format!(" id=\"{id}\""));
    }
    let classes: Vec<&str> = base_classes
        .iter()
        .copied()
        .chain(classes.iter().map(String::as_str))
        .collect();
    if !classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
    }
    out
}

fn list_html(tag: &str, items: &[ListItemRecord], attrs: &str) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|item| format!("<li>{}</li>", inline(&item.children)))
        .collect();
    format!("<{tag}{attrs}>\n{}\n</{tag}>", items.join("\n"))
}

/// Markup the compiler emits for one block, used only for counting.
fn block_html(record: &BlockRecord) -> String {
    let attrs = attributes(record.selector(), &[]);
    match record {
        BlockRecord::Paragraph { children, .. } => format!("<p{attrs}>{}</p>", inline(children)),
        BlockRecord::Heading {
            level, children, ..
        } => format!("<h{level}{attrs}>{}</h{level}>", inline(children)),
        BlockRecord::Blockquote { children, .. } => {
            format!("<blockquote{attrs}>{}</blockquote>", inline(children))
        }
        BlockRecord::Codeblock { content, .. } => {
            format!(
                "<pre{attrs}><code>{}</code></pre>",
                escape_all(content)
            )
        }
        BlockRecord::UnorderedList { items, .. } => list_html("ul", items, &attrs),
        BlockRecord::OrderedList { items, .. } => list_html("ol", items, &attrs),
        BlockRecord::Divider { .. } => format!("<hr{attrs}>"),
        BlockRecord::Spacer { height, .. } => {
            format!("<div{attrs} style=\"height:{height}\"></div>")
        }
        BlockRecord::Bloglist { .. } => format!("<div{attrs}><!-- bloglist --></div>"),
        BlockRecord::Author {
            show_published,
            show_modified,
            show_author,
            tags,
            ..
        } => {
            let mut parts: Vec<String> = Vec::new();
            if *show_published {
                parts.push(AUTHOR_PUBLISHED.to_string());
            }
            if *show_modified {
                parts.push(AUTHOR_MODIFIED.to_string());
            }
            if *show_author {
                parts.push(AUTHOR_BYLINE.to_string());
            }
            let tags: Vec<String> = tags
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| escape_all(t))
                .collect();
            if !tags.is_empty() {
                parts.push(format!("Tags: {}", tags.join(", ")));
            }
            format!("<p{attrs}>{}</p>", parts.join(" · "))
        }
        BlockRecord::Section { children, .. } => {
            let inner: Vec<String> = children.iter().map(block_html).collect();
            format!("<section{attrs}>{}</section>", inner.join("\n"))
        }
        BlockRecord::Layout {
            columns, children, ..
        } => {
            let cells: Vec<String> = children
                .iter()
                .map(|child| format!("<div class=\"cell\">{}</div>", block_html(child)))
                .collect();
            let mut style = String::from("display:inline-grid;width:fit-content;max-width:100%");
            if *columns != 1 {
                style.push_str(&format!(";grid-template-columns:repeat({columns},1fr)"));
            }
            let attrs = attributes(record.selector(), &["layout"]);
            format!("<div{attrs} style=\"{style}\">{}</div>", cells.join("\n"))
        }
    }
}

/// Estimated output bytes of one block, children included.
pub fn estimate_block_bytes(record: &BlockRecord) -> usize {
    block_html(record).len()
}

/// Estimated bytes of a content sequence, with one newline between blocks.
pub fn estimate_content_bytes(records: &[BlockRecord]) -> usize {
    let blocks: usize = records.iter().map(estimate_block_bytes).sum();
    blocks + records.len().saturating_sub(1)
}

/// Short label the cost rail shows next to a block.
pub fn block_label(record: &BlockRecord) -> String {
    match record {
        BlockRecord::Heading { level, .. } => format!("H{level}"),
        BlockRecord::Paragraph { .. } => "Paragraph".to_string(),
        BlockRecord::Blockquote { .. } => "Quote".to_string(),
        BlockRecord::Codeblock { .. } => "Code".to_string(),
        BlockRecord::UnorderedList { .. } => "UL".to_string(),
        BlockRecord::OrderedList { .. } => "OL".to_string(),
        BlockRecord::Divider { .. } => "HR".to_string(),
        BlockRecord::Spacer { .. } => "Spacer".to_string(),
        BlockRecord::Bloglist { .. } => "Bloglist".to_string(),
        BlockRecord::Author { .. } => "Author".to_string(),
        BlockRecord::Section { .. } => "Section".to_string(),
        BlockRecord::Layout { .. } => "Layout".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCost {
    pub label: String,
    pub bytes: usize,
}

/// Per-block costs of the top-level sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CostRail {
    pub entries: Vec<BlockCost>,
    pub total: usize,
}

impl CostRail {
    pub fn new(records: &[BlockRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| BlockCost {
                label: block_label(record),
                bytes: estimate_block_bytes(record),
            })
            .collect();
        Self {
            entries,
            total: estimate_content_bytes(records),
        }
    }
}

/// How close a page is to the hard limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Normal,
    /// At least 80% of the limit.
    Warning,
    Over,
}

impl Usage {
    pub fn of(bytes: usize, limit: usize) -> Self {
        if bytes >= limit {
            Usage::Over
        } else if bytes * 5 >= limit * 4 {
            Usage::Warning
        } else {
            Usage::Normal
        }
    }
}

/// Formats a byte count with `.` thousands separators, e.g. `14.336 B`.
pub fn format_bytes(bytes: usize) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out.push_str(" B");
    out
}

/// A [`Measurer`] that works from estimates instead of the real compiler.
///
/// With pagination allowed, top-level blocks are packed greedily into pages
/// whose content stays under the hard limit minus page chrome and
/// navigation. A block too large for an empty page makes the split fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatingMeasurer {
    pub limits: Limits,
    pub page_overhead: usize,
    pub nav_bytes: usize,
}

impl Default for EstimatingMeasurer {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            page_overhead: DEFAULT_PAGE_OVERHEAD,
            nav_bytes: DEFAULT_PAGINATION_NAV_BYTES,
        }
    }
}

impl EstimatingMeasurer {
    /// Content bytes of each page, or `None` when some block cannot fit.
    fn pack(&self, blocks: &[usize]) -> Option<Vec<usize>> {
        let budget = self
            .limits
            .hard_limit
            .saturating_sub(self.page_overhead + self.nav_bytes);
        let mut pages = Vec::new();
        let mut current: Option<usize> = None;
        for &bytes in blocks {
            if bytes > budget {
                return None;
            }
            current = match current {
                Some(used) if used + 1 + bytes <= budget => Some(used + 1 + bytes),
                Some(used) => {
                    pages.push(used);
                    Some(bytes)
                }
                None => Some(bytes),
            };
        }
        pages.extend(current);
        Some(pages)
    }

    pub fn measure(&self, document: &SerializedDocument) -> Preview {
        let blocks: Vec<usize> = document.content.iter().map(estimate_block_bytes).collect();
        let total = self.page_overhead + estimate_content_bytes(&document.content);
        if total <= self.limits.hard_limit {
            return Preview {
                exceeded: false,
                bytes: total,
                measurements: Some(vec![PageMeasurement { bytes: total }]),
            };
        }
        if !document.allow_pagination {
            return Preview {
                exceeded: true,
                bytes: total,
                measurements: None,
            };
        }
        match self.pack(&blocks) {
            Some(pages) => Preview {
                exceeded: false,
                bytes: total,
                measurements: Some(
                    pages
                        .into_iter()
                        .map(|content| PageMeasurement {
                            bytes: self.page_overhead + self.nav_bytes + content,
                        })
                        .collect(),
                ),
            },
            None => Preview {
                exceeded: true,
                bytes: total,
                measurements: None,
            },
        }
    }
}

#[async_trait(?Send)]
impl Measurer for EstimatingMeasurer {
    async fn preview(&self, document: &SerializedDocument) -> anyhow::Result<Preview> {
        let preview = self.measure(document);
        log::debug!(
            "estimated {} bytes (pagination {}): {:?}",
            preview.bytes,
            document.allow_pagination,
            preview.measurements.as_ref().map(Vec::len)
        );
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InlineTag;
    use crate::serialize::PageType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use uuid::Uuid;

    fn paragraph(text: &str) -> BlockRecord {
        BlockRecord::Paragraph {
            children: vec![InlineNode::text(text)],
            selector: None,
        }
    }

    fn document(content: Vec<BlockRecord>, allow_pagination: bool) -> SerializedDocument {
        SerializedDocument {
            slug: "s".into(),
            title: "t".into(),
            page_type: PageType::Post,
            build_id: Uuid::nil(),
            content,
            allow_pagination,
        }
    }

    #[rstest]
    #[case("#hero.wide.dark", Some("hero"), &["wide", "dark"])]
    #[case(".a .b", None, &["a", "b"])]
    #[case("a<b>.c", None, &["ab", "c"])]
    #[case("   ", None, &[])]
    fn selector_parsing(#[case] raw: &str, #[case] id: Option<&str>, #[case] classes: &[&str]) {
        let (parsed_id, parsed_classes) = parse_selector(raw);
        assert_eq!(parsed_id.as_deref(), id);
        assert_eq!(parsed_classes, classes);
    }

    #[test]
    fn paragraph_bytes_include_escapes_and_markup() {
        let record = BlockRecord::Paragraph {
            children: vec![
                InlineNode::text("a<b"),
                InlineTag::Bold.wrap(vec![InlineNode::text("c")]),
            ],
            selector: Some("#x".into()),
        };
        assert_eq!(block_html(&record), r#"<p id="x">a&lt;b<b>c</b></p>"#);
        assert_eq!(estimate_block_bytes(&record), 28);
    }

    #[test]
    fn code_escapes_quotes_but_text_does_not() {
        let code = BlockRecord::Codeblock {
            content: r#"say "hi" & 'bye'"#.into(),
            selector: None,
        };
        assert_eq!(
            block_html(&code),
            "<pre><code>say &quot;hi&quot; &amp; &#039;bye&#039;</code></pre>"
        );
        assert_eq!(
            block_html(&paragraph(r#"say "hi""#)),
            r#"<p>say "hi"</p>"#
        );
    }

    #[test]
    fn list_and_layout_markup() {
        let list = BlockRecord::OrderedList {
            items: vec![
                ListItemRecord {
                    children: vec![InlineNode::text("1")],
                },
                ListItemRecord {
                    children: vec![InlineNode::text("2")],
                },
            ],
            selector: None,
        };
        assert_eq!(block_html(&list), "<ol>\n<li>1</li>\n<li>2</li>\n</ol>");

        let layout = BlockRecord::Layout {
            columns: 1,
            children: vec![BlockRecord::Divider { selector: None }],
            selector: Some(".grid".into()),
        };
        assert_eq!(
            block_html(&layout),
            r#"<div class="layout grid" style="display:inline-grid;width:fit-content;max-width:100%"><div class="cell"><hr></div></div>"#
        );
    }

    #[test]
    fn content_total_adds_newlines_between_blocks() {
        let records = vec![paragraph("a"), paragraph("b"), paragraph("c")];
        assert_eq!(estimate_content_bytes(&records), 3 * 8 + 2);
        let rail = CostRail::new(&records);
        assert_eq!(rail.entries.len(), 3);
        assert_eq!(rail.entries[0].label, "Paragraph");
        assert_eq!(rail.total, 26);
    }

    #[rstest]
    #[case(0, "0 B")]
    #[case(999, "999 B")]
    #[case(14336, "14.336 B")]
    #[case(1234567, "1.234.567 B")]
    fn bytes_are_formatted_with_dots(#[case] bytes: usize, #[case] expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }

    #[rstest]
    #[case(100, Usage::Normal)]
    #[case(11469, Usage::Warning)]
    #[case(14336, Usage::Over)]
    fn usage_levels(#[case] bytes: usize, #[case] expected: Usage) {
        assert_eq!(Usage::of(bytes, HARD), expected);
    }

    const HARD: usize = 14_336;

    fn measurer() -> EstimatingMeasurer {
        EstimatingMeasurer {
            limits: Limits {
                hard_limit: 100,
                soft_threshold: 100,
            },
            page_overhead: 20,
            nav_bytes: 10,
        }
    }

    #[test]
    fn small_document_is_one_page() {
        let preview = measurer().measure(&document(vec![paragraph("hi")], false));
        assert!(!preview.exceeded);
        assert_eq!(preview.bytes, 20 + 9);
        assert_eq!(preview.split_page_count(), None);
    }

    #[test]
    fn large_document_splits_greedily() {
        // 30 bytes each; budget 70 fits two per page with the joining newline.
        let block = paragraph(&"x".repeat(23));
        let content = vec![block.clone(), block.clone(), block];
        let single = measurer().measure(&document(content.clone(), false));
        assert!(single.exceeded);
        assert_eq!(single.bytes, 20 + 92);

        let split = measurer().measure(&document(content, true));
        assert!(!split.exceeded);
        assert_eq!(
            split.measurements,
            Some(vec![
                PageMeasurement { bytes: 30 + 61 },
                PageMeasurement { bytes: 30 + 30 },
            ])
        );
    }

    #[test]
    fn oversized_block_cannot_be_split() {
        let content = vec![paragraph(&"x".repeat(80)), paragraph("y")];
        let split = measurer().measure(&document(content, true));
        assert!(split.exceeded);
        assert_eq!(split.measurements, None);
    }
}
