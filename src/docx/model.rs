//! WordprocessingML text model.
//!
//! A [`Block`] is one `w:p` paragraph; its [`TextFragment`]s are the `w:t`
//! elements whose nearest enclosing paragraph is that block. Each fragment
//! records the byte range of its element inside the payload, so writing back
//! only touches fragments of blocks that actually changed. Everything else in
//! the payload (run properties, bookmarks, drawings) is carried through as-is.

use std::ops::Range;

use roxmltree::{Document, Node};

use crate::error::{ReplaceError, ReplaceResult};

/// Transitional WordprocessingML namespace.
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Strict OOXML WordprocessingML namespace.
pub const WORDML_STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

const PRESERVE_SPACE: &str = r#" xml:space="preserve""#;

/// One `w:t` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    text: String,
    range: Range<usize>,
    qname: String,
    /// Source attributes minus `xml:space`, which is rewritten on output.
    attrs: String,
    preserve_space: bool,
}

impl TextFragment {
    /// Decoded text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte range of the whole element in the payload.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Whether the source element carried `xml:space="preserve"`.
    pub fn preserves_space(&self) -> bool {
        self.preserve_space
    }

    fn with_text(&self, text: String) -> Self {
        Self {
            text,
            ..self.clone()
        }
    }

    /// Serialized element. Non-empty text always carries `xml:space="preserve"`;
    /// an empty fragment drops it and self-closes.
    pub fn to_xml(&self) -> String {
        let attrs = &self.attrs;
        if self.text.is_empty() {
            format!("<{}{attrs}/>", self.qname)
        } else {
            format!(
                "<{q}{attrs}{PRESERVE_SPACE}>{}</{q}>",
                escape_text(&self.text),
                q = self.qname
            )
        }
    }
}

/// One `w:p` paragraph: the unit of independent scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    range: Range<usize>,
    fragments: Vec<TextFragment>,
    modified: bool,
}

impl Block {
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Byte range of the paragraph element in the payload.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// `true` once the block's text has been redistributed.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Concatenated fragment texts.
    pub fn text(&self) -> String {
        self.fragments.iter().map(TextFragment::text).collect()
    }

    /// A copy of this block holding `text`.
    ///
    /// Identical text returns an unmodified copy, keeping the serialized form
    /// byte-identical. Otherwise the whole of `text` goes into the first
    /// fragment and every other fragment is emptied, so run formatting after
    /// the first fragment collapses when the text changes.
    pub fn redistribute(&self, text: String) -> Self {
        if self.fragments.is_empty() || text == self.text() {
            return self.clone();
        }

        let mut fragments = Vec::with_capacity(self.fragments.len());
        let mut rest = self.fragments.iter();
        if let Some(first) = rest.next() {
            fragments.push(first.with_text(text));
        }
        fragments.extend(rest.map(|f| f.with_text(String::new())));

        Self {
            range: self.range.clone(),
            fragments,
            modified: true,
        }
    }
}

/// Parsed view of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatDocument {
    /// All block texts concatenated in document order.
    pub logical_text: String,
    pub blocks: Vec<Block>,
}

impl FlatDocument {
    /// Block texts joined with newlines, for previews and diffs.
    pub fn display_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_wordml(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && matches!(
            node.tag_name().namespace(),
            Some(WORDML_NS | WORDML_STRICT_NS)
        )
}

fn nearest_paragraph<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.ancestors().skip(1).find(|a| is_wordml(*a, "p"))
}

/// End (exclusive) of the open tag starting at `raw[0]`, honoring quoted
/// attribute values.
fn open_tag_end(raw: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Attribute text of an open tag with any `xml:space` attribute removed.
///
/// `attrs` comes from a tag that already parsed, so every attribute is
/// `name = quoted value`; anything else is kept verbatim.
fn strip_space_attr(attrs: &str) -> String {
    let mut out = String::with_capacity(attrs.len());
    let mut rest = attrs;
    while let Some(start) = rest.find(|c: char| !c.is_whitespace()) {
        let (lead, tail) = rest.split_at(start);
        let Some(eq) = tail.find('=') else {
            out.push_str(rest);
            break;
        };
        let value = tail[eq + 1..].trim_start();
        let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            out.push_str(rest);
            break;
        };
        let Some(close) = value[1..].find(quote) else {
            out.push_str(rest);
            break;
        };
        let consumed = tail.len() - value.len() + close + 2;
        if tail[..eq].trim_end() != "xml:space" {
            out.push_str(lead);
            out.push_str(&tail[..consumed]);
        }
        rest = &tail[consumed..];
    }
    out
}

fn fragment_from_node(
    payload: &str,
    offset: usize,
    node: Node<'_, '_>,
) -> ReplaceResult<TextFragment> {
    let local = node.range();
    let range = local.start + offset..local.end + offset;
    let raw = &payload[range.clone()];

    let malformed = || {
        ReplaceError::MalformedDocument(format!("unreadable text element at byte {}", range.start))
    };

    let end = open_tag_end(raw).ok_or_else(malformed)?;
    let head = raw[1..end - 1].strip_suffix('/').unwrap_or(&raw[1..end - 1]);
    let name_len = head
        .find(|c: char| c.is_whitespace())
        .unwrap_or(head.len());
    if name_len == 0 {
        return Err(malformed());
    }

    let text = node
        .children()
        .filter(Node::is_text)
        .filter_map(|c| c.text())
        .collect();

    Ok(TextFragment {
        text,
        range,
        qname: head[..name_len].to_owned(),
        attrs: strip_space_attr(&head[name_len..]),
        preserve_space: node.attribute((XML_NS, "space")) == Some("preserve"),
    })
}

/// Parse `payload` into blocks and compute its logical text.
///
/// # Errors
///
/// Returns [`ReplaceError::MalformedDocument`] if the payload is not
/// well-formed XML or has no `w:body` element.
pub fn flatten(payload: &str) -> ReplaceResult<FlatDocument> {
    let body = payload.strip_prefix('\u{feff}').unwrap_or(payload);
    let offset = payload.len() - body.len();

    let doc = Document::parse(body)
        .map_err(|e| ReplaceError::MalformedDocument(format!("invalid XML: {e}")))?;

    if !doc.descendants().any(|n| is_wordml(n, "body")) {
        return Err(ReplaceError::MalformedDocument(
            "missing w:body element".to_owned(),
        ));
    }

    let mut blocks = Vec::new();
    for para in doc.descendants().filter(|n| is_wordml(*n, "p")) {
        let fragments = para
            .descendants()
            .filter(|n| is_wordml(*n, "t") && nearest_paragraph(*n) == Some(para))
            .map(|n| fragment_from_node(payload, offset, n))
            .collect::<ReplaceResult<Vec<_>>>()?;
        let range = para.range();
        blocks.push(Block {
            range: range.start + offset..range.end + offset,
            fragments,
            modified: false,
        });
    }

    let logical_text = blocks.iter().map(Block::text).collect();
    Ok(FlatDocument {
        logical_text,
        blocks,
    })
}

/// Write modified blocks back into `payload`. Unmodified blocks (and all
/// non-text markup) are copied byte for byte.
pub fn serialize(payload: &str, blocks: &[Block]) -> String {
    let mut edits: Vec<(Range<usize>, String)> = blocks
        .iter()
        .filter(|b| b.modified)
        .flat_map(|b| b.fragments.iter().map(|f| (f.range(), f.to_xml())))
        .collect();
    if edits.is_empty() {
        return payload.to_owned();
    }
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(payload.len());
    let mut last = 0;
    for (range, xml) in edits {
        if range.start < last {
            continue;
        }
        out.push_str(&payload[last..range.start]);
        out.push_str(&xml);
        last = range.end;
    }
    out.push_str(&payload[last..]);
    out
}

/// Escape character data for element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Wrap paragraph markup in a minimal `word/document.xml`.
    pub(crate) fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORDML_NS}"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }

    #[test]
    fn test_flatten_concatenates_runs() {
        let xml = document(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>"#,
        );
        let flat = flatten(&xml).expect("flatten");
        assert_eq!(flat.blocks.len(), 2);
        assert_eq!(flat.blocks[0].text(), "Hello");
        assert_eq!(flat.blocks[0].fragments().len(), 2);
        assert!(flat.blocks[1].fragments()[0].preserves_space());
        assert_eq!(flat.logical_text, "Hello world");
        assert_eq!(flat.display_text(), "Hello\n world");
    }

    #[test]
    fn test_flatten_decodes_entities() {
        let xml = document("<w:p><w:r><w:t>A &amp; B &lt;C&gt;</w:t></w:r></w:p>");
        let flat = flatten(&xml).expect("flatten");
        assert_eq!(flat.logical_text, "A & B <C>");
    }

    #[test]
    fn test_flatten_missing_body_is_malformed() {
        let xml = format!(r#"<w:document xmlns:w="{WORDML_NS}"></w:document>"#);
        let err = flatten(&xml).expect_err("missing body");
        assert!(matches!(err, ReplaceError::MalformedDocument(_)));
    }

    #[test]
    fn test_flatten_invalid_xml_is_malformed() {
        let err = flatten("<w:document><w:body>").expect_err("invalid XML");
        assert!(matches!(err, ReplaceError::MalformedDocument(_)));
    }

    #[test]
    fn test_paragraph_without_text_has_no_fragments() {
        let xml = document(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        let flat = flatten(&xml).expect("flatten");
        assert_eq!(flat.blocks.len(), 1);
        assert!(flat.blocks[0].fragments().is_empty());
    }

    #[test]
    fn test_nested_paragraph_owns_its_own_text() {
        let xml = document(
            "<w:p><w:r><w:t>outer</w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:r></w:p>",
        );
        let flat = flatten(&xml).expect("flatten");
        assert_eq!(flat.blocks.len(), 2);
        assert_eq!(flat.blocks[0].text(), "outer");
        assert_eq!(flat.blocks[1].text(), "inner");
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let xml = document(
            r#"<w:p><w:r><w:t xml:space="preserve">fo</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>o &amp; bar</w:t></w:r></w:p><w:p/>"#,
        );
        let flat = flatten(&xml).expect("flatten");
        let blocks: Vec<Block> = flat
            .blocks
            .iter()
            .map(|b| b.redistribute(b.text()))
            .collect();
        assert!(blocks.iter().all(|b| !b.is_modified()));
        assert_eq!(serialize(&xml, &blocks), xml);
    }

    #[test]
    fn test_redistribute_into_first_fragment() {
        let xml = document("<w:p><w:r><w:t>fo</w:t></w:r><w:r><w:t>o bar</w:t></w:r></w:p>");
        let flat = flatten(&xml).expect("flatten");
        let block = flat.blocks[0].redistribute("baz bar".to_owned());
        assert!(block.is_modified());
        assert_eq!(block.fragments()[0].text(), "baz bar");
        assert_eq!(block.fragments()[1].text(), "");

        let out = serialize(&xml, &[block]);
        assert!(out.contains(r#"<w:t xml:space="preserve">baz bar</w:t>"#));
        assert!(out.contains("<w:t/>"));
        assert_eq!(flatten(&out).expect("reflatten").logical_text, "baz bar");
    }

    #[test]
    fn test_emptied_fragment_drops_space_attribute() {
        let xml = document(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:r><w:t xml:space="preserve" > b</w:t></w:r></w:p>"#,
        );
        let flat = flatten(&xml).expect("flatten");
        let block = flat.blocks[0].redistribute("z".to_owned());
        let out = serialize(&xml, &[block]);
        assert!(out.contains(r#"<w:t xml:space="preserve">z</w:t><"#));
        assert!(out.contains("<w:t/>"));
        assert!(!out.contains(" b<"));
    }

    #[test]
    fn test_serialize_escapes_markup_characters() {
        let xml = document("<w:p><w:r><w:t>x</w:t></w:r></w:p>");
        let flat = flatten(&xml).expect("flatten");
        let block = flat.blocks[0].redistribute("<a & b>".to_owned());
        let out = serialize(&xml, &[block]);
        assert!(out.contains("&lt;a &amp; b&gt;"));
        assert_eq!(flatten(&out).expect("reflatten").logical_text, "<a & b>");
    }

    #[test]
    fn test_strip_space_attr_keeps_other_attributes() {
        assert_eq!(
            strip_space_attr(r#" w:rsid="00A1" xml:space = 'preserve' w:x="a=b" "#),
            r#" w:rsid="00A1" w:x="a=b""#
        );
        assert_eq!(strip_space_attr(r#" xml:space="preserve""#), "");
        assert_eq!(strip_space_attr(""), "");
    }

    #[test]
    fn test_rewritten_fragment_keeps_other_attributes() {
        let xml = document(
            r#"<w:p><w:r><w:t w14:x="1" xml:space="preserve" xmlns:w14="urn:x">a</w:t></w:r></w:p>"#,
        );
        let flat = flatten(&xml).expect("flatten");
        let out = serialize(&xml, &[flat.blocks[0].redistribute("b".to_owned())]);
        assert!(out.contains(
            r#"<w:t w14:x="1" xmlns:w14="urn:x" xml:space="preserve">b</w:t>"#
        ));
    }

    #[test]
    fn test_open_tag_end_skips_quoted_gt() {
        assert_eq!(open_tag_end(r#"<w:t a="x>y">z</w:t>"#), Some(13));
        assert_eq!(open_tag_end("<w:t/>"), Some(6));
    }

    #[test]
    fn test_bom_prefixed_payload() {
        let xml = format!("\u{feff}{}", document("<w:p><w:r><w:t>x</w:t></w:r></w:p>"));
        let flat = flatten(&xml).expect("flatten");
        let block = flat.blocks[0].redistribute("y".to_owned());
        let out = serialize(&xml, &[block]);
        assert!(out.starts_with('\u{feff}'));
        assert_eq!(flatten(&out).expect("reflatten").logical_text, "y");
    }
}
