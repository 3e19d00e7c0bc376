//! Canonical content: the off-screen source of truth for every block

mod channel;

pub use channel::{ContentChange, ContentChannel, ContentPublisher};

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Unique identifier for a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// The kind of a top-level block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Synthesized from the post header at activation
    Cover,
    /// Anything the post body provides (paragraphs, figures, lists)
    #[default]
    Body,
}

/// One top-level renderable unit of the post
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Outer markup, cloned into pages when rendered
    pub html: String,
}

/// Ordered blocks of the post body.
///
/// Blocks are never moved out of this store: pages hold ids and the
/// renderer clones markup from here.
#[derive(Debug, Clone, Default)]
pub struct CanonicalContent {
    blocks: Vec<ContentBlock>,
    index: FxHashMap<BlockId, usize>,
    next_id: u32,
    version: u64,
}

impl CanonicalContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build content from block markup in document order
    pub fn from_html_blocks<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut content = Self::new();
        for html in blocks {
            content.push(html);
        }
        content
    }

    /// Append a body block
    pub fn push(&mut self, html: impl Into<String>) -> BlockId {
        let id = self.allocate_id();
        self.index.insert(id, self.blocks.len());
        self.blocks.push(ContentBlock {
            id,
            kind: BlockKind::Body,
            html: html.into(),
        });
        self.version += 1;
        id
    }

    /// Prepend the post header as a cover block.
    ///
    /// Blank header markup produces no cover.
    pub fn insert_cover(&mut self, header_html: &str) -> Option<BlockId> {
        if header_html.trim().is_empty() {
            return None;
        }

        let id = self.allocate_id();
        self.blocks.insert(
            0,
            ContentBlock {
                id,
                kind: BlockKind::Cover,
                html: cover_markup(header_html),
            },
        );
        self.rebuild_index();
        self.version += 1;
        Some(id)
    }

    /// Replace the markup of one block in place
    pub fn replace_html(&mut self, id: BlockId, html: impl Into<String>) -> Result<()> {
        let idx = *self.index.get(&id).ok_or(Error::UnknownBlock(id))?;
        self.blocks[idx].html = html.into();
        self.version += 1;
        Ok(())
    }

    /// Replace every block's markup from a fresh document-order snapshot.
    ///
    /// Returns true when the block count changed (ids are then reassigned
    /// past the old ones, keeping the first block's kind).
    pub fn reset(&mut self, htmls: Vec<String>) -> bool {
        self.version += 1;

        if htmls.len() == self.blocks.len() {
            for (block, html) in self.blocks.iter_mut().zip(htmls) {
                block.html = html;
            }
            return false;
        }

        let cover_first = self
            .blocks
            .first()
            .map(|b| b.kind == BlockKind::Cover)
            .unwrap_or(false);

        self.blocks.clear();
        for (idx, html) in htmls.into_iter().enumerate() {
            let id = self.allocate_id();
            let kind = if idx == 0 && cover_first {
                BlockKind::Cover
            } else {
                BlockKind::Body
            };
            self.blocks.push(ContentBlock { id, kind, html });
        }
        self.rebuild_index();
        true
    }

    pub fn block(&self, id: BlockId) -> Option<&ContentBlock> {
        self.index.get(&id).map(|&idx| &self.blocks[idx])
    }

    /// Block markup, or an empty string for unknown ids
    pub fn html(&self, id: BlockId) -> &str {
        self.block(id).map(|b| b.html.as_str()).unwrap_or("")
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|b| b.id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Bumped on every write
    pub fn version(&self) -> u64 {
        self.version
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, block) in self.blocks.iter().enumerate() {
            self.index.insert(block.id, idx);
        }
    }
}

/// Wrap header markup in the cover block element
pub fn cover_markup(header_html: &str) -> String {
    format!("<div class=\"book-cover-block\">{header_html}</div>")
}

/// Extract readable text from block markup.
///
/// Tags are dropped, block-level closing tags and `<br>` become newlines,
/// and the common named/numeric entities are decoded.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with('<') {
            let Some(end) = rest.find('>') else {
                // Unterminated tag, treat the remainder as text
                out.push_str(rest);
                return out;
            };
            let tag = rest[1..end].trim().to_ascii_lowercase();
            if tag.starts_with("br") || is_block_close(&tag) {
                out.push('\n');
            }
            rest = &rest[end + 1..];
        } else {
            match rest.find(';').filter(|&end| end <= 10) {
                Some(end) => match decode_entity(&rest[1..end]) {
                    Some(ch) => {
                        out.push(ch);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                },
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
        }
    }

    out.push_str(rest);
    out.trim_end_matches('\n').to_string()
}

fn is_block_close(tag: &str) -> bool {
    matches!(
        tag.trim_start_matches('/'),
        "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre"
    ) && tag.starts_with('/')
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
