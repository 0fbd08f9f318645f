//! Block layout for the headless surface: a title box followed by paragraph
//! boxes, stacked vertically.

use super::GLYPH_ADVANCE;
use crate::Viewport;
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    pub fn content_width(&self) -> u32 {
        let total = self.box_model.margin + self.box_model.border + self.box_model.padding;
        self.rect.width.saturating_sub(total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Title,
    Paragraph,
}

/// A laid-out box with its (already wrapped) text.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub text: String,
    pub elem_type: ElementType,
    pub scale: u32,
}

fn select_all(document: &Html, css: &str) -> Vec<String> {
    match Selector::parse(css) {
        Ok(sel) => document
            .select(&sel)
            .map(|n| n.text().collect::<String>())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Greedy word wrap to `chars_per_line` columns.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if !cur.is_empty() && cur.chars().count() + word.chars().count() + 1 > chars_per_line {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Lay out `document` for `viewport`.
///
/// The title comes from the first `<h1>`, falling back to `<title>`, and is
/// drawn at twice the paragraph scale. Paragraphs stop once the viewport is
/// full.
pub fn layout_document(document: &Html, viewport: Viewport) -> Vec<LayoutNode> {
    let mut y = 8u32;
    let box_width = viewport.width.saturating_sub(16);
    let mut nodes = Vec::new();

    let title_text = select_all(document, "h1")
        .into_iter()
        .next()
        .or_else(|| select_all(document, "title").into_iter().next())
        .unwrap_or_default();

    if !title_text.trim().is_empty() {
        let padding = 8u32;
        let scale = 2u32;
        let box_h = GLYPH_ADVANCE * scale + padding * 2;
        let content_w = box_width.saturating_sub(padding * 2);
        let chars = (content_w / (GLYPH_ADVANCE * scale)) as usize;
        let text = wrap_text(title_text.trim(), chars)
            .into_iter()
            .next()
            .unwrap_or_default();
        nodes.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect {
                    x: 8,
                    y: y as i32,
                    width: box_width,
                    height: box_h,
                },
                box_model: BoxModel {
                    margin: 8,
                    border: 0,
                    padding,
                },
            },
            text,
            elem_type: ElementType::Title,
            scale,
        });
        y += box_h + 8;
    }

    for txt in select_all(document, "p") {
        if y >= viewport.height {
            break;
        }
        let padding = 6u32;
        let content_w = box_width.saturating_sub(padding * 2);
        let lines = wrap_text(&txt, (content_w / GLYPH_ADVANCE) as usize);
        if lines.is_empty() {
            continue;
        }
        let box_h = lines.len() as u32 * GLYPH_ADVANCE + padding * 2;
        nodes.push(LayoutNode {
            lb: LayoutBox {
                rect: Rect {
                    x: 8,
                    y: y as i32,
                    width: box_width,
                    height: box_h,
                },
                box_model: BoxModel {
                    margin: 6,
                    border: 0,
                    padding,
                },
            },
            text: lines.join("\n"),
            elem_type: ElementType::Paragraph,
            scale: 1,
        });
        y += box_h + 6;
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn layout_document_places_title_and_paragraphs() {
        let html = "<html><head><title>Test Title</title></head><body><h1>Heading</h1><p>Hello world</p><p>More text</p></body></html>";
        let doc = Html::parse_document(html);
        let nodes = layout_document(&doc, Viewport { width: 200, height: 200 });
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].elem_type, ElementType::Title);
        assert_eq!(nodes[0].text, "Heading");
        assert_eq!(nodes[1].elem_type, ElementType::Paragraph);
        assert!(nodes[1].lb.rect.y > nodes[0].lb.rect.y);
        assert!(nodes[1].lb.rect.width > 0);
    }

    #[test]
    fn title_falls_back_to_title_element() {
        let doc = Html::parse_document("<html><head><title>Only Title</title></head><body></body></html>");
        let nodes = layout_document(&doc, Viewport { width: 400, height: 100 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].text, "Only Title");
    }

    #[test]
    fn narrow_viewport_does_not_underflow() {
        let doc = Html::parse_document("<p>some words here</p>");
        let nodes = layout_document(&doc, Viewport { width: 4, height: 100 });
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].lb.rect.width, 0);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        assert_eq!(wrap_text("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert!(wrap_text("   ", 10).is_empty());
    }
}
