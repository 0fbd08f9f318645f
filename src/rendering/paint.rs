//! Paint commands produced from a layout

use super::layout::{ElementType, LayoutNode};
use super::GLYPH_ADVANCE;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: [u8; 4],
    },
    /// Monospaced text; `\n` starts a new line
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        /// Columns after which glyphs are clipped
        max_columns: usize,
    },
}

pub const TITLE_BACKGROUND: [u8; 4] = [230, 230, 230, 255];

/// Turn layout nodes into paint commands, back to front.
pub fn build_display_list(nodes: &[LayoutNode]) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(nodes.len() * 2);
    for node in nodes {
        let rect = &node.lb.rect;
        if node.elem_type == ElementType::Title {
            commands.push(PaintCommand::SolidRect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                rgba: TITLE_BACKGROUND,
            });
        }
        let padding = node.lb.box_model.padding as i32;
        let scale = node.scale.max(1);
        commands.push(PaintCommand::Text {
            x: rect.x + padding,
            y: rect.y + padding,
            text: node.text.clone(),
            scale,
            max_columns: (node.lb.content_width() / (GLYPH_ADVANCE * scale)) as usize,
        });
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::layout::layout_document;
    use crate::Viewport;
    use scraper::Html;

    #[test]
    fn title_gets_background_before_text() {
        let doc = Html::parse_document("<h1>Hi</h1><p>there</p>");
        let nodes = layout_document(&doc, Viewport { width: 200, height: 100 });
        let cmds = build_display_list(&nodes);
        assert_eq!(cmds.len(), 3);
        assert!(matches!(cmds[0], PaintCommand::SolidRect { rgba, .. } if rgba == TITLE_BACKGROUND));
        match &cmds[1] {
            PaintCommand::Text { text, scale, .. } => {
                assert_eq!(text, "Hi");
                assert_eq!(*scale, 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(matches!(&cmds[2], PaintCommand::Text { scale: 1, .. }));
    }
}
