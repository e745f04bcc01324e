//! Alternating text/image layout
//!
//! Lays out content blocks in rows of two cells, text then image on even rows
//! and image then text on odd rows. The text cell spans 8 of 12 grid columns.

use serde::{Deserialize, Serialize};

/// Grid columns taken by the text cell
pub const TEXT_COLUMNS: u8 = 8;

/// Grid columns taken by the image cell
pub const IMAGE_COLUMNS: u8 = 4;

/// Content for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub title: String,
    pub text: String,
    /// Image path relative to the public URL
    pub image: String,
}

/// Which cell comes first in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    TextLeft,
    ImageLeft,
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Text {
        columns: u8,
        title: String,
        text: String,
    },
    Image {
        columns: u8,
        src: String,
        alt: String,
    },
}

/// A laid-out row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub key: usize,
    pub placement: Placement,
    pub cells: [Cell; 2],
}

/// Lay out blocks, alternating placement by position parity
pub fn alternate(blocks: &[ContentBlock], public_url: &str) -> Vec<LayoutRow> {
    let base = public_url.trim_end_matches('/');

    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let text = Cell::Text {
                columns: TEXT_COLUMNS,
                title: block.title.clone(),
                text: block.text.clone(),
            };
            let image = Cell::Image {
                columns: IMAGE_COLUMNS,
                src: format!("{}/{}", base, block.image.trim_start_matches('/')),
                alt: block.title.clone(),
            };

            if i % 2 == 0 {
                LayoutRow {
                    key: i,
                    placement: Placement::TextLeft,
                    cells: [text, image],
                }
            } else {
                LayoutRow {
                    key: i,
                    placement: Placement::ImageLeft,
                    cells: [image, text],
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(title: &str) -> ContentBlock {
        ContentBlock {
            title: title.to_string(),
            text: format!("About {title}"),
            image: format!("img/{title}.png"),
        }
    }

    #[test]
    fn test_alternates_by_parity() {
        let rows = alternate(&[block("a"), block("b"), block("c")], "");
        let placements: Vec<Placement> = rows.iter().map(|r| r.placement).collect();

        assert_eq!(
            placements,
            vec![Placement::TextLeft, Placement::ImageLeft, Placement::TextLeft]
        );
        assert!(matches!(rows[1].cells[0], Cell::Image { columns: 4, .. }));
        assert!(matches!(rows[1].cells[1], Cell::Text { columns: 8, .. }));
    }

    #[test]
    fn test_image_source_and_alt() {
        let rows = alternate(&[block("sleep")], "https://example.org/app/");

        assert_eq!(
            rows[0].cells[1],
            Cell::Image {
                columns: IMAGE_COLUMNS,
                src: "https://example.org/app/img/sleep.png".to_string(),
                alt: "sleep".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(alternate(&[], "/static").is_empty());
    }
}
