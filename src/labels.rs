// labels.rs

use log::warn;

// Rough glyph metrics for a sans-serif face, as fractions of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;
const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Fixed text scale and justification shared by every label on a chart.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LabelStyle {
    pub(crate) font_size: f64,
    /// Horizontal gap in pixels between a point and the left edge of its label.
    pub(crate) offset_px: i32,
    pub(crate) max_bump_steps: usize,
    /// Smallest screen y a label box may start at.
    pub(crate) top_px: i32,
}

/// Pixel box of a placed label; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LabelBox {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl LabelBox {
    fn intersects(&self, other: &LabelBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

pub(crate) fn text_extent(text: &str, font_size: f64) -> (i32, i32) {
    let width = (text.chars().count() as f64 * font_size * CHAR_WIDTH_RATIO).ceil() as i32;
    let height = (font_size * LINE_HEIGHT_RATIO).ceil() as i32;
    (width, height)
}

/// Places one label per anchor, left-justified to the right of its point.
///
/// Labels are visited from the bottom of the canvas upward (ties in input
/// order). A label that overlaps one already placed is bumped to sit just
/// above the topmost box it hits, repeatedly, until it is clear or the bump
/// budget runs out. A label pushed above `top_px` is pinned there, overlap
/// or not. The result is indexed like `anchors`.
pub(crate) fn layout_labels(anchors: &[(i32, i32)], texts: &[&str], style: &LabelStyle) -> Vec<LabelBox> {
    debug_assert_eq!(anchors.len(), texts.len());

    let mut order: Vec<usize> = (0..anchors.len()).collect();
    order.sort_by_key(|&idx| std::cmp::Reverse(anchors[idx].1));

    let mut placed: Vec<Option<LabelBox>> = vec![None; anchors.len()];
    let mut settled: Vec<LabelBox> = Vec::with_capacity(anchors.len());

    for idx in order {
        let (ax, ay) = anchors[idx];
        let (width, height) = text_extent(texts[idx], style.font_size);
        let mut candidate = LabelBox {
            x: ax + style.offset_px,
            y: ay - height / 2,
            width,
            height,
        };

        let mut steps = 0;
        while let Some(blocker) = settled
            .iter()
            .filter(|other| other.intersects(&candidate))
            .min_by_key(|other| other.y)
        {
            if steps == style.max_bump_steps {
                warn!(
                    "Label '{}' still overlaps after {} bump(s); leaving it in place.",
                    texts[idx], steps
                );
                break;
            }
            candidate.y = blocker.y - candidate.height;
            steps += 1;
        }
        if candidate.y < style.top_px {
            warn!(
                "Label '{}' would leave the canvas; pinning it to the top edge.",
                texts[idx]
            );
            candidate.y = style.top_px;
        }

        settled.push(candidate);
        placed[idx] = Some(candidate);
    }

    placed.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> LabelStyle {
        LabelStyle {
            font_size: 10.0,
            offset_px: 4,
            max_bump_steps: 50,
            top_px: 0,
        }
    }

    #[test]
    fn isolated_label_sits_right_of_its_point() {
        let boxes = layout_labels(&[(100, 200)], &["HG001"], &style());
        let (width, height) = text_extent("HG001", 10.0);
        assert_eq!(
            boxes,
            vec![LabelBox {
                x: 104,
                y: 200 - height / 2,
                width,
                height,
            }]
        );
    }

    #[test]
    fn overlapping_label_is_bumped_up() {
        let anchors = [(100, 200), (102, 201)];
        let boxes = layout_labels(&anchors, &["lower", "upper"], &style());
        // The lower anchor (larger screen y) is placed first and keeps its spot.
        assert_eq!(boxes[1].y, 201 - boxes[1].height / 2);
        assert_eq!(boxes[0].y, boxes[1].y - boxes[0].height);
        assert!(!boxes[0].intersects(&boxes[1]));
    }

    #[test]
    fn stacked_points_produce_disjoint_labels() {
        let anchors: Vec<(i32, i32)> = (0..8).map(|i| (50, 300 + i)).collect();
        let texts = vec!["sample"; anchors.len()];
        let boxes = layout_labels(&anchors, &texts, &style());
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn distant_labels_are_not_moved() {
        let anchors = [(10, 10), (300, 300)];
        let boxes = layout_labels(&anchors, &["a", "b"], &style());
        let (_, height) = text_extent("a", 10.0);
        assert_eq!(boxes[0].y, 10 - height / 2);
        assert_eq!(boxes[1].y, 300 - height / 2);
    }

    #[test]
    fn layout_is_deterministic() {
        let anchors = [(5, 5), (6, 6), (7, 5), (5, 7)];
        let texts = ["w", "x", "y", "z"];
        let first = layout_labels(&anchors, &texts, &style());
        let second = layout_labels(&anchors, &texts, &style());
        assert_eq!(first, second);
    }

    #[test]
    fn bump_budget_is_respected() {
        let tight = LabelStyle {
            max_bump_steps: 0,
            ..style()
        };
        let boxes = layout_labels(&[(0, 0), (0, 0)], &["a", "a"], &tight);
        assert_eq!(boxes[0], boxes[1]);
    }

    #[test]
    fn labels_stay_below_top_edge() {
        let anchors: Vec<(i32, i32)> = (0..6).map(|i| (40, 8 + i)).collect();
        let texts = vec!["sample"; anchors.len()];
        let boxes = layout_labels(&anchors, &texts, &style());
        assert!(boxes.iter().all(|b| b.y >= 0));
        // The lowest anchor is placed first and is not moved.
        assert_eq!(boxes[5].y, 13 - boxes[5].height / 2);
    }
}
