//! Viewport windowing: which flattened rows must be materialized for the
//! current scroll position.

use crate::tree::{FlatTree, NodeIndex};

/// Extra rows kept on each side of the display range.
pub const WINDOW_PADDING: usize = 4;

/// First display row for a scroll offset, one row early to cover partial rows.
pub fn start_index(scroll_offset: f32, row_height: f32) -> usize {
    if row_height <= 0.0 || !scroll_offset.is_finite() {
        return 0;
    }
    ((scroll_offset.max(0.0) / row_height).floor() as usize).saturating_sub(1)
}

/// Rows needed to fill the viewport plus two for partially visible rows.
pub fn display_count(viewport_height: f32, row_height: f32) -> usize {
    if row_height <= 0.0 || !viewport_height.is_finite() {
        return 0;
    }
    ((viewport_height.max(0.0) / row_height).ceil() as usize).saturating_add(2)
}

/// A row selected for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRow {
    pub index: NodeIndex,
    /// Position among rows not hidden by a collapsed ancestor.
    pub visual_row: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
    pub rows: Vec<WindowRow>,
}

impl Window {
    pub fn compute(
        tree: &FlatTree,
        scroll_offset: f32,
        row_height: f32,
        viewport_height: f32,
    ) -> Self {
        let start_index = start_index(scroll_offset, row_height);
        let end_index = start_index.saturating_add(display_count(viewport_height, row_height));
        let len = tree.len();
        if len == 0 || row_height <= 0.0 {
            return Window {
                start_index,
                end_index,
                rows: Vec::new(),
            };
        }

        // Collapsed rows take no height, so every hidden row pushes the
        // sequence range one index further down.
        let mut rows = Vec::new();
        let mut hidden = 0;
        for (index, node) in tree.nodes().iter().enumerate() {
            if node.is_parent_collapsed() {
                hidden += 1;
                continue;
            }
            let first = start_index.saturating_add(hidden).saturating_sub(WINDOW_PADDING);
            let last = end_index
                .saturating_add(hidden)
                .saturating_add(WINDOW_PADDING)
                .min(len - 1);
            if index > last {
                break;
            }
            if first <= index {
                rows.push(WindowRow {
                    index,
                    visual_row: index - hidden,
                });
            }
        }

        Window {
            start_index,
            end_index,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{flatten, DomainOverride, EventSpec};

    fn chain(len: usize) -> Vec<EventSpec> {
        (0..len)
            .map(|i| EventSpec::new(format!("n{i}"), i as f64, i as f64 + 1.0))
            .collect()
    }

    #[test]
    fn window_bounds_for_default_geometry() {
        assert_eq!(start_index(0.0, 20.0), 0);
        assert_eq!(display_count(800.0, 20.0), 42);
        assert_eq!(start_index(500.0, 20.0), 24);
        assert_eq!(start_index(19.0, 20.0), 0);
        assert_eq!(start_index(40.0, 20.0), 1);
    }

    #[test]
    fn zero_row_height_is_empty() {
        let tree = flatten(&chain(10), DomainOverride::default());
        let window = Window::compute(&tree, 0.0, 0.0, 800.0);
        assert!(window.rows.is_empty());
        assert_eq!(display_count(800.0, 0.0), 0);
    }

    #[test]
    fn empty_tree_is_empty() {
        let tree = flatten(&[], DomainOverride::default());
        assert_eq!(Window::compute(&tree, 100.0, 20.0, 800.0).rows, vec![]);
    }

    #[test]
    fn pads_around_display_range() {
        let tree = flatten(&chain(1000), DomainOverride::default());
        let window = Window::compute(&tree, 500.0, 20.0, 800.0);
        assert_eq!(window.start_index, 24);
        assert_eq!(window.end_index, 66);
        let first = window.rows.first().map(|row| row.index);
        let last = window.rows.last().map(|row| row.index);
        assert_eq!(first, Some(20));
        assert_eq!(last, Some(70));
        assert_eq!(window.rows.len(), 51);
    }

    #[test]
    fn clamps_to_sequence_end() {
        let tree = flatten(&chain(10), DomainOverride::default());
        let window = Window::compute(&tree, 0.0, 20.0, 800.0);
        assert_eq!(window.rows.len(), 10);
        assert_eq!(window.rows.last().map(|row| row.index), Some(9));
    }

    #[test]
    fn skips_collapsed_rows_and_shifts_range() {
        let mut roots = chain(100);
        roots[0] = EventSpec::new("big", 0.0, 1.0).collapsed(true);
        for i in 0..30 {
            roots[0].children.push(EventSpec::new(format!("c{i}"), 0.0, 1.0));
        }
        let tree = flatten(&roots, DomainOverride::default());
        assert_eq!(tree.len(), 130);

        let window = Window::compute(&tree, 0.0, 20.0, 100.0);
        // display rows 0..=11 (7 + 4 padding): the collapsed root, then n1..n11
        let indices: Vec<usize> = window.rows.iter().map(|row| row.index).collect();
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.get(1), Some(&31));
        assert_eq!(window.rows.len(), 12);
        let visual: Vec<usize> = window.rows.iter().map(|row| row.visual_row).collect();
        assert_eq!(visual, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn tiny_row_height_saturates() {
        assert_eq!(display_count(800.0, 1e-30), usize::MAX);
        let tree = flatten(&chain(20), DomainOverride::default());
        let window = Window::compute(&tree, 0.0, 1e-30, 800.0);
        assert_eq!(window.end_index, usize::MAX);
        assert_eq!(window.rows.len(), 20);
    }

    #[test]
    fn collapsed_rows_shift_range_when_scrolled() {
        let mut roots = chain(100);
        roots[10] = EventSpec::new("big", 0.0, 1.0).collapsed(true);
        for i in 0..30 {
            roots[10].children.push(EventSpec::new(format!("c{i}"), 0.0, 1.0));
        }
        let tree = flatten(&roots, DomainOverride::default());

        // start 14, end 21: visual rows 10..=25, past the 30 hidden children
        let window = Window::compute(&tree, 300.0, 20.0, 100.0);
        assert_eq!((window.start_index, window.end_index), (14, 21));
        let visual: Vec<usize> = window.rows.iter().map(|row| row.visual_row).collect();
        assert_eq!(visual, (10..=25).collect::<Vec<_>>());
        assert_eq!(window.rows[0].index, 10);
        assert_eq!(window.rows[1].index, 41);
        assert_eq!(window.rows.last().map(|row| row.index), Some(55));
    }
}
