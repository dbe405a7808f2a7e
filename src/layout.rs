//! Timeline state and the per-render layout pass.
//!
//! [`Timeline`] owns the flattened tree together with everything that affects
//! layout (scroll offset, container width, label column width). Every input
//! is a synchronous method call; [`Timeline::frame`] turns the current state
//! into the rows and ticks the view draws.

use crate::config::TimelineConfig;
use crate::scale::{LinearScale, Tick};
use crate::throttle::ResizeListener;
use crate::tree::{self, EventSpec, FlatTree, HexColor, NodeIndex};
use crate::window::Window;
use std::time::Instant;

pub const DEFAULT_LEFT_WIDTH: f32 = 150.0;
pub const DEFAULT_WIDTH: f32 = 800.0;
/// Neither the label column nor the plot may be dragged narrower than this.
pub const MIN_PANEL_WIDTH: f32 = 40.0;
pub const TICK_COUNT: usize = 8;

/// Geometry and payload of one materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub index: NodeIndex,
    pub visual_row: usize,
    pub id: String,
    pub level: u32,
    pub start: f64,
    pub end: f64,
    /// Left edge of the bar inside the plot area.
    pub x: f32,
    pub width: f32,
    pub text: Option<String>,
    pub value: Option<f64>,
    pub color: Option<HexColor>,
    pub is_collapsed: bool,
    pub is_parent_collapsed: bool,
    pub has_children: bool,
    pub visible_children: usize,
    pub hidden_children: usize,
}

impl RowGeometry {
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.id)
    }
}

/// Output of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub width: f32,
    pub left_width: f32,
    pub plot_width: f32,
    pub row_height: f32,
    pub viewport_height: f32,
    pub scroll_offset: f32,
    /// Total scrollable height, one row per flattened node.
    pub content_height: f32,
    pub start_index: usize,
    /// Translation applied to the whole block of rows.
    pub offset: f32,
    pub ticks: Vec<Tick>,
    pub rows: Vec<RowGeometry>,
    pub selected: Option<String>,
    pub dragging_divider: bool,
}

impl TimelineFrame {
    /// Top of `row` in content coordinates.
    pub fn row_top(&self, row: &RowGeometry) -> f32 {
        self.offset + (row.visual_row as f32 - self.start_index as f32) * self.row_height
    }

    /// The row under content-space `y`.
    pub fn row_at(&self, y: f32) -> Option<&RowGeometry> {
        self.rows.iter().find(|row| {
            let top = self.row_top(row);
            y >= top && y < top + self.row_height
        })
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

#[derive(Debug)]
pub struct Timeline {
    config: TimelineConfig,
    tree: FlatTree,
    scroll_offset: f32,
    left_width: f32,
    width: f32,
    dragging_divider: bool,
    selected: Option<String>,
    resize_listener: Option<ResizeListener>,
    measure_generation: u64,
}

impl Timeline {
    pub fn new(config: TimelineConfig, roots: &[EventSpec]) -> Self {
        let tree = tree::flatten(roots, config.domain());
        Self {
            config,
            tree,
            scroll_offset: 0.0,
            left_width: DEFAULT_LEFT_WIDTH,
            width: DEFAULT_WIDTH,
            dragging_divider: false,
            selected: None,
            resize_listener: None,
            measure_generation: 0,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn tree(&self) -> &FlatTree {
        &self.tree
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn left_width(&self) -> f32 {
        self.left_width
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Bumped every time the container width should be measured again.
    pub fn measure_generation(&self) -> u64 {
        self.measure_generation
    }

    pub fn is_mounted(&self) -> bool {
        self.resize_listener.is_some()
    }

    /// Start listening for resizes and ask for an initial measurement.
    pub fn mount(&mut self) {
        if self.resize_listener.is_none() {
            self.resize_listener = Some(ResizeListener::acquire(self.config.resize_throttle));
        }
        self.measure_generation += 1;
    }

    pub fn unmount(&mut self) {
        self.resize_listener = None;
    }

    /// Handle a window resize notification. Returns `true` if it was not
    /// throttled away and a remeasure was requested.
    pub fn window_resized(&mut self, now: Instant) -> bool {
        let Some(listener) = self.resize_listener.as_mut() else {
            return false;
        };
        if !listener.notify(now) {
            return false;
        }
        self.measure_generation += 1;
        true
    }

    /// Record the measured container width.
    pub fn measure(&mut self, width: f32) -> bool {
        if !width.is_finite() || width < 0.0 || width == self.width {
            return false;
        }
        log::debug!("timeline width {} -> {}", self.width, width);
        self.width = width;
        true
    }

    /// Replace the input hierarchy.
    pub fn set_data(&mut self, roots: &[EventSpec]) {
        let retained = self
            .config
            .retain_collapse
            .then(|| self.tree.collapsed_ids());

        self.tree = tree::flatten(roots, self.config.domain());
        if let Some(ids) = retained {
            self.tree.restore_collapsed(&ids);
        }
        if self
            .selected
            .as_deref()
            .is_some_and(|id| self.tree.index_of(id).is_none())
        {
            self.selected = None;
        }
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        log::info!("timeline data replaced, {} rows", self.tree.len());
    }

    pub fn content_height(&self) -> f32 {
        self.config.event_height * self.tree.len() as f32
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height() - self.config.height).max(0.0)
    }

    pub fn scroll_to(&mut self, offset: f32) {
        if offset.is_finite() {
            self.scroll_offset = offset.clamp(0.0, self.max_scroll());
        }
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll_offset + delta);
    }

    pub fn begin_divider_drag(&mut self) {
        self.dragging_divider = true;
    }

    /// Move the divider to `x`, measured from the container's left edge.
    pub fn drag_divider(&mut self, x: f32) {
        if !self.dragging_divider || !x.is_finite() {
            return;
        }
        let max = (self.width - MIN_PANEL_WIDTH).max(MIN_PANEL_WIDTH);
        self.left_width = x.clamp(MIN_PANEL_WIDTH, max);
    }

    pub fn end_divider_drag(&mut self) {
        self.dragging_divider = false;
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.tree.toggle(id)
    }

    pub fn collapse_all(&mut self) {
        self.tree.collapse_all();
    }

    pub fn expand_all(&mut self) {
        self.tree.expand_all();
    }

    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.tree.index_of(id).is_some())
            .map(str::to_owned);
    }

    /// The domain being displayed, if there is one.
    pub fn domain(&self) -> Option<(f64, f64)> {
        let lo = self.config.start.or(self.tree.lo())?;
        let hi = self.config.end.or(self.tree.hi())?;
        Some((lo, hi))
    }

    pub fn plot_width(&self) -> f32 {
        (self.width - self.left_width).max(0.0)
    }

    /// Scale from the domain onto the plot area, `None` without data.
    pub fn scale(&self) -> Option<LinearScale> {
        self.domain()
            .map(|domain| LinearScale::new(domain, (0.0, self.plot_width() as f64)))
    }

    pub fn frame(&self) -> TimelineFrame {
        let row_height = self.config.event_height;
        let scale = self.scale();
        let window = Window::compute(
            &self.tree,
            self.scroll_offset,
            row_height,
            self.config.height,
        );

        let ticks = scale
            .map(|scale| scale.ticks_with(TICK_COUNT, &self.config.tick_format))
            .unwrap_or_default();

        let rows = window
            .rows
            .iter()
            .filter_map(|row| {
                let node = self.tree.get(row.index)?;
                let (x, width) = match scale {
                    Some(scale) => {
                        let x = scale.map(node.start());
                        (x as f32, (scale.map(node.end()) - x).max(0.0) as f32)
                    }
                    None => (0.0, 0.0),
                };
                Some(RowGeometry {
                    index: row.index,
                    visual_row: row.visual_row,
                    id: node.id().to_owned(),
                    level: node.level(),
                    start: node.start(),
                    end: node.end(),
                    x,
                    width,
                    text: node.text().map(str::to_owned),
                    value: node.value(),
                    color: node.color(),
                    is_collapsed: node.is_collapsed(),
                    is_parent_collapsed: node.is_parent_collapsed(),
                    has_children: node.has_children(),
                    visible_children: node.visible_children(),
                    hidden_children: node.hidden_children(),
                })
            })
            .collect();

        TimelineFrame {
            width: self.width,
            left_width: self.left_width,
            plot_width: self.plot_width(),
            row_height,
            viewport_height: self.config.height,
            scroll_offset: self.scroll_offset,
            content_height: self.content_height(),
            start_index: window.start_index,
            offset: window.start_index as f32 * row_height,
            ticks,
            rows,
            selected: self.selected.clone(),
            dragging_divider: self.dragging_divider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use std::time::Duration;

    fn rows(count: usize) -> Vec<EventSpec> {
        (0..count)
            .map(|i| EventSpec::new(format!("e{i}"), i as f64, i as f64 + 10.0))
            .collect()
    }

    #[test]
    fn frame_of_empty_timeline() {
        let timeline = Timeline::new(TimelineConfig::default(), &[]);
        let frame = timeline.frame();
        assert!(frame.rows.is_empty());
        assert!(frame.ticks.is_empty());
        assert_eq!(frame.content_height, 0.0);
        assert_eq!(frame.max_scroll(), 0.0);
        assert!(timeline.scale().is_none());
    }

    #[test]
    fn rows_are_positioned_by_scale() {
        let roots = [EventSpec::new("a", 0.0, 100.0).child(EventSpec::new("b", 10.0, 50.0))];
        let timeline = Timeline::new(TimelineConfig::default(), &roots);
        let frame = timeline.frame();
        assert_eq!(frame.plot_width, 650.0);
        assert_eq!(frame.rows.len(), 2);
        let b = &frame.rows[1];
        assert_eq!(b.x, 65.0);
        assert_eq!(b.width, 260.0);
        assert_eq!(b.level, 1);
        assert_eq!(frame.row_top(b), 20.0);
        assert_eq!(frame.row_at(25.0).map(|row| row.id.as_str()), Some("b"));
        assert_eq!(frame.ticks.first().map(|t| t.label.as_str()), Some("0ms"));
    }

    #[test]
    fn domain_override_applies_to_scale() {
        let mut config = TimelineConfig::default();
        config.apply(&ConfigOverrides {
            start: Some(50.0),
            end: Some(150.0),
            ..Default::default()
        });
        let timeline = Timeline::new(config, &rows(3));
        assert_eq!(timeline.domain(), Some((50.0, 150.0)));
    }

    #[test]
    fn scrolling_moves_window_and_clamps() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(1000));
        assert_eq!(timeline.content_height(), 20_000.0);

        timeline.scroll_to(500.0);
        let frame = timeline.frame();
        assert_eq!(frame.start_index, 24);
        assert_eq!(frame.offset, 480.0);
        assert_eq!(frame.rows.first().map(|row| row.index), Some(20));

        timeline.scroll_by(1e9);
        assert_eq!(timeline.scroll_offset(), 19_200.0);
        timeline.scroll_to(-5.0);
        assert_eq!(timeline.scroll_offset(), 0.0);
    }

    #[test]
    fn divider_only_moves_while_dragging() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(3));
        timeline.drag_divider(300.0);
        assert_eq!(timeline.left_width(), DEFAULT_LEFT_WIDTH);

        timeline.begin_divider_drag();
        timeline.drag_divider(300.0);
        assert_eq!(timeline.left_width(), 300.0);
        timeline.drag_divider(10_000.0);
        assert_eq!(timeline.left_width(), DEFAULT_WIDTH - MIN_PANEL_WIDTH);
        timeline.end_divider_drag();
        timeline.drag_divider(200.0);
        assert_eq!(timeline.left_width(), DEFAULT_WIDTH - MIN_PANEL_WIDTH);
    }

    #[test]
    fn resize_during_drag_updates_both() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(3));
        timeline.begin_divider_drag();
        timeline.drag_divider(200.0);
        assert!(timeline.measure(1200.0));
        timeline.drag_divider(220.0);
        let frame = timeline.frame();
        assert_eq!(frame.left_width, 220.0);
        assert_eq!(frame.plot_width, 980.0);
    }

    #[test]
    fn resize_is_throttled_only_while_mounted() {
        let start = Instant::now();
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(3));
        assert!(!timeline.window_resized(start));

        timeline.mount();
        let generation = timeline.measure_generation();
        assert!(timeline.window_resized(start));
        assert!(!timeline.window_resized(start + Duration::from_millis(20)));
        assert!(timeline.window_resized(start + Duration::from_millis(70)));
        assert_eq!(timeline.measure_generation(), generation + 2);

        timeline.unmount();
        assert!(!timeline.is_mounted());
        assert!(!timeline.window_resized(start + Duration::from_secs(1)));
    }

    #[test]
    fn measure_ignores_unchanged_and_invalid_widths() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(3));
        assert!(!timeline.measure(DEFAULT_WIDTH));
        assert!(!timeline.measure(f32::NAN));
        assert!(timeline.measure(640.0));
        assert_eq!(timeline.plot_width(), 490.0);
    }

    #[test]
    fn set_data_resets_collapse_by_default() {
        let roots = [EventSpec::new("a", 0.0, 1.0).child(EventSpec::new("b", 0.0, 1.0))];
        let mut timeline = Timeline::new(TimelineConfig::default(), &roots);
        timeline.toggle("a");
        timeline.select(Some("b"));
        timeline.set_data(&roots);
        assert_eq!(timeline.tree().find("a").map(|n| n.is_collapsed()), Some(false));
        assert_eq!(timeline.selected(), Some("b"));

        timeline.set_data(&rows(2));
        assert_eq!(timeline.selected(), None);
    }

    #[test]
    fn set_data_can_retain_collapse() {
        let roots = [EventSpec::new("a", 0.0, 1.0).child(EventSpec::new("b", 0.0, 1.0))];
        let config = TimelineConfig {
            retain_collapse: true,
            ..TimelineConfig::default()
        };
        let mut timeline = Timeline::new(config, &roots);
        timeline.toggle("a");
        timeline.set_data(&roots);
        assert_eq!(timeline.tree().find("b").map(|n| n.is_parent_collapsed()), Some(true));
    }

    #[test]
    fn set_data_clamps_scroll() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(1000));
        timeline.scroll_to(10_000.0);
        timeline.set_data(&rows(50));
        assert_eq!(timeline.scroll_offset(), 200.0);
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut timeline = Timeline::new(TimelineConfig::default(), &rows(3));
        timeline.select(Some("nope"));
        assert_eq!(timeline.selected(), None);
        timeline.select(Some("e1"));
        assert_eq!(timeline.selected(), Some("e1"));
        timeline.select(None);
        assert_eq!(timeline.selected(), None);
    }

    #[test]
    fn tiny_row_height_still_lays_out() {
        let config = TimelineConfig {
            event_height: 1e-30,
            ..TimelineConfig::default()
        };
        let timeline = Timeline::new(config, &rows(5));
        let frame = timeline.frame();
        assert_eq!(frame.rows.len(), 5);
        assert_eq!(frame.max_scroll(), 0.0);
    }
}
