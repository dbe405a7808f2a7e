use crate::app::Message;
use crate::layout::{RowGeometry, TimelineFrame};
use iced::mouse;
use iced::widget::canvas::{self, Action, Geometry, Program};
use iced::{window, Color, Event, Point, Rectangle, Renderer, Size, Theme};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::bar_color;

const INDENT: f32 = 12.0;
const LABEL_PADDING: f32 = 6.0;
const ICON_WIDTH: f32 = 14.0;
/// Approximate advance of one terminal column at the label font size.
const COLUMN_WIDTH: f32 = 7.0;
const DIVIDER_GRAB: f32 = 4.0;
const WHEEL_LINE_ROWS: f32 = 3.0;

/// The windowed rows: label column on the left, bars on the right.
pub(crate) struct RowsProgram {
    pub(crate) frame: TimelineFrame,
    pub(crate) measure_generation: u64,
}

#[derive(Default)]
pub(crate) struct RowsState {
    measured: Option<u64>,
    hovered: Option<usize>,
}

impl RowsProgram {
    /// Screen-space top of `row` inside the canvas.
    fn row_y(&self, row: &RowGeometry) -> f32 {
        self.frame.row_top(row) - self.frame.scroll_offset
    }

    fn row_at(&self, position: Point) -> Option<&RowGeometry> {
        self.frame.row_at(position.y + self.frame.scroll_offset)
    }

    fn near_divider(&self, position: Point) -> bool {
        (position.x - self.frame.left_width).abs() <= DIVIDER_GRAB
    }

    fn bar_bounds(&self, row: &RowGeometry) -> Rectangle {
        Rectangle {
            x: self.frame.left_width + row.x,
            y: self.row_y(row) + 1.0,
            width: row.width.max(1.0),
            height: (self.frame.row_height - 2.0).max(1.0),
        }
    }

    fn draw_label(&self, frame: &mut canvas::Frame, row: &RowGeometry, y: f32) {
        let indent = LABEL_PADDING + row.level as f32 * INDENT;
        let text_size = (self.frame.row_height * 0.6).clamp(8.0, 13.0);

        if row.has_children {
            let icon = if row.is_collapsed { "▶" } else { "▼" };
            frame.fill_text(canvas::Text {
                content: icon.to_string(),
                position: Point::new(indent, y + 2.0),
                color: Color::from_rgb(0.4, 0.4, 0.4),
                size: (text_size - 2.0).into(),
                ..Default::default()
            });
        }

        let label = row_label(row);
        let available = self.frame.left_width - indent - ICON_WIDTH - LABEL_PADDING;
        let columns = (available / COLUMN_WIDTH).max(0.0) as usize;

        frame.fill_text(canvas::Text {
            content: truncate_to_width(&label, columns),
            position: Point::new(indent + ICON_WIDTH, y + 2.0),
            color: Color::from_rgb(0.15, 0.15, 0.15),
            size: text_size.into(),
            ..Default::default()
        });
    }

    fn draw_bar(&self, frame: &mut canvas::Frame, row: &RowGeometry, y: f32) {
        let rect = Rectangle {
            x: row.x,
            y: y + 1.0,
            width: row.width.max(1.0),
            height: (self.frame.row_height - 2.0).max(1.0),
        };
        frame.fill_rectangle(rect.position(), rect.size(), bar_color(row));
        frame.stroke(
            &canvas::Path::rectangle(rect.position(), rect.size()),
            canvas::Stroke::default()
                .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.2))
                .with_width(1.0),
        );

        if rect.width > 20.0 {
            let columns = ((rect.width - 4.0) / COLUMN_WIDTH).max(0.0) as usize;
            frame.fill_text(canvas::Text {
                content: truncate_to_width(row.label(), columns),
                position: Point::new(rect.x + 3.0, rect.y + 1.0),
                color: Color::from_rgb(0.2, 0.2, 0.2),
                size: (self.frame.row_height * 0.55).clamp(8.0, 12.0).into(),
                ..Default::default()
            });
        }
    }
}

/// Cut `text` to at most `columns` display columns, marking the cut with `…`.
pub(crate) fn truncate_to_width(text: &str, columns: usize) -> String {
    if text.width() <= columns {
        return text.to_string();
    }
    if columns == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > columns {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

impl Program<Message> for RowsProgram {
    type State = RowsState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let left_width = self.frame.left_width.min(bounds.width);
        let row_height = self.frame.row_height;

        frame.fill_rectangle(
            Point::ORIGIN,
            Size::new(left_width, bounds.height),
            Color::from_rgb(0.97, 0.97, 0.97),
        );

        let plot = Rectangle {
            x: left_width,
            y: 0.0,
            width: (bounds.width - left_width).max(0.0),
            height: bounds.height,
        };
        for tick in &self.frame.ticks {
            let x = left_width + tick.x;
            frame.stroke(
                &canvas::Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                canvas::Stroke::default()
                    .with_color(Color::from_rgba(0.5, 0.5, 0.5, 0.3))
                    .with_width(1.0),
            );
        }

        for row in &self.frame.rows {
            let y = self.row_y(row);
            if y + row_height < 0.0 || y > bounds.height {
                continue;
            }

            let selected = self.frame.selected.as_deref() == Some(row.id.as_str());
            let highlight = if selected {
                Some(Color::from_rgba(0.0, 0.4, 0.8, 0.15))
            } else if state.hovered == Some(row.index) {
                Some(Color::from_rgba(0.0, 0.0, 0.0, 0.05))
            } else {
                None
            };
            if let Some(color) = highlight {
                frame.fill_rectangle(Point::new(0.0, y), Size::new(bounds.width, row_height), color);
            }

            frame.with_clip(
                Rectangle {
                    x: 0.0,
                    y: 0.0,
                    width: left_width,
                    height: bounds.height,
                },
                |frame| self.draw_label(frame, row, y),
            );
            // Clip-local coordinates start at the plot's left edge.
            frame.with_clip(plot, |frame| self.draw_bar(frame, row, y));

            if selected {
                let bar = self.bar_bounds(row);
                frame.stroke(
                    &canvas::Path::rectangle(bar.position(), bar.size()),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.0, 0.4, 0.8))
                        .with_width(2.0),
                );
            }
        }

        let divider_color = if self.frame.dragging_divider {
            Color::from_rgb(0.0, 0.4, 0.8)
        } else {
            Color::from_rgb(0.7, 0.7, 0.7)
        };
        frame.stroke(
            &canvas::Path::line(
                Point::new(left_width, 0.0),
                Point::new(left_width, bounds.height),
            ),
            canvas::Stroke::default()
                .with_color(divider_color)
                .with_width(if self.frame.dragging_divider { 2.0 } else { 1.0 }),
        );

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            Event::Window(window::Event::RedrawRequested(_)) => {
                if state.measured != Some(self.measure_generation) {
                    state.measured = Some(self.measure_generation);
                    return Some(Action::publish(Message::Measured(bounds.width)));
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if self.frame.dragging_divider {
                    return Some(
                        Action::publish(Message::DividerMoved(position.x - bounds.x))
                            .and_capture(),
                    );
                }
                let hovered = cursor
                    .position_in(bounds)
                    .and_then(|p| self.row_at(p))
                    .map(|row| row.index);
                if hovered != state.hovered {
                    state.hovered = hovered;
                    return Some(Action::request_redraw());
                }
            }
            Event::Mouse(mouse::Event::CursorLeft) => {
                if state.hovered.take().is_some() {
                    return Some(Action::request_redraw());
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                if self.near_divider(position) {
                    return Some(Action::publish(Message::DividerPressed).and_capture());
                }
                let Some(row) = self.row_at(position) else {
                    return Some(Action::publish(Message::EventSelected(None)).and_capture());
                };
                let message = if position.x < self.frame.left_width && row.has_children {
                    Message::ToggleCollapse(row.id.clone())
                } else {
                    Message::EventSelected(Some(row.id.clone()))
                };
                return Some(Action::publish(message).and_capture());
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if self.frame.dragging_divider =>
            {
                return Some(Action::publish(Message::DividerReleased).and_capture());
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let dy = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => {
                        -y * WHEEL_LINE_ROWS * self.frame.row_height
                    }
                    mouse::ScrollDelta::Pixels { y, .. } => -y,
                };
                return Some(Action::publish(Message::Scrolled(dy)).and_capture());
            }
            _ => {}
        }
        None
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.frame.dragging_divider {
            return mouse::Interaction::ResizingHorizontally;
        }
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::default();
        };
        if self.near_divider(position) {
            return mouse::Interaction::ResizingHorizontally;
        }
        match self.row_at(position) {
            Some(row) if position.x < self.frame.left_width && row.has_children => {
                mouse::Interaction::Pointer
            }
            Some(row) if self.bar_bounds(row).contains(position) => mouse::Interaction::Pointer,
            _ => mouse::Interaction::default(),
        }
    }
}

/// Row label, suffixed with the hidden descendant count when collapsed.
fn row_label(row: &RowGeometry) -> String {
    if row.is_collapsed && row.hidden_children > 0 {
        format!("{} (+{})", row.label(), row.hidden_children)
    } else {
        row.label().to_string()
    }
}
