//! Vertical canvas scrollbar for the row viewport.
//!
//! The rows are drawn on a canvas rather than inside a `scrollable`, so the
//! scroll offset lives in [`crate::layout::Timeline`] and this widget only
//! reports the offset the user dragged to.

use iced::mouse;
use iced::widget::canvas::{self, Action, Canvas, Geometry, Program};
use iced::{Color, Element, Event, Length, Point, Rectangle, Renderer, Theme, Vector};
use std::sync::Arc;

pub const SCROLLBAR_WIDTH: f32 = 14.0;
const TRACK_THICKNESS: f32 = 6.0;
const TRACK_PADDING: f32 = 4.0;
const MIN_THUMB_LENGTH: f32 = 24.0;

pub fn vertical_scrollbar<'a, Message>(
    offset: f64,
    max_offset: f64,
    on_change: impl Fn(f64) -> Message + 'a,
) -> Scrollbar<'a, Message> {
    Scrollbar::new(offset, max_offset, on_change)
}

pub struct Scrollbar<'a, Message> {
    offset: f64,
    max_offset: f64,
    visible_fraction: f64,
    height: Length,
    on_change: Arc<dyn Fn(f64) -> Message + 'a>,
}

impl<'a, Message> Scrollbar<'a, Message> {
    pub fn new(offset: f64, max_offset: f64, on_change: impl Fn(f64) -> Message + 'a) -> Self {
        let max_offset = max_offset.max(0.0);
        Self {
            offset: offset.clamp(0.0, max_offset),
            max_offset,
            visible_fraction: 1.0,
            height: Length::Fill,
            on_change: Arc::new(on_change),
        }
    }

    /// Share of the content that fits in the viewport; sizes the thumb.
    pub fn visible_fraction(mut self, fraction: f64) -> Self {
        self.visible_fraction = if fraction.is_finite() {
            fraction.clamp(0.02, 1.0)
        } else {
            1.0
        };
        self
    }

    pub fn height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }
}

impl<'a, Message> From<Scrollbar<'a, Message>> for Element<'a, Message>
where
    Message: 'a,
{
    fn from(scrollbar: Scrollbar<'a, Message>) -> Self {
        let Scrollbar {
            offset,
            max_offset,
            visible_fraction,
            height,
            on_change,
        } = scrollbar;
        Canvas::new(ScrollbarProgram {
            offset,
            max_offset,
            visible_fraction,
            on_change,
        })
        .width(Length::Fixed(SCROLLBAR_WIDTH))
        .height(height)
        .into()
    }
}

#[derive(Default)]
struct ScrollbarState {
    dragging: bool,
    grab_offset: f64,
}

struct ScrollbarProgram<'a, Message> {
    offset: f64,
    max_offset: f64,
    visible_fraction: f64,
    on_change: Arc<dyn Fn(f64) -> Message + 'a>,
}

impl<Message> ScrollbarProgram<'_, Message> {
    fn track_length(&self, bounds: Rectangle) -> f64 {
        (bounds.height - TRACK_PADDING * 2.0).max(1.0) as f64
    }

    fn thumb_length(&self, bounds: Rectangle) -> f64 {
        let track = self.track_length(bounds);
        (track * self.visible_fraction)
            .max(MIN_THUMB_LENGTH as f64)
            .min(track)
    }

    fn thumb_bounds(&self, bounds: Rectangle) -> Rectangle {
        let available = (self.track_length(bounds) - self.thumb_length(bounds)).max(0.0);
        let fraction = if self.max_offset > 0.0 {
            (self.offset / self.max_offset).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Rectangle {
            x: (bounds.width - TRACK_THICKNESS) * 0.5,
            y: TRACK_PADDING + (available * fraction) as f32,
            width: TRACK_THICKNESS,
            height: self.thumb_length(bounds) as f32,
        }
    }

    /// Offset for a thumb whose top edge sits at `local_y`.
    fn offset_at(&self, bounds: Rectangle, local_y: f64) -> f64 {
        let available = (self.track_length(bounds) - self.thumb_length(bounds)).max(0.0);
        if available == 0.0 {
            return 0.0;
        }
        let y = (local_y - TRACK_PADDING as f64).clamp(0.0, available);
        y / available * self.max_offset
    }
}

impl<Message> Program<Message> for ScrollbarProgram<'_, Message> {
    type State = ScrollbarState;

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::new((bounds.width - TRACK_THICKNESS) * 0.5, TRACK_PADDING),
            iced::Size::new(TRACK_THICKNESS, (bounds.height - TRACK_PADDING * 2.0).max(1.0)),
            Color::from_rgb(0.92, 0.92, 0.92),
        );

        if self.max_offset > 0.0 {
            let thumb = self.thumb_bounds(bounds);
            let color = if state.dragging {
                Color::from_rgb(0.6, 0.6, 0.65)
            } else {
                Color::from_rgb(0.75, 0.75, 0.78)
            };
            frame.fill_rectangle(thumb.position(), thumb.size(), color);
            frame.stroke(
                &canvas::Path::rectangle(thumb.position(), thumb.size()),
                canvas::Stroke::default()
                    .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.2))
                    .with_width(1.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        if self.max_offset <= 0.0 {
            return None;
        }

        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                let thumb = self.thumb_bounds(bounds);
                state.dragging = true;
                if thumb.contains(position) {
                    state.grab_offset = (position.y - thumb.y) as f64;
                    return Some(Action::capture());
                }
                // Clicking the track centers the thumb under the cursor.
                state.grab_offset = self.thumb_length(bounds) * 0.5;
                let offset = self.offset_at(bounds, position.y as f64 - state.grab_offset);
                return Some(Action::publish((self.on_change)(offset)).and_capture());
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.dragging = false;
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) if state.dragging => {
                let local = *position - Vector::new(bounds.x, bounds.y);
                let offset = self.offset_at(bounds, local.y as f64 - state.grab_offset);
                return Some(Action::publish((self.on_change)(offset)).and_capture());
            }
            _ => {}
        }
        None
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.dragging {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(position) if self.thumb_bounds(bounds).contains(position) => {
                mouse::Interaction::Grab
            }
            _ => mouse::Interaction::default(),
        }
    }
}
