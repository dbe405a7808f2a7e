//! Drawing of the timeline: tick header, row canvas, scrollbar, and the
//! details panel for the selected event.

use crate::app::Message;
use crate::layout::{RowGeometry, Timeline};
use crate::scrollbar::{vertical_scrollbar, SCROLLBAR_WIDTH};
use crate::tree::HexColor;
use iced::widget::canvas::Canvas;
use iced::widget::{column, container, row, text, Space};
use iced::{Color, Element, Length};

mod header;
mod rows;

pub const HEADER_HEIGHT: f32 = 22.0;
pub const DETAILS_HEIGHT: f32 = 120.0;

/// Fallback bar color for events without an explicit one.
pub fn color_from_label(label: &str) -> Color {
    let mut hash = 0u64;
    for c in label.chars() {
        hash = hash.wrapping_add(c as u64);
        hash = hash.wrapping_mul(0x517cc1b727220a95);
    }

    let r = ((hash >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hash >> 8) & 0xFF) as f32 / 255.0;
    let b = (hash & 0xFF) as f32 / 255.0;

    Color::from_rgb(0.5 + r * 0.35, 0.5 + g * 0.35, 0.5 + b * 0.35)
}

pub(crate) fn bar_color(row: &RowGeometry) -> Color {
    match row.color {
        Some(HexColor([r, g, b])) => Color::from_rgb8(r, g, b),
        None => color_from_label(&row.id),
    }
}

pub fn view(timeline: &Timeline) -> Element<'_, Message> {
    if timeline.tree().is_empty() {
        return container(text("No events to display"))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let frame = timeline.frame();
    let viewport_height = frame.viewport_height;
    let visible_fraction = if frame.content_height > 0.0 {
        (viewport_height / frame.content_height) as f64
    } else {
        1.0
    };
    let scrollbar = vertical_scrollbar(
        frame.scroll_offset as f64,
        frame.max_scroll() as f64,
        |offset| Message::ScrollTo(offset as f32),
    )
    .visible_fraction(visible_fraction)
    .height(Length::Fixed(viewport_height));

    let header = Canvas::new(header::HeaderProgram {
        ticks: frame.ticks.clone(),
        left_width: frame.left_width,
    })
    .width(Length::Fill)
    .height(Length::Fixed(HEADER_HEIGHT));

    let body = Canvas::new(rows::RowsProgram {
        frame,
        measure_generation: timeline.measure_generation(),
    })
    .width(Length::Fill)
    .height(Length::Fixed(viewport_height));

    column![
        row![header, Space::new().width(Length::Fixed(SCROLLBAR_WIDTH))],
        row![body, scrollbar],
        details_panel(timeline),
    ]
    .into()
}

fn details_panel(timeline: &Timeline) -> Element<'_, Message> {
    let node = timeline.selected().and_then(|id| timeline.tree().find(id));
    let Some(node) = node else {
        return container(text("Select an event to see details"))
            .width(Length::Fill)
            .height(Length::Fixed(DETAILS_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    };

    let format = &timeline.config().tick_format;
    let mut details = column![
        text(node.text().unwrap_or(node.id()).to_owned()).size(20),
        text(format!("Id: {}", node.id())),
        text(format!(
            "Span: {} to {} ({})",
            format.format(node.start()),
            format.format(node.end()),
            format.format(node.end() - node.start()),
        )),
        text(format!(
            "Descendants: {} ({} hidden)",
            node.descendant_count(),
            node.hidden_children()
        )),
    ]
    .spacing(5)
    .padding(10);
    if let Some(value) = node.value() {
        details = details.push(text(format!("Value: {value}")));
    }

    container(details)
        .width(Length::Fill)
        .height(Length::Fixed(DETAILS_HEIGHT))
        .into()
}
