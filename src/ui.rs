use iced::widget::{button, text, Button};
use iced::Theme;

pub fn neutral_button_style(theme: &Theme, status: button::Status) -> button::Style {
    let palette = theme.extended_palette();
    let base = button::Style {
        text_color: palette.background.weak.text,
        ..Default::default()
    };
    match status {
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(palette.background.strong.color.into()),
            ..base
        },
        _ => base,
    }
}

/// Flat toolbar button that sends `message` when pressed.
pub fn toolbar_button<'a, Message: Clone + 'a>(label: &'a str, message: Message) -> Button<'a, Message> {
    button(text(label).size(14))
        .style(neutral_button_style)
        .padding([4, 10])
        .on_press(message)
}
