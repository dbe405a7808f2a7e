use crate::app::Message;
use crate::scale::Tick;
use iced::mouse;
use iced::widget::canvas::{self, Geometry, Program};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

/// Tick labels above the plot area, aligned with the row canvas.
pub(crate) struct HeaderProgram {
    pub(crate) ticks: Vec<Tick>,
    pub(crate) left_width: f32,
}

impl Program<Message> for HeaderProgram {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::new(0.0, 0.0),
            Size::new(bounds.width, bounds.height),
            Color::from_rgb(0.95, 0.95, 0.95),
        );

        frame.fill_text(canvas::Text {
            content: "Event".to_string(),
            position: Point::new(6.0, 4.0),
            color: Color::from_rgb(0.3, 0.3, 0.3),
            size: 12.0.into(),
            ..Default::default()
        });

        let plot = Rectangle {
            x: self.left_width,
            y: 0.0,
            width: (bounds.width - self.left_width).max(0.0),
            height: bounds.height,
        };
        frame.with_clip(plot, |frame| {
            for tick in &self.ticks {
                // Inside the clip, coordinates are relative to the plot origin.
                let x = tick.x;
                frame.stroke(
                    &canvas::Path::line(
                        Point::new(x, bounds.height * 0.5),
                        Point::new(x, bounds.height),
                    ),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.45, 0.45, 0.45))
                        .with_width(1.0),
                );
                frame.fill_text(canvas::Text {
                    content: tick.label.clone(),
                    position: Point::new(x + 2.0, 2.0),
                    color: Color::from_rgb(0.2, 0.2, 0.2),
                    size: 11.0.into(),
                    ..Default::default()
                });
            }
        });

        frame.stroke(
            &canvas::Path::line(
                Point::new(self.left_width, 0.0),
                Point::new(self.left_width, bounds.height),
            ),
            canvas::Stroke::default()
                .with_color(Color::from_rgb(0.7, 0.7, 0.7))
                .with_width(1.0),
        );
        frame.stroke(
            &canvas::Path::line(
                Point::new(0.0, bounds.height - 0.5),
                Point::new(bounds.width, bounds.height - 0.5),
            ),
            canvas::Stroke::default()
                .with_color(Color::from_rgb(0.85, 0.85, 0.85))
                .with_width(1.0),
        );

        vec![frame.into_geometry()]
    }
}
