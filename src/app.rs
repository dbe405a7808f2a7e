//! The iced application wrapping a single [`Timeline`].

use crate::config::TimelineConfig;
use crate::data;
use crate::layout::Timeline;
use crate::tree::EventSpec;
use crate::ui::toolbar_button;
use iced::widget::{column, row, text, Space};
use iced::{Alignment, Element, Length, Subscription, Task};
use std::path::PathBuf;
use std::time::Instant;

pub fn run(config: TimelineConfig, path: Option<PathBuf>) -> iced::Result {
    iced::application(
        move || Treeline::new(config.clone(), path.clone()),
        Treeline::update,
        Treeline::view,
    )
    .title(Treeline::title)
    .subscription(Treeline::subscription)
    .run()
}

#[derive(Debug, Clone)]
pub enum Message {
    OpenFile,
    FileSelected(PathBuf),
    FileLoaded(PathBuf, Result<Vec<EventSpec>, String>),
    WindowResized,
    Measured(f32),
    Scrolled(f32),
    ScrollTo(f32),
    ToggleCollapse(String),
    EventSelected(Option<String>),
    DividerPressed,
    DividerMoved(f32),
    DividerReleased,
    CollapseAll,
    ExpandAll,
    None,
}

pub struct Treeline {
    timeline: Timeline,
    source: Option<PathBuf>,
    status: Option<String>,
}

fn load_task(path: PathBuf) -> Task<Message> {
    Task::perform(
        async move {
            let result = data::load(&path).map_err(|e| e.to_string());
            Message::FileLoaded(path, result)
        },
        |msg| msg,
    )
}

impl Treeline {
    fn new(config: TimelineConfig, path: Option<PathBuf>) -> (Self, Task<Message>) {
        let mut timeline = Timeline::new(config, &[]);
        timeline.mount();

        let task = path.map(load_task).unwrap_or_else(Task::none);
        (
            Treeline {
                timeline,
                source: None,
                status: None,
            },
            task,
        )
    }

    fn title(&self) -> String {
        match self.source.as_deref().and_then(|path| path.file_name()) {
            Some(name) => format!("Treeline - {}", name.to_string_lossy()),
            None => "Treeline".to_string(),
        }
    }

    /// `shown of total` row counts for the toolbar, `None` without data.
    fn row_summary(&self) -> Option<String> {
        let tree = self.timeline.tree();
        if tree.is_empty() {
            return None;
        }
        Some(format!("{} of {} rows shown", tree.visible_len(), tree.len()))
    }

    fn subscription(&self) -> Subscription<Message> {
        if !self.timeline.is_mounted() {
            return Subscription::none();
        }
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::Resized(_)) => Some(Message::WindowResized),
            _ => None,
        })
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .add_filter("Event hierarchy", &["json"])
                            .add_filter("measureme profdata", &["mm_profdata"])
                            .pick_file()
                            .await
                    },
                    |file_handle| match file_handle {
                        Some(handle) => Message::FileSelected(handle.path().to_path_buf()),
                        None => Message::None,
                    },
                );
            }
            Message::FileSelected(path) => {
                self.status = Some(format!("Loading {}", path.display()));
                return load_task(path);
            }
            Message::FileLoaded(path, Ok(roots)) => {
                self.timeline.set_data(&roots);
                self.source = Some(path);
                self.status = None;
            }
            Message::FileLoaded(path, Err(e)) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status = Some(e);
            }
            Message::WindowResized => {
                self.timeline.window_resized(Instant::now());
            }
            Message::Measured(width) => {
                self.timeline.measure(width);
            }
            Message::Scrolled(delta) => self.timeline.scroll_by(delta),
            Message::ScrollTo(offset) => self.timeline.scroll_to(offset),
            Message::ToggleCollapse(id) => {
                self.timeline.toggle(&id);
            }
            Message::EventSelected(id) => self.timeline.select(id.as_deref()),
            Message::DividerPressed => self.timeline.begin_divider_drag(),
            Message::DividerMoved(x) => self.timeline.drag_divider(x),
            Message::DividerReleased => self.timeline.end_divider_drag(),
            Message::CollapseAll => self.timeline.collapse_all(),
            Message::ExpandAll => self.timeline.expand_all(),
            Message::None => {}
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let mut toolbar = row![
            toolbar_button("Open", Message::OpenFile),
            toolbar_button("Collapse all", Message::CollapseAll),
            toolbar_button("Expand all", Message::ExpandAll),
            Space::new().width(Length::Fill),
        ]
        .spacing(10)
        .padding(5)
        .align_y(Alignment::Center);
        if let Some(status) = &self.status {
            toolbar = toolbar.push(text(status.as_str()));
        } else if let Some(summary) = self.row_summary() {
            toolbar = toolbar.push(text(summary));
        }

        let content: Element<'_, Message> = if self.source.is_none() && self.timeline.tree().is_empty() {
            iced::widget::container(text("Open a file to start").size(20))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into()
        } else {
            crate::timeline::view(&self.timeline)
        };

        column![toolbar, content].into()
    }
}

impl Drop for Treeline {
    fn drop(&mut self) {
        self.timeline.unmount();
    }
}
