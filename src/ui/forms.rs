/// Popup dialogs: the add forms, developer management and about box
use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};
use std::path::Path;

use crate::state::data::{Developer, DeveloperChoice, NewGame};
use crate::Message;

/// The popup currently laid over the main window
#[derive(Debug, Clone)]
pub enum Popup {
    AddGame(AddGameForm),
    AddDeveloper(AddDeveloperForm),
    /// Snapshot of the developer list taken when the popup opened
    ManageDevelopers(Vec<Developer>),
    About,
}

impl Popup {
    pub fn view(&self) -> Element<'_, Message> {
        match self {
            Popup::AddGame(form) => dialog("Add Game", form.view()),
            Popup::AddDeveloper(form) => dialog("Add Developer", form.view()),
            Popup::ManageDevelopers(developers) => {
                dialog("Manage Developers", manage_developers(developers))
            }
            Popup::About => dialog("About", about()),
        }
    }
}

/// State of the "Add Game" form
#[derive(Debug, Clone)]
pub struct AddGameForm {
    pub title: String,
    /// "None" followed by the developers known when the form was opened
    pub choices: Vec<DeveloperChoice>,
    pub selected: DeveloperChoice,
}

impl AddGameForm {
    pub fn new(developers: Vec<Developer>) -> Self {
        let choices = std::iter::once(DeveloperChoice::None)
            .chain(developers.into_iter().map(DeveloperChoice::Developer))
            .collect();

        Self {
            title: String::new(),
            choices,
            selected: DeveloperChoice::None,
        }
    }

    /// The game to insert, or None unless both a title and an image are given
    pub fn submission(&self, image_path: Option<&Path>) -> Option<NewGame> {
        if self.title.is_empty() {
            return None;
        }

        let image_path = image_path?.to_string_lossy().into_owned();
        if image_path.is_empty() {
            return None;
        }

        Some(NewGame {
            title: self.title.clone(),
            image_path,
            developer_id: self.selected.developer_id(),
        })
    }

    fn view(&self) -> Element<'_, Message> {
        column![
            text("Game Title:"),
            text_input("Title", &self.title).on_input(Message::GameTitleChanged),
            text("Developer:"),
            pick_list(
                self.choices.as_slice(),
                Some(&self.selected),
                Message::DeveloperSelected
            )
            .width(Length::Fill),
            row![
                button("Choose Image & Save").on_press(Message::ChooseImageAndSave),
                button("Cancel")
                    .on_press(Message::ClosePopup)
                    .style(button::secondary),
            ]
            .spacing(10),
        ]
        .spacing(8)
        .into()
    }
}

/// State of the "Add Developer" form
#[derive(Debug, Clone, Default)]
pub struct AddDeveloperForm {
    pub name: String,
}

impl AddDeveloperForm {
    /// The name to insert, None while the field is empty
    pub fn submission(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    fn view(&self) -> Element<'_, Message> {
        column![
            text("Developer Name:"),
            text_input("Name", &self.name)
                .on_input(Message::DeveloperNameChanged)
                .on_submit(Message::SaveDeveloper),
            row![
                button("Save").on_press(Message::SaveDeveloper),
                button("Cancel")
                    .on_press(Message::ClosePopup)
                    .style(button::secondary),
            ]
            .spacing(10),
        ]
        .spacing(8)
        .into()
    }
}

fn manage_developers(developers: &[Developer]) -> Element<'_, Message> {
    let list: Element<'_, Message> = if developers.is_empty() {
        text("No developers yet.").into()
    } else {
        let rows = developers.iter().map(|developer| -> Element<'_, Message> {
            container(
                row![
                    text(&developer.name).width(Length::Fill),
                    button("Remove")
                        .on_press(Message::RemoveDeveloper(developer.id))
                        .style(button::danger),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            )
            .padding(5)
            .style(container::rounded_box)
            .into()
        });

        scrollable(Column::with_children(rows).spacing(5))
            .height(Length::Shrink)
            .into()
    };

    column![
        list,
        button("Close")
            .on_press(Message::ClosePopup)
            .style(button::secondary),
    ]
    .spacing(10)
    .into()
}

fn about<'a>() -> Element<'a, Message> {
    column![
        text(concat!("Game Collection v", env!("CARGO_PKG_VERSION"))).size(16),
        text("A catalogue for your video games and their developers."),
        button("OK").on_press(Message::ClosePopup),
    ]
    .spacing(10)
    .into()
}

/// Frame popup content with a title
fn dialog<'a>(title: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(column![text(title).size(20), body].spacing(12))
        .width(Length::Fixed(360.0))
        .padding(20)
        .style(container::rounded_box)
        .into()
}
