/// Card grid for the main window
use iced::font::{self, Font};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, text, Column, Row};
use iced::{Alignment, Element, Length};

use crate::cover::cache::{CardKey, CoverCache};
use crate::cover::thumbnail::{COVER_HEIGHT, COVER_WIDTH};
use crate::state::data::GameEntry;
use crate::Message;

/// Cards per grid row
pub const COLUMNS: usize = 4;

/// Split games into grid rows, left to right then top to bottom
pub fn grid_rows<T>(items: &[T]) -> std::slice::Chunks<'_, T> {
    items.chunks(COLUMNS)
}

/// Build the grid. Cards whose cover isn't decoded yet show `placeholder`.
pub fn view<'a>(
    games: &'a [GameEntry],
    covers: &'a CoverCache,
    placeholder: &'a Handle,
    filtered: bool,
) -> Element<'a, Message> {
    if games.is_empty() {
        let hint = if filtered {
            "No games match the filter."
        } else {
            "No games yet. Use \"Add Game\" to start your collection."
        };
        return container(text(hint))
            .padding(20)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into();
    }

    let rows = grid_rows(games).map(|chunk| -> Element<'a, Message> {
        Row::with_children(chunk.iter().map(|game| {
            let cover = covers.get(&CardKey::of(game)).unwrap_or(placeholder);
            card(game, cover.clone())
        }))
        .spacing(10)
        .into()
    });

    Column::with_children(rows).spacing(10).padding(10).into()
}

fn card(game: &GameEntry, cover: Handle) -> Element<'_, Message> {
    let mut content = column![
        image(cover)
            .width(Length::Fixed(COVER_WIDTH as f32))
            .height(Length::Fixed(COVER_HEIGHT as f32)),
        text(&game.title),
    ]
    .spacing(4)
    .align_x(Alignment::Center);

    if let Some(developer) = &game.developer_name {
        content = content.push(
            text(format!("Developer: {}", developer))
                .size(11)
                .font(Font {
                    style: font::Style::Italic,
                    ..Font::default()
                }),
        );
    }

    content = content.push(
        button("Remove")
            .on_press(Message::RemoveGame(game.id))
            .style(button::danger),
    );

    container(content)
        .padding(5)
        .width(Length::Fixed(COVER_WIDTH as f32 + 30.0))
        .style(container::rounded_box)
        .into()
}
