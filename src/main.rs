use iced::widget::image::Handle;
use iced::widget::{button, column, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length, Size, Task, Theme};
use rfd::FileDialog;

mod cover;
mod state;
mod ui;

use cover::cache::{CardKey, CoverCache};
use cover::thumbnail::{self, IMAGE_EXTENSIONS};
use state::data::{DeveloperChoice, GameEntry, NewGame};
use state::library::{Library, StoreError};
use state::settings::Settings;
use ui::forms::{AddDeveloperForm, AddGameForm, Popup};

/// Main application state
struct GameCollection {
    /// The catalogue database
    library: Library,
    /// Games currently in the grid, in query order
    games: Vec<GameEntry>,
    /// Contents of the filter field
    filter: String,
    /// Filter the grid was last queried with
    active_filter: Option<String>,
    /// Decoded covers of the cards in the grid
    covers: CoverCache,
    /// Shown while a cover is loading
    placeholder: Handle,
    popup: Option<Popup>,
    /// Status message to display to the user
    status: String,
    dark_theme: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    FilterChanged(String),
    ApplyFilter,
    ClearFilter,
    RemoveGame(i64),
    /// Background cover decoding finished
    CoverLoaded(CardKey, Handle),

    OpenAddGame,
    OpenAddDeveloper,
    OpenManageDevelopers,
    OpenAbout,
    ClosePopup,
    Exit,

    GameTitleChanged(String),
    DeveloperSelected(DeveloperChoice),
    /// Pick the cover image, then save if the form is complete
    ChooseImageAndSave,

    DeveloperNameChanged(String),
    SaveDeveloper,
    RemoveDeveloper(i64),
}

impl GameCollection {
    /// Create a new instance of the application and queue the first grid load
    fn new(library: Library, settings: &Settings) -> (Self, Task<Message>) {
        let mut app = GameCollection {
            library,
            games: Vec::new(),
            filter: String::new(),
            active_filter: None,
            covers: CoverCache::new(),
            placeholder: thumbnail::to_handle(thumbnail::placeholder()),
            popup: None,
            status: String::new(),
            dark_theme: settings.dark_theme,
        };

        let task = app.reload_games();
        log::info!(
            "Game Collection initialized with {} games and {} developers ({})",
            app.games.len(),
            app.library.developer_count().unwrap_or(0),
            app.library
                .path()
                .map_or_else(|| "in memory".to_string(), |p| p.display().to_string()),
        );

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FilterChanged(filter) => {
                self.filter = filter;
                Task::none()
            }
            Message::ApplyFilter => {
                self.active_filter = Some(self.filter.clone());
                self.reload_games()
            }
            Message::ClearFilter => {
                self.filter.clear();
                self.active_filter = None;
                self.reload_games()
            }
            Message::RemoveGame(game_id) => match self.library.remove_game(game_id) {
                Ok(()) => self.reload_games(),
                Err(e) => self.report(e),
            },
            Message::CoverLoaded(key, handle) => {
                self.covers.finish(key, handle, &self.games);
                Task::none()
            }
            Message::OpenAddGame => {
                // The selector is filled once, when the form opens
                match self.library.list_developers() {
                    Ok(developers) => {
                        self.popup = Some(Popup::AddGame(AddGameForm::new(developers)));
                        Task::none()
                    }
                    Err(e) => self.report(e),
                }
            }
            Message::OpenAddDeveloper => {
                self.popup = Some(Popup::AddDeveloper(AddDeveloperForm::default()));
                Task::none()
            }
            Message::OpenManageDevelopers => self.open_manage_developers(),
            Message::OpenAbout => {
                self.popup = Some(Popup::About);
                Task::none()
            }
            Message::ClosePopup => {
                self.popup = None;
                Task::none()
            }
            Message::Exit => iced::exit(),
            Message::GameTitleChanged(title) => {
                if let Some(Popup::AddGame(form)) = &mut self.popup {
                    form.title = title;
                }
                Task::none()
            }
            Message::DeveloperSelected(choice) => {
                if let Some(Popup::AddGame(form)) = &mut self.popup {
                    form.selected = choice;
                }
                Task::none()
            }
            Message::ChooseImageAndSave => {
                let Some(Popup::AddGame(form)) = &self.popup else {
                    return Task::none();
                };

                // Show the native file picker dialog
                let image_path = FileDialog::new()
                    .set_title("Choose Cover Image")
                    .add_filter("Image Files", &IMAGE_EXTENSIONS)
                    .pick_file();

                match form.submission(image_path.as_deref()) {
                    Some(game) => self.save_game(game),
                    None => Task::none(),
                }
            }
            Message::DeveloperNameChanged(name) => {
                if let Some(Popup::AddDeveloper(form)) = &mut self.popup {
                    form.name = name;
                }
                Task::none()
            }
            Message::SaveDeveloper => {
                let Some(Popup::AddDeveloper(form)) = &self.popup else {
                    return Task::none();
                };
                let Some(name) = form.submission() else {
                    return Task::none();
                };

                // Duplicates are ignored by the library; the popup closes either way.
                // The grid is unaffected until a game references the developer.
                match self.library.add_developer(name) {
                    Ok(_) => {
                        self.popup = None;
                        Task::none()
                    }
                    Err(e) => self.report(e),
                }
            }
            Message::RemoveDeveloper(developer_id) => {
                if let Err(e) = self.library.remove_developer(developer_id) {
                    return self.report(e);
                }

                // Reopen the list to refresh it; cards may have lost their developer label
                self.popup = None;
                let reopen = self.open_manage_developers();
                Task::batch([reopen, self.reload_games()])
            }
        }
    }

    /// Insert a game from a completed form, close the popup and reload the grid
    fn save_game(&mut self, game: NewGame) -> Task<Message> {
        match self
            .library
            .add_game(&game.title, &game.image_path, game.developer_id)
        {
            Ok(_) => {
                self.popup = None;
                self.reload_games()
            }
            Err(e) => self.report(e),
        }
    }

    fn open_manage_developers(&mut self) -> Task<Message> {
        match self.library.list_developers() {
            Ok(developers) => {
                self.popup = Some(Popup::ManageDevelopers(developers));
                Task::none()
            }
            Err(e) => self.report(e),
        }
    }

    /// Re-query the grid with the active filter and start loading missing covers
    fn reload_games(&mut self) -> Task<Message> {
        match self.library.list_games(self.active_filter.as_deref()) {
            Ok(games) => self.games = games,
            Err(e) => return self.report(e),
        }

        self.covers.retain_cards(&self.games);
        self.status = match self.library.game_count() {
            Ok(total) => format!("Showing {} of {} games.", self.games.len(), total),
            Err(e) => format!("Showing {} games. ({})", self.games.len(), e),
        };

        let missing = self.covers.begin_loads(&self.games);
        log::debug!(
            "{} covers cached, loading {} more",
            self.covers.len(),
            missing.len()
        );

        let loads = missing.into_iter().map(|key| {
            let path = key.image_path.clone();
            Task::perform(thumbnail::load_cover(path), move |handle| {
                Message::CoverLoaded(key.clone(), handle)
            })
        });

        Task::batch(loads)
    }

    /// Log a failed action and show it in the status line
    fn report(&mut self, error: StoreError) -> Task<Message> {
        log::error!("{}", error);
        self.status = format!("Error: {}", error);
        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let menu = row![
            menu_button("Add Game", Message::OpenAddGame),
            menu_button("Add Developer", Message::OpenAddDeveloper),
            menu_button("Manage Developers", Message::OpenManageDevelopers),
            menu_button("About", Message::OpenAbout),
            menu_button("Exit", Message::Exit),
        ]
        .spacing(5);

        let filter_bar = row![
            text("Filter by Title:"),
            text_input("", &self.filter)
                .on_input(Message::FilterChanged)
                .on_submit(Message::ApplyFilter)
                .width(Length::Fixed(180.0)),
            button("Filter").on_press(Message::ApplyFilter),
            button("Clear Filter")
                .on_press(Message::ClearFilter)
                .style(button::secondary),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let grid = ui::grid::view(
            &self.games,
            &self.covers,
            &self.placeholder,
            self.active_filter.is_some(),
        );

        let content = column![
            menu,
            filter_bar,
            text(&self.status).size(12),
            scrollable(grid).width(Length::Fill).height(Length::Fill),
        ]
        .spacing(10)
        .padding(10);

        match &self.popup {
            Some(popup) => ui::modal::modal(content, popup.view(), Message::ClosePopup),
            None => content.into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        if self.dark_theme {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

fn menu_button(label: &str, message: Message) -> Element<'_, Message> {
    button(text(label))
        .on_press(message)
        .style(button::text)
        .into()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();

    // The app cannot function without its database
    let library = Library::open(settings.database_path())?;

    let window_size = Size::new(settings.window_width, settings.window_height);

    iced::application("Game Collection", GameCollection::update, GameCollection::view)
        .theme(GameCollection::theme)
        .window_size(window_size)
        .centered()
        .run_with(move || GameCollection::new(library, &settings))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> GameCollection {
        let library = Library::open_in_memory().unwrap();
        let (app, _) = GameCollection::new(library, &Settings::default());
        app
    }

    fn titles(app: &GameCollection) -> Vec<&str> {
        app.games.iter().map(|g| g.title.as_str()).collect()
    }

    #[test]
    fn test_filter_and_clear() {
        let mut app = app();
        app.library.add_game("Dead Cells", "a.png", None).unwrap();
        app.library.add_game("Dead Space", "b.png", None).unwrap();
        app.library.add_game("Inside", "c.png", None).unwrap();

        let _ = app.update(Message::FilterChanged("Dead".to_string()));
        // Typing alone doesn't requery
        assert!(app.games.is_empty());

        let _ = app.update(Message::ApplyFilter);
        assert_eq!(titles(&app), vec!["Dead Cells", "Dead Space"]);

        let _ = app.update(Message::ClearFilter);
        assert!(app.filter.is_empty());
        assert_eq!(app.games.len(), 3);
    }

    #[test]
    fn test_remove_game_keeps_filter() {
        let mut app = app();
        let first = app.library.add_game("Ori", "a.png", None).unwrap();
        app.library.add_game("Ori 2", "b.png", None).unwrap();
        app.library.add_game("Limbo", "c.png", None).unwrap();

        let _ = app.update(Message::FilterChanged("Ori".to_string()));
        let _ = app.update(Message::ApplyFilter);
        let _ = app.update(Message::RemoveGame(first));

        assert_eq!(titles(&app), vec!["Ori 2"]);
        assert_eq!(app.status, "Showing 1 of 2 games.");
    }

    #[test]
    fn test_add_developer_popup() {
        let mut app = app();

        let _ = app.update(Message::OpenAddDeveloper);
        let _ = app.update(Message::SaveDeveloper);
        // Empty name: nothing saved, popup stays
        assert!(matches!(app.popup, Some(Popup::AddDeveloper(_))));
        assert_eq!(app.library.developer_count().unwrap(), 0);

        let _ = app.update(Message::DeveloperNameChanged("Capcom".to_string()));
        let _ = app.update(Message::SaveDeveloper);
        assert!(app.popup.is_none());
        assert_eq!(app.library.developer_count().unwrap(), 1);

        // A duplicate closes the popup without a second row
        let _ = app.update(Message::OpenAddDeveloper);
        let _ = app.update(Message::DeveloperNameChanged("Capcom".to_string()));
        let _ = app.update(Message::SaveDeveloper);
        assert!(app.popup.is_none());
        assert_eq!(app.library.developer_count().unwrap(), 1);
    }

    #[test]
    fn test_add_game_form_lists_developers_at_open() {
        let mut app = app();
        app.library.add_developer("Atlus").unwrap();

        let _ = app.update(Message::OpenAddGame);
        app.library.add_developer("Sega").unwrap();

        let Some(Popup::AddGame(form)) = &app.popup else {
            panic!("add game popup not open");
        };
        assert_eq!(form.choices.len(), 2);
        assert_eq!(form.selected, DeveloperChoice::None);
    }

    #[test]
    fn test_save_game_closes_popup_and_reloads() {
        let mut app = app();
        let _ = app.update(Message::OpenAddGame);
        let _ = app.update(Message::GameTitleChanged("Celeste".to_string()));

        let Some(Popup::AddGame(form)) = &app.popup else {
            panic!("add game popup not open");
        };
        let game = form.submission(Some(std::path::Path::new("celeste.png"))).unwrap();
        let _ = app.save_game(game);

        assert!(app.popup.is_none());
        assert_eq!(titles(&app), vec!["Celeste"]);
        assert!(app.covers.is_pending(&CardKey::of(&app.games[0])));
    }

    #[test]
    fn test_remove_developer_refreshes_list_and_grid() {
        let mut app = app();
        let dev = app.library.add_developer("Remedy").unwrap().unwrap();
        app.library.add_developer("Bungie").unwrap();
        app.library.add_game("Control", "control.png", Some(dev)).unwrap();
        let _ = app.update(Message::ClearFilter);
        assert_eq!(app.games[0].developer_name.as_deref(), Some("Remedy"));

        let _ = app.update(Message::OpenManageDevelopers);
        let _ = app.update(Message::RemoveDeveloper(dev));

        let Some(Popup::ManageDevelopers(developers)) = &app.popup else {
            panic!("developer list not reopened");
        };
        assert_eq!(developers.len(), 1);
        assert_eq!(developers[0].name, "Bungie");

        assert_eq!(app.games.len(), 1);
        assert_eq!(app.games[0].developer_name, None);
    }

    #[test]
    fn test_stale_cover_is_ignored() {
        let mut app = app();
        let id = app.library.add_game("Braid", "braid.png", None).unwrap();
        let _ = app.update(Message::ClearFilter);
        let key = CardKey::of(&app.games[0]);

        let _ = app.update(Message::RemoveGame(id));
        let handle = thumbnail::to_handle(thumbnail::placeholder());
        let _ = app.update(Message::CoverLoaded(key.clone(), handle));

        assert!(app.covers.get(&key).is_none());
    }

    #[test]
    fn test_close_popup() {
        let mut app = app();
        let _ = app.update(Message::OpenAbout);
        assert!(matches!(app.popup, Some(Popup::About)));
        let _ = app.update(Message::ClosePopup);
        assert!(app.popup.is_none());
    }
}
