use clap::Parser;
use iced::keyboard::key::Named as NamedKey;
use iced::widget::{center, column, text};
use iced::{keyboard, Center, Element, Fill, Task as Command, Theme};
use iced_aw::menu;
use log::{error, info};

mod cli;
mod entities;
mod escape;
mod screens;
mod state;
mod utils;
mod widgets;

use crate::cli::CliArgs;
use crate::screens::{
    ConnectScreen, ConnectScreenMessage, Gallery, GalleryMessage,
};
use crate::state::{State, StatePersistenceError};
use crate::widgets::{
    menu_text, menu_text_disabled, menu_toggle, top_level_menu_text,
    CustomWidget,
};

pub fn main() -> iced::Result {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = CliArgs::parse();
    if let Some(code) = args.run() {
        std::process::exit(code);
    }

    let server_override = args.server;
    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .font(iced_fonts::REQUIRED_FONT_BYTES)
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .window_size((800.0, 700.0))
        .run_with(move || App::new(server_override))
}

#[derive(Debug)]
struct App {
    state: State,
    screen: Screen,
    server_override: Option<String>,
}

#[derive(Debug, Default)]
enum Screen {
    #[default]
    Loading,
    Connect(ConnectScreen),
    Gallery(Gallery),
}

#[derive(Debug, Clone)]
enum Message {
    Loaded(Result<Box<State>, StatePersistenceError>),
    ConnectProxy(ConnectScreenMessage),
    GalleryProxy(GalleryMessage),
    ChangeServer,
    ReloadTags,
    ToggleDarkMode,
    KeyPressed(NamedKey, keyboard::Modifiers),
    Discarded,
}

impl App {
    fn new(server_override: Option<String>) -> (Self, Command<Message>) {
        (
            Self {
                state: State::default(),
                screen: Screen::Loading,
                server_override,
            },
            Command::perform(State::load(), Message::Loaded),
        )
    }

    fn title(&self) -> String {
        match &self.screen {
            Screen::Gallery(gallery) => match gallery.selected_tag() {
                Some(tag) => format!("Tag Gallery: #{tag}"),
                None => format!("Tag Gallery ({})", gallery.server()),
            },
            _ => "Tag Gallery".to_string(),
        }
    }

    fn theme(&self) -> Theme {
        if self.state.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Loaded(loaded) => {
                let state = match loaded {
                    Ok(state) => *state,
                    Err(e) => {
                        info!("Starting with a fresh state: {e}");
                        State::default()
                    }
                };
                self.state =
                    state.with_server_override(self.server_override.take());
                return self.open_gallery();
            }
            Message::ChangeServer => {
                self.screen = Screen::Connect(ConnectScreen::new(
                    self.state.server_url.as_deref(),
                    None,
                ));
                return Command::none();
            }
            Message::ToggleDarkMode => {
                self.state.dark_mode = !self.state.dark_mode;
                return self.save_state();
            }
            Message::Discarded => return Command::none(),
            _ => {}
        }

        match &mut self.screen {
            Screen::Loading => {}
            Screen::Connect(screen) => match message {
                Message::ConnectProxy(ConnectScreenMessage::Completed(url)) => {
                    self.state.server_url = Some(url);
                    return Command::batch(vec![
                        self.save_state(),
                        self.open_gallery(),
                    ]);
                }
                Message::ConnectProxy(msg) => {
                    return screen
                        .update(msg, &self.state)
                        .map(Message::ConnectProxy)
                }
                Message::KeyPressed(key, modifiers) => {
                    if let Some(task) = screen.handle_key(key, modifiers) {
                        return task.map(Message::ConnectProxy);
                    }
                }
                _ => {}
            },
            Screen::Gallery(gallery) => match message {
                Message::GalleryProxy(msg) => {
                    let remember = match &msg {
                        GalleryMessage::SelectTag(tag) => Some(tag.clone()),
                        _ => None,
                    };
                    let task = gallery
                        .update(msg, &self.state)
                        .map(Message::GalleryProxy);
                    if let Some(tag) = remember {
                        self.state.last_tag = Some(tag);
                        return Command::batch(vec![task, self.save_state()]);
                    }
                    return task;
                }
                Message::ReloadTags => {
                    return gallery
                        .update(GalleryMessage::Reload, &self.state)
                        .map(Message::GalleryProxy)
                }
                Message::KeyPressed(key, modifiers) => {
                    if let Some(task) = gallery.handle_key(key, modifiers) {
                        return task.map(Message::GalleryProxy);
                    }
                }
                _ => {}
            },
        };
        Command::none()
    }

    fn open_gallery(&mut self) -> Command<Message> {
        match self.state.client() {
            Some(Ok(client)) => {
                let (gallery, task) =
                    Gallery::new(client, self.state.last_tag.clone());
                self.screen = Screen::Gallery(gallery);
                task.map(Message::GalleryProxy)
            }
            Some(Err(e)) => {
                error!("Configured server is unusable: {e}");
                self.screen = Screen::Connect(ConnectScreen::new(
                    self.state.server_url.as_deref(),
                    Some(e.to_string()),
                ));
                Command::none()
            }
            None => {
                self.screen = Screen::Connect(ConnectScreen::new(None, None));
                Command::none()
            }
        }
    }

    fn save_state(&self) -> Command<Message> {
        Command::future(self.state.clone().save()).map(|res| {
            if let Err(e) = res {
                error!("Failed to save state: {e}");
            }
            Message::Discarded
        })
    }

    fn view(&self) -> Element<'_, Message> {
        match &self.screen {
            Screen::Loading => loading_message(),
            Screen::Connect(screen) => column![
                self.menu(),
                screen.view(&self.state).map(Message::ConnectProxy)
            ]
            .into(),
            Screen::Gallery(gallery) => column![
                self.menu(),
                gallery.view(&self.state).map(Message::GalleryProxy)
            ]
            .into(),
        }
    }

    fn can_reload(&self) -> bool {
        matches!(self.screen, Screen::Gallery(_))
    }

    fn menu(&self) -> Element<'_, Message> {
        let reload = if self.can_reload() {
            menu_text("Reload tags", Message::ReloadTags)
        } else {
            menu_text_disabled("Reload tags")
        };
        let gallery_menu = menu::Menu::new(vec![
            menu::Item::new(reload),
            menu::Item::new(menu_text("Change server", Message::ChangeServer)),
            menu::Item::new(menu_toggle(
                "Dark mode",
                self.state.dark_mode,
                Message::ToggleDarkMode,
            )),
        ])
        .max_width(140.0);

        menu::MenuBar::new(vec![menu::Item::with_menu(
            top_level_menu_text("Gallery", Message::Discarded),
            gallery_menu,
        )])
        .into()
    }

    fn subscription(&self) -> iced::Subscription<Message> {
        keyboard::on_key_press(|key, modifiers| {
            let keyboard::Key::Named(key) = key else {
                return None;
            };
            Some(Message::KeyPressed(key, modifiers))
        })
    }
}

fn loading_message<'a>() -> Element<'a, Message> {
    center(text("Loading...").width(Fill).align_x(Center).size(50)).into()
}
