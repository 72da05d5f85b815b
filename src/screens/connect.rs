use iced::widget::{button, column, container, scrollable, text, text_input};
use iced::{Element, Fill, Task as Command};

use crate::entities::Tag;
use crate::state::State;
use crate::utils::{Client, NetResult};
use crate::widgets::CustomWidget;

#[derive(Clone, Debug, Default)]
pub struct ConnectScreen {
    server_url: String,
    error: String,
}

#[derive(Clone, Debug)]
pub enum ConnectScreenMessage {
    UrlEdited(String),
    Submit,
    Completed(String),
    Error(String),
}

impl CustomWidget<ConnectScreenMessage> for ConnectScreen {
    fn view(&self, _state: &State) -> Element<'_, ConnectScreenMessage> {
        let content = column![
            text("Gallery server"),
            text_input("http://localhost:8080/gallery", &self.server_url)
                .id("server-input")
                .on_submit(ConnectScreenMessage::Submit)
                .on_input(ConnectScreenMessage::UrlEdited),
            button("Connect")
                .on_press(ConnectScreenMessage::Submit)
                .style(button::primary),
            text(&self.error).style(text::danger)
        ]
        .spacing(10);

        scrollable(container(content).center_x(Fill).padding(40)).into()
    }

    fn update(
        &mut self,
        message: ConnectScreenMessage,
        _state: &State,
    ) -> Command<ConnectScreenMessage> {
        match message {
            ConnectScreenMessage::UrlEdited(url) => self.server_url = url,
            ConnectScreenMessage::Error(err) => self.error = err,
            ConnectScreenMessage::Submit => {
                self.error.clear();
                return Command::future(self.clone().submit());
            }
            ConnectScreenMessage::Completed(_) => {}
        }
        Command::none()
    }
}

impl ConnectScreen {
    pub fn new(server_url: Option<&str>, error: Option<String>) -> Self {
        Self {
            server_url: server_url.unwrap_or_default().to_owned(),
            error: error.unwrap_or_default(),
        }
    }

    async fn submit(self) -> ConnectScreenMessage {
        let url = self.server_url.trim();
        if url.is_empty() {
            return ConnectScreenMessage::Error(
                "Server URL must not be empty".to_owned(),
            );
        }
        match Self::check_server(url).await {
            Ok(_) => ConnectScreenMessage::Completed(url.to_owned()),
            Err(e) => ConnectScreenMessage::Error(e.to_string()),
        }
    }

    /// Check the server by listing its tags.
    async fn check_server(url: &str) -> NetResult<usize> {
        let client = Client::new(url)?;
        Ok(Tag::load_all(&client).await?.len())
    }
}
