use iced::alignment::Horizontal;
use iced::widget::{button, text};
use iced_fonts::bootstrap::icon_to_string;
use iced_fonts::{Bootstrap, BOOTSTRAP_FONT};

mod base;
mod menu_helpers;

pub use base::CustomWidget;
pub use menu_helpers::{
    menu_text, menu_text_disabled, menu_toggle, top_level_menu_text,
};

pub fn icon_text<'a>(
    icon: Bootstrap,
) -> text::Text<'a, iced::Theme, iced::Renderer> {
    text(icon_to_string(icon)).font(BOOTSTRAP_FONT)
}

pub fn icon_button<'a, T>(
    icon: Bootstrap,
) -> button::Button<'a, T, iced::Theme, iced::Renderer> {
    button(
        icon_text(icon)
            .align_x(Horizontal::Center)
            .width(iced::Length::Fill),
    )
}

pub fn close_button<'a, T: Clone + 'a>(
    message: T,
) -> button::Button<'a, T, iced::Theme, iced::Renderer> {
    icon_button(Bootstrap::X)
        .style(button::text)
        .width(28.0)
        .on_press(message)
}
