use iced::alignment::Vertical;
use iced::widget::button::Status;
use iced::widget::{button, row, text, toggler};

const MENU_TEXT_SIZE: u16 = 12;

fn default_button_text<'a>(content: impl ToString) -> text::Text<'a> {
    text(content.to_string()).size(MENU_TEXT_SIZE)
}

fn menu_button<'a, T>(
    content: impl Into<iced::Element<'a, T>>,
    message: Option<T>,
) -> button::Button<'a, T> {
    button(content)
        .padding([2, 4])
        .width(iced::Length::Fill)
        .style(|theme, status| button::Style {
            background: match status {
                Status::Hovered => {
                    Some(theme.extended_palette().primary.weak.color.into())
                }
                _ => None,
            },
            ..button::text(theme, status)
        })
        .on_press_maybe(message)
}

pub fn menu_text<'a, T>(
    content: impl ToString,
    message: T,
) -> button::Button<'a, T> {
    menu_button(default_button_text(content), Some(message))
}

pub fn menu_text_disabled<'a, T>(
    content: impl ToString,
) -> button::Button<'a, T> {
    menu_button(default_button_text(content), None)
}

pub fn top_level_menu_text<'a, T>(
    content: impl ToString,
    message: T,
) -> button::Button<'a, T> {
    menu_text(content, message).width(iced::Length::Shrink)
}

pub fn menu_toggle<'a, T: 'a>(
    content: impl ToString,
    enabled: bool,
    message: T,
) -> button::Button<'a, T> {
    menu_button(
        row![
            default_button_text(content).width(iced::Length::Fill),
            toggler(enabled),
        ]
        .align_y(Vertical::Center),
        Some(message),
    )
}
