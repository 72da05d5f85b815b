use futures::future;
use iced::keyboard::key::Named as NamedKey;
use iced::widget::scrollable::RelativeOffset;
use iced::widget::{
    button, column, container, image, row, scrollable, text, Row, Space,
};
use iced::{keyboard, Border, Element, Fill, Task as Command};
use lazy_static::lazy_static;
use log::{debug, error, warn};

use crate::entities::{ImageDetail, ImageName, Tag};
use crate::escape::escape_html;
use crate::state::State;
use crate::utils::{Client, FetchError, NetResult};
use crate::widgets::{close_button, CustomWidget};

pub const NO_TAGS: &str = "No available tags.";
pub const NO_IMAGES: &str = "No available images";

const THUMBNAIL_SIZE: f32 = 150.0;

lazy_static! {
    static ref GALLERY_SCROLL: scrollable::Id =
        scrollable::Id::new("gallery-scroll");
}

/// A tag as it appears on screen: escaped label, raw lookup key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagButton {
    pub label: String,
    pub key: Tag,
}

impl From<Tag> for TagButton {
    fn from(tag: Tag) -> Self {
        Self {
            label: escape_html(&tag),
            key: tag,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub tag: Tag,
    pub image: ImageName,
    /// Missing when the thumbnail itself could not be fetched.
    pub handle: Option<image::Handle>,
}

impl Thumbnail {
    /// A failed download keeps its place as a text-only thumbnail.
    fn from_bytes(
        tag: &Tag,
        image: ImageName,
        bytes: NetResult<Vec<u8>>,
    ) -> Self {
        let handle = match bytes {
            Ok(bytes) => Some(image::Handle::from_bytes(bytes)),
            Err(e) => {
                warn!("Failed to load thumbnail of {image}: {e}");
                None
            }
        };
        Self {
            tag: tag.clone(),
            image,
            handle,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Polaroid {
    pub image: ImageName,
    pub handle: image::Handle,
    pub description: String,
    pub tag_line: String,
}

impl Polaroid {
    pub fn new(image: ImageName, bytes: Vec<u8>, detail: &ImageDetail) -> Self {
        Self {
            image,
            handle: image::Handle::from_bytes(bytes),
            description: escape_html(&detail.description),
            tag_line: detail.tag_line_with(|t| escape_html(t)),
        }
    }
}

#[derive(Clone, Debug, Default)]
enum TagsSlot {
    #[default]
    Loading,
    /// The tag list request failed; nothing to offer until a reload.
    Unavailable,
    Empty,
    Loaded(Vec<TagButton>),
}

#[derive(Clone, Debug, Default)]
enum ThumbnailsSlot {
    #[default]
    Idle,
    Loading,
    Empty,
    Loaded(Vec<Thumbnail>),
}

#[derive(Clone, Debug, Default)]
struct PolaroidSlot {
    content: Option<Polaroid>,
    visible: bool,
}

impl PolaroidSlot {
    fn shown(&self) -> Option<&Polaroid> {
        self.content.as_ref().filter(|_| self.visible)
    }
}

#[derive(Clone, Debug)]
pub enum GalleryMessage {
    Reload,
    TagsLoaded(Result<Vec<Tag>, FetchError>),
    SelectTag(Tag),
    ImagesLoaded {
        generation: u64,
        result: Result<Vec<Thumbnail>, FetchError>,
    },
    SelectImage {
        tag: Tag,
        image: ImageName,
    },
    PolaroidLoaded {
        generation: u64,
        result: Result<Polaroid, FetchError>,
    },
    HidePolaroid,
}

#[derive(Debug)]
pub struct Gallery {
    client: Client,
    tags: TagsSlot,
    thumbnails: ThumbnailsSlot,
    polaroid: PolaroidSlot,
    selected_tag: Option<Tag>,
    // Selected again once the first tag list contains it.
    restore_tag: Option<Tag>,
    // Bumped on every selection; responses carrying an older value are dropped.
    tag_generation: u64,
    image_generation: u64,
}

impl CustomWidget<GalleryMessage> for Gallery {
    fn view(&self, _state: &State) -> Element<'_, GalleryMessage> {
        let content = column![
            self.tags_view(),
            self.thumbnails_view(),
            self.polaroid_view(),
        ]
        .spacing(16)
        .padding(10)
        .width(Fill);

        scrollable(content)
            .id(GALLERY_SCROLL.clone())
            .height(Fill)
            .into()
    }

    fn update(
        &mut self,
        message: GalleryMessage,
        _state: &State,
    ) -> Command<GalleryMessage> {
        use GalleryMessage::*;
        match message {
            Reload => {
                self.tags = TagsSlot::Loading;
                return Command::perform(
                    Self::load_tags(self.client.clone()),
                    TagsLoaded,
                );
            }
            TagsLoaded(Ok(tags)) => {
                let restore =
                    self.restore_tag.take().filter(|tag| tags.contains(tag));
                self.show_tags(tags);
                if let Some(tag) = restore {
                    return self.select_tag(tag);
                }
            }
            TagsLoaded(Err(e)) => {
                error!("Failed to load tags: {e}");
                self.tags = TagsSlot::Unavailable;
            }
            SelectTag(tag) => return self.select_tag(tag),
            ImagesLoaded { generation, .. }
                if generation != self.tag_generation =>
            {
                debug!("Dropping image list of superseded selection {generation}");
            }
            ImagesLoaded {
                result: Ok(thumbnails),
                ..
            } => {
                self.thumbnails = if thumbnails.is_empty() {
                    ThumbnailsSlot::Empty
                } else {
                    ThumbnailsSlot::Loaded(thumbnails)
                };
            }
            ImagesLoaded { result: Err(e), .. } => {
                error!("Failed to load images: {e}");
                self.thumbnails = ThumbnailsSlot::Idle;
            }
            SelectImage { tag, image } => return self.select_image(tag, image),
            PolaroidLoaded { generation, .. }
                if generation != self.image_generation =>
            {
                debug!("Dropping image info of superseded selection {generation}");
            }
            PolaroidLoaded {
                result: Ok(polaroid),
                ..
            } => {
                self.polaroid = PolaroidSlot {
                    content: Some(polaroid),
                    visible: true,
                };
                return scrollable::snap_to(
                    GALLERY_SCROLL.clone(),
                    RelativeOffset::END,
                );
            }
            PolaroidLoaded { result: Err(e), .. } => {
                error!("Failed to load image info: {e}");
            }
            HidePolaroid => self.polaroid.visible = false,
        }
        Command::none()
    }

    fn handle_key(
        &mut self,
        key: NamedKey,
        modifiers: keyboard::Modifiers,
    ) -> Option<Command<GalleryMessage>> {
        if matches!(key, NamedKey::Escape)
            && modifiers.is_empty()
            && self.polaroid.visible
        {
            Some(Command::done(GalleryMessage::HidePolaroid))
        } else {
            None
        }
    }
}

impl Gallery {
    pub fn new(
        client: Client,
        restore_tag: Option<Tag>,
    ) -> (Self, Command<GalleryMessage>) {
        let mut gallery = Self {
            client,
            tags: TagsSlot::default(),
            thumbnails: ThumbnailsSlot::default(),
            polaroid: PolaroidSlot::default(),
            selected_tag: None,
            restore_tag,
            tag_generation: 0,
            image_generation: 0,
        };
        let task = gallery.update(GalleryMessage::Reload, &State::default());
        (gallery, task)
    }

    pub fn selected_tag(&self) -> Option<&Tag> {
        self.selected_tag.as_ref()
    }

    pub fn server(&self) -> &str {
        self.client.base_url().as_str()
    }

    fn show_tags(&mut self, tags: Vec<Tag>) {
        self.tags = if tags.is_empty() {
            TagsSlot::Empty
        } else {
            TagsSlot::Loaded(tags.into_iter().map(TagButton::from).collect())
        };
        // Fresh skeleton: nothing selected, detail hidden.
        self.thumbnails = ThumbnailsSlot::Idle;
        self.polaroid = PolaroidSlot::default();
        self.selected_tag = None;
        self.tag_generation += 1;
        self.image_generation += 1;
    }

    fn select_tag(&mut self, tag: Tag) -> Command<GalleryMessage> {
        self.thumbnails = ThumbnailsSlot::Loading;
        self.polaroid.visible = false;
        self.selected_tag = Some(tag.clone());
        self.tag_generation += 1;
        // A pending detail belongs to the previous tag.
        self.image_generation += 1;

        let generation = self.tag_generation;
        Command::perform(
            Self::load_thumbnails(self.client.clone(), tag),
            move |result| GalleryMessage::ImagesLoaded { generation, result },
        )
    }

    fn select_image(
        &mut self,
        tag: Tag,
        image: ImageName,
    ) -> Command<GalleryMessage> {
        self.polaroid.visible = false;
        self.image_generation += 1;

        let generation = self.image_generation;
        Command::perform(
            Self::load_polaroid(self.client.clone(), tag, image),
            move |result| GalleryMessage::PolaroidLoaded { generation, result },
        )
    }

    async fn load_tags(client: Client) -> NetResult<Vec<Tag>> {
        Tag::load_all(&client).await
    }

    async fn load_thumbnails(
        client: Client,
        tag: Tag,
    ) -> NetResult<Vec<Thumbnail>> {
        let images = ImageName::load_for_tag(&client, &tag).await?;
        let client = &client;
        let tag = &tag;
        let thumbnails =
            future::join_all(images.into_iter().map(|image| async move {
                let bytes = image.load_thumbnail(client).await;
                Thumbnail::from_bytes(tag, image, bytes)
            }))
            .await;
        Ok(thumbnails)
    }

    async fn load_polaroid(
        client: Client,
        tag: Tag,
        image: ImageName,
    ) -> NetResult<Polaroid> {
        let (detail, bytes) = futures::try_join!(
            ImageDetail::load(&client, &tag, &image),
            image.load_full(&client)
        )?;
        Ok(Polaroid::new(image, bytes, &detail))
    }

    fn tags_view(&self) -> Element<'_, GalleryMessage> {
        match &self.tags {
            TagsSlot::Loading => text("Loading tags...").into(),
            TagsSlot::Unavailable => Space::with_height(0.0).into(),
            TagsSlot::Empty => text(NO_TAGS).into(),
            TagsSlot::Loaded(buttons) => Row::with_children(
                buttons.iter().map(|b| self.tag_button(b)),
            )
            .spacing(6)
            .wrap()
            .into(),
        }
    }

    fn tag_button<'a>(
        &self,
        tag: &'a TagButton,
    ) -> Element<'a, GalleryMessage> {
        let selected = self.selected_tag.as_ref() == Some(&tag.key);
        button(text(&tag.label))
            .style(if selected {
                button::primary
            } else {
                button::secondary
            })
            .on_press(GalleryMessage::SelectTag(tag.key.clone()))
            .into()
    }

    fn thumbnails_view(&self) -> Element<'_, GalleryMessage> {
        match &self.thumbnails {
            ThumbnailsSlot::Idle => Space::with_height(0.0).into(),
            ThumbnailsSlot::Loading => text("Loading images...").into(),
            ThumbnailsSlot::Empty => text(NO_IMAGES).into(),
            ThumbnailsSlot::Loaded(thumbnails) => {
                Row::with_children(thumbnails.iter().map(thumbnail_button))
                    .spacing(8)
                    .wrap()
                    .into()
            }
        }
    }

    fn polaroid_view(&self) -> Element<'_, GalleryMessage> {
        let Some(polaroid) = self.polaroid.shown() else {
            return Space::with_height(0.0).into();
        };
        let content = column![
            row![
                text(polaroid.image.as_str()).size(12).width(Fill),
                close_button(GalleryMessage::HidePolaroid)
            ],
            image(polaroid.handle.clone()).width(Fill),
            text(&polaroid.description),
            text(&polaroid.tag_line).style(text::primary),
        ]
        .spacing(8);

        container(content)
            .padding(12)
            .width(Fill)
            .style(|theme: &iced::Theme| {
                let palette = theme.extended_palette();
                container::Style {
                    background: Some(palette.background.weak.color.into()),
                    border: Border {
                        color: palette.background.strong.color,
                        width: 1.0,
                        radius: 4.0.into(),
                    },
                    ..container::Style::default()
                }
            })
            .into()
    }
}

fn thumbnail_button(thumbnail: &Thumbnail) -> Element<'_, GalleryMessage> {
    let content: Element<'_, GalleryMessage> = match &thumbnail.handle {
        Some(handle) => image(handle.clone())
            .width(THUMBNAIL_SIZE)
            .height(THUMBNAIL_SIZE)
            .into(),
        None => container(text(thumbnail.image.as_str()))
            .center(THUMBNAIL_SIZE)
            .into(),
    };
    button(content)
        .padding(2)
        .style(button::text)
        .on_press(GalleryMessage::SelectImage {
            tag: thumbnail.tag.clone(),
            image: thumbnail.image.clone(),
        })
        .into()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{tags, test_client};

    fn gallery() -> Gallery {
        let (gallery, _) = Gallery::new(test_client(), None);
        gallery
    }

    fn thumbnails(tag: &str, names: &[&str]) -> Vec<Thumbnail> {
        names
            .iter()
            .map(|name| Thumbnail {
                tag: Tag::new(tag),
                image: ImageName::new(*name),
                handle: None,
            })
            .collect()
    }

    fn loaded_names(gallery: &Gallery) -> Vec<String> {
        match &gallery.thumbnails {
            ThumbnailsSlot::Loaded(items) => {
                items.iter().map(|t| t.image.to_string()).collect()
            }
            other => panic!("Thumbnails not loaded: {other:?}"),
        }
    }

    fn send(gallery: &mut Gallery, message: GalleryMessage) {
        let _ = gallery.update(message, &State::default());
    }

    fn select_tag(gallery: &mut Gallery, tag: &str) -> u64 {
        send(gallery, GalleryMessage::SelectTag(Tag::new(tag)));
        gallery.tag_generation
    }

    fn show(gallery: &mut Gallery, polaroid: Polaroid) {
        let generation = gallery.image_generation;
        send(
            gallery,
            GalleryMessage::PolaroidLoaded {
                generation,
                result: Ok(polaroid),
            },
        );
    }

    fn polaroid(description: &str, tag_names: &[&str]) -> Polaroid {
        let detail = ImageDetail {
            description: description.to_owned(),
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
        };
        Polaroid::new(ImageName::new("img.jpg"), vec![], &detail)
    }

    #[test]
    fn test_starts_loading_tags() {
        assert!(matches!(gallery().tags, TagsSlot::Loading));
    }

    #[test]
    fn test_no_tags() {
        let mut gallery = gallery();
        send(&mut gallery, GalleryMessage::TagsLoaded(Ok(vec![])));
        assert!(matches!(gallery.tags, TagsSlot::Empty));
    }

    #[test]
    fn test_tag_buttons_escape_label_only() {
        let mut gallery = gallery();
        send(
            &mut gallery,
            GalleryMessage::TagsLoaded(Ok(tags(&["cat", "dog", "a<b"]))),
        );
        let TagsSlot::Loaded(buttons) = &gallery.tags else {
            panic!("Tags not loaded");
        };
        assert_eq!(
            buttons,
            &vec![
                TagButton {
                    label: "cat".to_owned(),
                    key: Tag::new("cat")
                },
                TagButton {
                    label: "dog".to_owned(),
                    key: Tag::new("dog")
                },
                TagButton {
                    label: "a&lt;b".to_owned(),
                    key: Tag::new("a<b")
                },
            ]
        );
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Idle));
        assert!(gallery.polaroid.shown().is_none());
    }

    #[test]
    fn test_tag_load_failure_stops_loading() {
        let mut gallery = gallery();
        send(
            &mut gallery,
            GalleryMessage::TagsLoaded(Err(FetchError::Status(
                500,
                String::new(),
            ))),
        );
        assert!(matches!(gallery.tags, TagsSlot::Unavailable));
        assert!(gallery.selected_tag().is_none());

        send(&mut gallery, GalleryMessage::Reload);
        assert!(matches!(gallery.tags, TagsSlot::Loading));
    }

    #[test]
    fn test_remembered_tag_selected_after_load() {
        let (mut gallery, _) =
            Gallery::new(test_client(), Some(Tag::new("dog")));
        send(
            &mut gallery,
            GalleryMessage::TagsLoaded(Ok(tags(&["cat", "dog"]))),
        );
        assert_eq!(gallery.selected_tag(), Some(&Tag::new("dog")));
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Loading));

        // Only the first tag list restores the selection.
        send(
            &mut gallery,
            GalleryMessage::TagsLoaded(Ok(tags(&["cat", "dog"]))),
        );
        assert!(gallery.selected_tag().is_none());
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Idle));
    }

    #[test]
    fn test_remembered_tag_gone() {
        let (mut gallery, _) =
            Gallery::new(test_client(), Some(Tag::new("bird")));
        send(
            &mut gallery,
            GalleryMessage::TagsLoaded(Ok(tags(&["cat", "dog"]))),
        );
        assert!(gallery.selected_tag().is_none());
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Idle));
    }

    #[test]
    fn test_select_tag_clears_and_hides() {
        let mut gallery = gallery();
        let generation = select_tag(&mut gallery, "cat");
        send(
            &mut gallery,
            GalleryMessage::ImagesLoaded {
                generation,
                result: Ok(thumbnails("cat", &["1.jpg"])),
            },
        );
        show(&mut gallery, polaroid("", &[]));
        assert!(gallery.polaroid.shown().is_some());

        select_tag(&mut gallery, "dog");
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Loading));
        assert!(gallery.polaroid.shown().is_none());
        assert_eq!(gallery.selected_tag(), Some(&Tag::new("dog")));
    }

    #[test]
    fn test_no_images() {
        let mut gallery = gallery();
        let generation = select_tag(&mut gallery, "cat");
        send(
            &mut gallery,
            GalleryMessage::ImagesLoaded {
                generation,
                result: Ok(vec![]),
            },
        );
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Empty));
    }

    #[test]
    fn test_image_load_failure_stops_loading() {
        let mut gallery = gallery();
        let generation = select_tag(&mut gallery, "cat");
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Loading));
        send(
            &mut gallery,
            GalleryMessage::ImagesLoaded {
                generation,
                result: Err(FetchError::Network("timed out".to_owned())),
            },
        );
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Idle));
        // The tag stays selected so a second click retries.
        assert_eq!(gallery.selected_tag(), Some(&Tag::new("cat")));
    }

    #[test]
    fn test_failed_thumbnail_keeps_its_place() {
        let tag = Tag::new("cat");
        let fetched = vec![
            ("1.jpg", Ok(vec![1, 2, 3])),
            ("2.jpg", Err(FetchError::Status(404, "gone".to_owned()))),
            ("3.jpg", Ok(vec![4])),
        ];
        let thumbnails: Vec<Thumbnail> = fetched
            .into_iter()
            .map(|(name, bytes)| {
                Thumbnail::from_bytes(&tag, ImageName::new(name), bytes)
            })
            .collect();

        let names: Vec<&str> =
            thumbnails.iter().map(|t| t.image.as_str()).collect();
        assert_eq!(names, ["1.jpg", "2.jpg", "3.jpg"]);
        let loaded: Vec<bool> =
            thumbnails.iter().map(|t| t.handle.is_some()).collect();
        assert_eq!(loaded, [true, false, true]);
        assert!(thumbnails.iter().all(|t| t.tag == tag));
    }

    #[test]
    fn test_reselect_replaces_thumbnails() {
        let mut gallery = gallery();
        for names in [&["1.jpg", "2.jpg"][..], &["3.jpg"][..]] {
            let generation = select_tag(&mut gallery, "cat");
            send(
                &mut gallery,
                GalleryMessage::ImagesLoaded {
                    generation,
                    result: Ok(thumbnails("cat", names)),
                },
            );
        }
        assert_eq!(loaded_names(&gallery), ["3.jpg"]);
    }

    #[test]
    fn test_stale_image_list_dropped() {
        let mut gallery = gallery();
        let first = select_tag(&mut gallery, "cat");
        let second = select_tag(&mut gallery, "dog");
        send(
            &mut gallery,
            GalleryMessage::ImagesLoaded {
                generation: first,
                result: Ok(thumbnails("cat", &["cat.jpg"])),
            },
        );
        assert!(matches!(gallery.thumbnails, ThumbnailsSlot::Loading));
        send(
            &mut gallery,
            GalleryMessage::ImagesLoaded {
                generation: second,
                result: Ok(thumbnails("dog", &["dog1.jpg", "dog2.jpg"])),
            },
        );
        assert_eq!(loaded_names(&gallery), ["dog1.jpg", "dog2.jpg"]);
    }

    #[test]
    fn test_polaroid_content() {
        let mut gallery = gallery();
        select_tag(&mut gallery, "x");
        send(
            &mut gallery,
            GalleryMessage::SelectImage {
                tag: Tag::new("x"),
                image: ImageName::new("img.jpg"),
            },
        );
        show(&mut gallery, polaroid("<b>hi</b>", &["x", "y"]));
        let shown = gallery.polaroid.shown().expect("Polaroid must be shown");
        assert_eq!(shown.description, "&lt;b&gt;hi&lt;&#x2F;b&gt;");
        assert_eq!(shown.tag_line, "#x#y");
    }

    #[test]
    fn test_polaroid_tags_escaped_individually() {
        let shown = polaroid("plain", &["a&b", "c=d"]);
        assert_eq!(shown.description, "plain");
        assert_eq!(shown.tag_line, "#a&amp;b#c&#x3D;d");
    }

    #[test]
    fn test_select_image_hides_current() {
        let mut gallery = gallery();
        select_tag(&mut gallery, "x");
        show(&mut gallery, polaroid("first", &[]));
        send(
            &mut gallery,
            GalleryMessage::SelectImage {
                tag: Tag::new("x"),
                image: ImageName::new("other.jpg"),
            },
        );
        assert!(gallery.polaroid.shown().is_none());
    }

    #[test]
    fn test_stale_polaroid_dropped() {
        let mut gallery = gallery();
        select_tag(&mut gallery, "x");
        send(
            &mut gallery,
            GalleryMessage::SelectImage {
                tag: Tag::new("x"),
                image: ImageName::new("slow.jpg"),
            },
        );
        let stale = gallery.image_generation;
        select_tag(&mut gallery, "y");
        send(
            &mut gallery,
            GalleryMessage::PolaroidLoaded {
                generation: stale,
                result: Ok(polaroid("slow", &[])),
            },
        );
        assert!(gallery.polaroid.shown().is_none());
    }

    #[test]
    fn test_escape_hides_polaroid() {
        let mut gallery = gallery();
        assert!(gallery
            .handle_key(NamedKey::Escape, keyboard::Modifiers::empty())
            .is_none());
        show(&mut gallery, polaroid("", &[]));
        assert!(gallery
            .handle_key(NamedKey::Escape, keyboard::Modifiers::empty())
            .is_some());
        send(&mut gallery, GalleryMessage::HidePolaroid);
        assert!(gallery.polaroid.shown().is_none());
    }
}
