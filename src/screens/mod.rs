mod connect;
mod gallery;

pub use connect::{ConnectScreen, ConnectScreenMessage};
pub use gallery::{Gallery, GalleryMessage};
