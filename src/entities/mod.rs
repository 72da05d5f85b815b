mod image;
mod tag;

pub use image::{ImageDetail, ImageName};
pub use tag::Tag;
