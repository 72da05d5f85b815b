use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::Tag;
use crate::utils::{
    lenient_string_deserialize, lenient_vec_deserialize, value_to_text,
    Client, NetResult,
};

/// Image identifier, meaningful only together with the tag it came from.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageName(String);

impl ImageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub async fn load_for_tag(
        client: &Client,
        tag: &Tag,
    ) -> NetResult<Vec<Self>> {
        info!("Fetching images tagged {tag:?}...");
        let raw: Vec<Value> =
            client.get_json(&["rest", "images", tag.as_str()]).await?;
        Ok(raw.iter().map(|v| Self(value_to_text(v))).collect())
    }

    pub async fn load_thumbnail(&self, client: &Client) -> NetResult<Vec<u8>> {
        client.get_bytes(&["rest", "thumbnail", self.as_str()]).await
    }

    pub async fn load_full(&self, client: &Client) -> NetResult<Vec<u8>> {
        info!("Fetching image {self:?}...");
        client.get_bytes(&["rest", "image", self.as_str()]).await
    }
}

impl std::fmt::Display for ImageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(default, deserialize_with = "lenient_string_deserialize")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_vec_deserialize")]
    pub tags: Vec<String>,
}

impl ImageDetail {
    pub async fn load(
        client: &Client,
        tag: &Tag,
        image: &ImageName,
    ) -> NetResult<Self> {
        info!("Fetching info for {image:?} under {tag:?}...");
        client
            .get_json(&["rest", "image", "info", tag.as_str(), image.as_str()])
            .await
    }

    /// Every tag prefixed with `#`, with nothing in between.
    pub fn tag_line_with(&self, render: impl Fn(&str) -> String) -> String {
        self.tags.iter().map(|t| format!("#{}", render(t))).join("")
    }
}
