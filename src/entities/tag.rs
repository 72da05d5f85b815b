use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{value_to_text, Client, NetResult};

/// Category label as the server spells it.
///
/// Never escaped: this is the lookup key sent back to the server.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub async fn load_all(client: &Client) -> NetResult<Vec<Self>> {
        info!("Fetching image tags...");
        let raw: Vec<Value> = client.get_json(&["rest", "image-tags"]).await?;
        Ok(Self::from_values(&raw))
    }

    fn from_values(values: &[Value]) -> Vec<Self> {
        values.iter().map(|v| Self(value_to_text(v))).collect()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::Tag;

    #[test]
    fn test_from_values_keeps_order() {
        let raw = json!(["night", "<b>", 2020, null]);
        let tags = Tag::from_values(raw.as_array().unwrap());
        assert_eq!(
            tags,
            vec![
                Tag::new("night"),
                Tag::new("<b>"),
                Tag::new("2020"),
                Tag::new("null"),
            ]
        );
    }

    #[test]
    fn test_persisted_as_plain_string() {
        let tag = Tag::new("sea & sky");
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"sea & sky\"");
    }
}
