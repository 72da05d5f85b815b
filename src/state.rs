use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::entities::Tag;
use crate::utils::{Client, NetResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct State {
    pub server_url: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub last_tag: Option<Tag>,
}

#[derive(Debug, Clone)]
pub enum StatePersistenceError {
    FileSystem,
    Format,
}

impl std::fmt::Display for StatePersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::FileSystem => "Failed to read/write a state file.",
            Self::Format => "State file format not recognized.",
        };
        msg.fmt(f)
    }
}

impl State {
    pub fn with_server_override(self, server_url: Option<String>) -> Self {
        match server_url {
            Some(url) => Self {
                server_url: Some(url),
                ..self
            },
            None => self,
        }
    }

    pub fn client(&self) -> Option<NetResult<Client>> {
        self.server_url.as_deref().map(Client::new)
    }
}

impl State {
    fn path() -> std::path::PathBuf {
        let mut path = if let Some(project_dirs) =
            directories_next::ProjectDirs::from("rs", "Iced", "tag-gallery")
        {
            project_dirs.data_dir().into()
        } else {
            std::env::current_dir().unwrap_or_default()
        };

        path.push("gallery.json");
        path
    }

    pub async fn load() -> Result<Box<Self>, StatePersistenceError> {
        let path = Self::path();
        debug!("Loading state from {}", path.display());
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| StatePersistenceError::FileSystem)?;
        Self::parse(&contents).map(Box::new)
    }

    fn parse(contents: &str) -> Result<Self, StatePersistenceError> {
        serde_json::from_str(contents)
            .map_err(|_| StatePersistenceError::Format)
    }

    pub async fn save(self) -> Result<(), StatePersistenceError> {
        // This takes ownership for easier async saving
        let json = serde_json::to_string_pretty(&self)
            .map_err(|_| StatePersistenceError::Format)?;

        let path = Self::path();

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|_| StatePersistenceError::FileSystem)?;
        }

        tokio::fs::write(&path, json.as_bytes())
            .await
            .map_err(|_| StatePersistenceError::FileSystem)?;
        info!("State saved to {}", path.display());

        Ok(())
    }
}
