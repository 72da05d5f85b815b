#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

use crate::entities::{ImageDetail, ImageName, Tag};
use crate::state::State;
use crate::utils::{Client, NetResult};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Base URL of the gallery server, e.g. http://localhost:8080/gallery
    #[arg(long, short, env = "GALLERY_SERVER", global = true)]
    pub server: Option<String>,
    #[clap(subcommand)]
    subcommand: Option<SubCommand>,
}

#[derive(Debug, Default, Subcommand)]
pub enum SubCommand {
    #[default]
    #[clap(about = "Launch the GUI")]
    Start,
    #[clap(about = "List available tags")]
    Tags,
    #[clap(about = "List images under a tag")]
    Images { tag: String },
    #[clap(about = "Show description and tags of an image")]
    Info { tag: String, image: String },
}

impl CliArgs {
    pub fn run(&self) -> Option<i32> {
        //! Returns None if not given a CLI command, exit code otherwise.
        let command = match self.subcommand.as_ref() {
            None | Some(SubCommand::Start) => return None,
            Some(command) => command,
        };
        match run_headless(self.server.clone(), command) {
            Ok(lines) => {
                for line in lines {
                    println!("{line}");
                }
                Some(0)
            }
            Err(err) => {
                eprintln!("{err}");
                Some(1)
            }
        }
    }
}

fn run_headless(
    server: Option<String>,
    command: &SubCommand,
) -> Result<Vec<String>, String> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime.block_on(async {
        let state = State::load()
            .await
            .map(|s| *s)
            .unwrap_or_default()
            .with_server_override(server);
        let client = match state.client() {
            Some(client) => client.map_err(|e| e.to_string())?,
            None => {
                return Err("No server configured. Pass --server or connect \
                     from the GUI first."
                    .to_owned())
            }
        };
        execute(&client, command).await.map_err(|e| e.to_string())
    })
}

/// Plain text output: nothing here ends up in markup, so no escaping.
async fn execute(
    client: &Client,
    command: &SubCommand,
) -> NetResult<Vec<String>> {
    Ok(match command {
        SubCommand::Start => vec![],
        SubCommand::Tags => Tag::load_all(client)
            .await?
            .iter()
            .map(Tag::to_string)
            .collect(),
        SubCommand::Images { tag } => {
            ImageName::load_for_tag(client, &Tag::new(tag.as_str()))
                .await?
                .iter()
                .map(ImageName::to_string)
                .collect()
        }
        SubCommand::Info { tag, image } => {
            let detail = ImageDetail::load(
                client,
                &Tag::new(tag.as_str()),
                &ImageName::new(image.as_str()),
            )
            .await?;
            vec![
                detail.description.clone(),
                detail.tag_line_with(str::to_owned),
            ]
        }
    })
}
