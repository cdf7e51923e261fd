use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, Settings, DEFAULT_SETTINGS_FILE},
    EditorOutcome, EditorServices, FollowPackEditor, SearchOutcome,
};
use shared::{
    domain::{FollowListId, PublicKeyHex},
    identity::{hex_to_npub, parse_public_key},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "followpack", about = "Create, edit and delete follow packs")]
struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    service_url: Option<String>,
    /// npub or hex key of the signed-in user.
    #[arg(long)]
    session: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a follow pack as JSON.
    Show { id: String },
    /// Resolve an npub, hex key, NIP-05 identifier or search term.
    Resolve { query: String },
    /// Publish a new follow pack.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        cover: String,
        #[arg(long)]
        description: Option<String>,
        /// npub, hex key or NIP-05 identifier; repeat for each member, in order.
        #[arg(long = "member", required = true)]
        members: Vec<String>,
    },
    /// Change and republish one of your follow packs.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cover: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "add")]
        add: Vec<String>,
        #[arg(long = "remove")]
        remove: Vec<String>,
        /// Move the member at this position one place up.
        #[arg(long = "up")]
        up: Vec<usize>,
        /// Move the member at this position one place down.
        #[arg(long = "down")]
        down: Vec<usize>,
    },
    /// Delete one of your follow packs.
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

fn resolve_settings(args: &Args) -> Settings {
    let mut settings = load_settings(&args.config);
    if let Some(url) = &args.service_url {
        settings.service_url = url.clone();
    }
    if let Some(session) = &args.session {
        settings.session_identity = Some(session.clone());
    }
    settings
}

fn editor_error(editor: &FollowPackEditor) -> anyhow::Error {
    anyhow!(editor
        .state()
        .error
        .clone()
        .unwrap_or_else(|| "follow pack editor failed without a message".to_string()))
}

fn npub_or_hex(pubkey: &PublicKeyHex) -> String {
    hex_to_npub(pubkey).unwrap_or_else(|_| pubkey.to_string())
}

async fn add_member(editor: &mut FollowPackEditor, member: &str) -> Result<()> {
    editor.set_search_query(member);
    match editor.search().await {
        SearchOutcome::Added(pubkey) => {
            println!("added {}", npub_or_hex(&pubkey));
            Ok(())
        }
        SearchOutcome::AlreadyPresent(pubkey) => {
            println!("already in pack: {}", npub_or_hex(&pubkey));
            Ok(())
        }
        SearchOutcome::Results(count) => bail!(
            "'{member}' is a search term ({count} matches); pass an npub, hex key or NIP-05 identifier"
        ),
        SearchOutcome::Cleared => bail!("member identifier must not be empty"),
        SearchOutcome::Failed => Err(editor_error(editor)),
    }
}

fn remove_member(editor: &mut FollowPackEditor, member: &str) -> Result<()> {
    let pubkey = parse_public_key(member)?;
    let index = editor
        .state()
        .entries
        .iter()
        .position(|entry| entry.pubkey == pubkey)
        .ok_or_else(|| anyhow!("{member} is not in this follow pack"))?;
    editor.remove_entry(index);
    Ok(())
}

async fn publish(editor: &mut FollowPackEditor) -> Result<()> {
    match editor.submit().await {
        EditorOutcome::Navigate(route) => {
            println!("{}", route.path());
            Ok(())
        }
        EditorOutcome::Stay => Err(editor_error(editor)),
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = resolve_settings(&args);
    info!(service_url = %settings.service_url, "using follow pack gateway");
    let services = EditorServices::from_settings(&settings).context("failed to set up services")?;

    match args.command {
        Command::Show { id } => {
            let list = services
                .lists
                .get_follow_list_by_id(&FollowListId(id.clone()))
                .await?
                .ok_or_else(|| anyhow!("Follow pack not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Command::Resolve { query } => {
            let mut editor = FollowPackEditor::new(services);
            editor.set_search_query(query);
            match editor.search().await {
                SearchOutcome::Added(_) | SearchOutcome::AlreadyPresent(_) => {
                    for entry in &editor.state().entries {
                        println!(
                            "{}\t{}\t{}",
                            entry.pubkey,
                            npub_or_hex(&entry.pubkey),
                            entry.display_name()
                        );
                    }
                }
                SearchOutcome::Results(_) => {
                    for hit in &editor.state().search_results {
                        println!(
                            "{}\t{}\t{}",
                            hit.pubkey,
                            npub_or_hex(&hit.pubkey),
                            hit.name.as_deref().unwrap_or("")
                        );
                    }
                }
                SearchOutcome::Cleared => bail!("nothing to resolve"),
                SearchOutcome::Failed => return Err(editor_error(&editor)),
            }
        }
        Command::Create {
            name,
            cover,
            description,
            members,
        } => {
            let mut editor = FollowPackEditor::new(services);
            editor.open("").await;
            editor.set_name(name);
            editor.set_cover_image_url(cover);
            editor.set_description(description.unwrap_or_default());
            for member in &members {
                add_member(&mut editor, member).await?;
            }
            publish(&mut editor).await?;
        }
        Command::Edit {
            id,
            name,
            cover,
            description,
            add,
            remove,
            up,
            down,
        } => {
            let mut editor = FollowPackEditor::new(services);
            if !editor.load_for_edit(&FollowListId(id)).await {
                return Err(editor_error(&editor));
            }
            if let Some(name) = name {
                editor.set_name(name);
            }
            if let Some(cover) = cover {
                editor.set_cover_image_url(cover);
            }
            if let Some(description) = description {
                editor.set_description(description);
            }
            for member in &remove {
                remove_member(&mut editor, member)?;
            }
            for member in &add {
                add_member(&mut editor, member).await?;
            }
            for index in up {
                if !editor.move_up(index) {
                    bail!("cannot move member {index} up");
                }
            }
            for index in down {
                if !editor.move_down(index) {
                    bail!("cannot move member {index} down");
                }
            }
            publish(&mut editor).await?;
        }
        Command::Delete { id, yes } => {
            let mut editor = FollowPackEditor::new(services);
            if !editor.load_for_edit(&FollowListId(id)).await {
                return Err(editor_error(&editor));
            }
            editor.request_delete();
            if !yes {
                editor.cancel_delete();
                bail!(
                    "refusing to delete '{}' without --yes",
                    editor.state().name
                );
            }
            match editor.confirm_delete().await {
                EditorOutcome::Navigate(route) => println!("{}", route.path()),
                EditorOutcome::Stay => return Err(editor_error(&editor)),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse()).await
}
