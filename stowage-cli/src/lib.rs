//! Stowage command-line host.
//!
//! Drives a [`ContainerSession`] against a JSON asset file (the container
//! and everything stored with it) and a TOML type manifest. Each command
//! loads both, runs, and writes the asset back when it changed.

pub mod asset;
pub mod manifest;

pub use asset::AssetFile;
pub use manifest::{FilterSpec, TypeManifest};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use stowage_container::{
    AddOutcome, Admission, Container, ContainerConfig, ContainerSession, MemoryStorage,
    SyncReport,
};
use stowage_model::{ObjectId, SubObjectRef, TypeKey};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(about = "Inspect and edit Stowage composite assets")]
pub struct Args {
    /// Asset file (container and stored sub-objects, JSON)
    #[arg(short, long, default_value = "asset.json")]
    pub asset: PathBuf,

    /// Type manifest (TOML)
    #[arg(short, long, default_value = "types.toml")]
    pub types: PathBuf,

    /// Optional session config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create an empty asset
    Init {
        /// Container type key
        container_type: TypeKey,
        #[arg(long, default_value = "Asset")]
        name: String,
        /// Overwrite an existing asset file
        #[arg(long)]
        force: bool,
    },
    /// List items in container order
    List,
    /// Reconcile the item list with storage
    Sync,
    /// Create a sub-object of the given type
    Add { type_key: TypeKey },
    /// Destroy a sub-object
    Remove { id: ObjectId },
    /// Move an item before another, or to the end
    Move {
        id: ObjectId,
        #[arg(long)]
        before: Option<ObjectId>,
    },
    /// Check whether a type may be added
    CanAdd { type_key: TypeKey },
    /// Show the add-object menu
    Menu,
    /// Switch a sub-object's toggles on or off
    Toggle { id: ObjectId, state: ToggleState },
    /// Rename a sub-object
    Rename { id: ObjectId, name: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    On,
    Off,
}

/// Runs one command and returns the lines to print.
pub fn run(args: &Args) -> Result<Vec<String>> {
    let config = match &args.config {
        Some(path) => ContainerConfig::load_from(path),
        None => ContainerConfig::default(),
    };
    let registry = Arc::new(
        TypeManifest::load(&args.types)?.build_registry(config.max_hierarchy_depth)?,
    );

    if let Command::Init {
        container_type,
        name,
        force,
    } = &args.command
    {
        if args.asset.exists() && !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                args.asset.display()
            );
        }
        let session = ContainerSession::with_config(MemoryStorage::new(), registry, config);
        let container = session.create_container(container_type, name.as_str())?;
        let lines = vec![format!("created {} {}", container.type_key(), container.id())];
        AssetFile {
            container,
            storage: session.into_storage(),
        }
        .save(&args.asset)?;
        info!("Initialized asset {:?}", args.asset);
        return Ok(lines);
    }

    let AssetFile {
        mut container,
        storage,
    } = AssetFile::load(&args.asset)?;
    let mut session = ContainerSession::with_config(storage, registry, config);
    let mut out = Vec::new();

    let dirty = match &args.command {
        Command::Init { .. } => false,
        Command::List => {
            list(&session, &container, &mut out);
            false
        }
        Command::Sync => {
            let report = session.sync(&mut container);
            describe_report(&report, &mut out);
            !report.is_empty()
        }
        Command::Add { type_key } => match session.add_object(&mut container, type_key)? {
            AddOutcome::Added { item, .. } => {
                out.push(format!("added {} {}", item.type_key(), item.id()));
                true
            }
            AddOutcome::Rejected(rejection) => bail!("cannot add: {rejection}"),
        },
        Command::Remove { id } => {
            let item = find_item(&container, *id)?;
            let report = session.remove_object(&mut container, &item)?;
            describe_report(&report, &mut out);
            true
        }
        Command::Move { id, before } => {
            let item = find_item(&container, *id)?;
            let target = before.map(|b| find_item(&container, b)).transpose()?;
            let outcome = session.move_object(&mut container, &item, target.as_ref());
            out.push(if outcome.moved {
                format!("moved {}", item.id())
            } else {
                "order unchanged".to_string()
            });
            outcome.moved || !outcome.report.is_empty()
        }
        Command::CanAdd { type_key } => {
            match session.can_add(&container, type_key) {
                Admission::Allowed => out.push(format!("{type_key}: allowed")),
                Admission::Rejected(rejection) => {
                    out.push(format!("{type_key}: rejected, {rejection}"));
                }
            }
            false
        }
        Command::Menu => {
            for item in session.addable_types(&container) {
                out.push(format!("{}\t{}", item.title, item.type_key));
            }
            false
        }
        Command::Toggle { id, state } => {
            let item = find_item(&container, *id)?;
            let enabled = *state == ToggleState::On;
            let written = session.set_enabled(&item, enabled)?;
            if written == 0 {
                bail!("{} has no writable toggle fields", item.id());
            }
            out.push(format!(
                "{} {} ({written} field{})",
                item.id(),
                if enabled { "on" } else { "off" },
                if written == 1 { "" } else { "s" }
            ));
            true
        }
        Command::Rename { id, name } => {
            let item = find_item(&container, *id)?;
            session.rename_object(&item, name)?;
            out.push(format!("renamed {}", item.id()));
            true
        }
    };

    if dirty {
        AssetFile {
            container,
            storage: session.into_storage(),
        }
        .save(&args.asset)
        .context("failed to save asset")?;
    }
    Ok(out)
}

fn find_item(container: &Container, id: ObjectId) -> Result<SubObjectRef> {
    container
        .references()
        .find(|r| r.id() == id)
        .cloned()
        .ok_or_else(|| anyhow!("no item {id} in container {}", container.id()))
}

fn list(session: &ContainerSession<MemoryStorage>, container: &Container, out: &mut Vec<String>) {
    out.push(format!(
        "{} ({}) {}",
        container.name(),
        container.type_key(),
        container.id()
    ));
    let missing: Vec<usize> = session
        .missing_items(container)
        .into_iter()
        .map(|m| m.index)
        .collect();

    for (index, slot) in container.items().iter().enumerate() {
        let line = match slot {
            Some(item) if !missing.contains(&index) => match session.resolve(item) {
                Some(object) => {
                    let mut flags = Vec::new();
                    if object.hidden {
                        flags.push("hidden");
                    }
                    if !session.toggle_fields(item).unwrap_or_default().is_empty() {
                        flags.push(if session.is_enabled(item).unwrap_or(false) {
                            "on"
                        } else {
                            "off"
                        });
                    }
                    let flags = if flags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", flags.join(", "))
                    };
                    format!("{index}: {} ({}) {}{flags}", object.name, item.type_key(), item.id())
                }
                None => format!("{index}: <missing> {}", item.id()),
            },
            Some(item) => format!("{index}: <missing> {}", item.id()),
            None => format!("{index}: <unresolved>"),
        };
        out.push(line);
    }
}

fn describe_report(report: &SyncReport, out: &mut Vec<String>) {
    for item in &report.added {
        out.push(format!("+ {} {}", item.type_key(), item.id()));
    }
    for slot in &report.removed {
        match slot {
            Some(item) => out.push(format!("- {} {}", item.type_key(), item.id())),
            None => out.push("- <unresolved>".to_string()),
        }
    }
}
