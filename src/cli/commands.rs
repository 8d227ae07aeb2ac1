//! Command dispatch: each subcommand maps onto one ForestService call

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::render::render_forest;
use crate::application::services::{ForestService, Operation, Outcome};
use crate::cli::args::{Cli, Commands, ConfigCommands, MutateArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeDescription, Tree};
use crate::infrastructure::traits::RealFileSystem;
use crate::infrastructure::InfraError;

/// Execute the parsed command with the resolved settings.
pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let service = ForestService::new(Arc::new(RealFileSystem), settings.tree.clone());

    match &cli.command {
        Some(Commands::Show { file }) => cmd_show(&service, file),
        Some(Commands::Normalize { file, write }) => {
            cmd_normalize(&service, settings, file, *write)
        }
        Some(Commands::Check(args)) => cmd_mutate(&service, settings, args, Operation::Check),
        Some(Commands::Uncheck(args)) => cmd_mutate(&service, settings, args, Operation::Uncheck),
        Some(Commands::Toggle(args)) => cmd_mutate(&service, settings, args, Operation::Toggle),
        Some(Commands::Expand(args)) => cmd_mutate(&service, settings, args, Operation::Expand),
        Some(Commands::Collapse(args)) => {
            cmd_mutate(&service, settings, args, Operation::Collapse)
        }
        Some(Commands::Click(args)) => cmd_mutate(&service, settings, args, Operation::Click),
        Some(Commands::Get { file, id }) => cmd_get(&service, file, id),
        Some(Commands::Config { command }) => cmd_config(settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "treehouse", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `treehouse --help`".to_string(),
        )),
    }
}

fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::io("write to stdout", e).into())
}

#[instrument(level = "debug", skip(service))]
fn cmd_show(service: &ForestService, file: &Path) -> CliResult<()> {
    let tree = service.open(file)?;
    if tree.is_empty() {
        output::info("(empty)");
        return Ok(());
    }
    write_stdout(&render_forest(&tree))
}

fn emit_forest(
    service: &ForestService,
    settings: &Settings,
    file: &Path,
    forest: &[NodeDescription],
    write: bool,
) -> CliResult<()> {
    if write {
        service.save(file, forest, settings.pretty)?;
        output::success(&format!("wrote {}", file.display()));
        Ok(())
    } else {
        let mut json = NodeDescription::forest_to_json(forest, settings.pretty)
            .map_err(crate::application::ApplicationError::from)?;
        json.push('\n');
        write_stdout(&json)
    }
}

#[instrument(level = "debug", skip(service, settings))]
fn cmd_normalize(
    service: &ForestService,
    settings: &Settings,
    file: &Path,
    write: bool,
) -> CliResult<()> {
    let tree = service.open(file)?;
    emit_forest(service, settings, file, &tree.to_serializable(), write)
}

fn cmd_mutate(
    service: &ForestService,
    settings: &Settings,
    args: &MutateArgs,
    operation: fn(String) -> Operation,
) -> CliResult<()> {
    let operations: Vec<Operation> = args.ids.iter().cloned().map(operation).collect();
    debug!("mutate {}: {:?}", args.file.display(), operations);

    let Outcome { forest, events } = service.apply(&args.file, &operations)?;

    if args.events {
        output::header("events");
        for record in &events {
            let subject = match &record.id {
                Some(id) => format!("{} ({})", id, record.label),
                None => record.label.clone(),
            };
            output::event(&record.event, &subject);
        }
    }
    emit_forest(service, settings, &args.file, &forest, args.write)
}

#[instrument(level = "debug", skip(service))]
fn cmd_get(service: &ForestService, file: &Path, id: &str) -> CliResult<()> {
    let tree: Tree = service.open(file)?;
    let key = ForestService::resolve(&tree, id)?;
    let node = tree
        .node(key)
        .ok_or_else(|| CliError::Usage(format!("node {} vanished", id)))?;

    output::field("label", node.label());
    if let Some(node_id) = node.id() {
        output::field("id", node_id);
        output::field("checked", &node.is_checked());
    }
    output::field("depth", &node.depth());
    if node.has_children() {
        output::field("expanded", &node.is_expanded());
        output::field("children", &node.children().map(|child| child.label()).join(", "));
    }
    if let Some(parent) = node.parent() {
        output::field("parent", parent.label());
    }
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&path.display()),
                None => output::info("no config directory available on this platform"),
            }
            Ok(())
        }
    }
}
