//! Command-line surface.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::debug;

use crate::app::bind::{self, BindOutcome, BindRequest};
use crate::app::selection::{SelectionMode, SelectionStore};
use crate::app::session::StateStore;
use crate::domain::model::RenderConfig;
use crate::infra::config::Config;
use crate::infra::display::{ClipboardSink, DocumentSink, EditorSink, StatusSink};
use crate::infra::git::workspace_root;
use crate::infra::picker::{ArgsPicker, PathPicker, PromptPicker};

#[derive(Parser, Debug)]
#[command(
    name = "codebind",
    version,
    about = "Bind selected files and folders into one text artifact"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick paths and write the combined artifact
    Bind(BindArgs),
    /// Inspect or reset the persisted selection
    Selection {
        #[command(subcommand)]
        action: SelectionAction,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SelectionAction {
    /// List the persisted selection
    Show(WorkspaceArgs),
    /// Forget the persisted selection
    Clear(WorkspaceArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    /// Workspace root (defaults to the enclosing git work tree, then the current directory)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BindArgs {
    /// Files and folders to bind; without any, the persisted selection is reused
    pub paths: Vec<PathBuf>,

    /// How picked paths are merged into the persisted selection
    #[arg(long, value_enum, default_value_t = SelectionMode::Replace)]
    pub mode: SelectionMode,

    /// Prompt for files and folders interactively
    #[arg(short, long, conflicts_with = "paths")]
    pub interactive: bool,

    /// Comma-separated extensions captured from selected folders
    #[arg(long, value_name = "EXTS")]
    pub include: Option<String>,

    /// Comma-separated extensions skipped in selected folders
    #[arg(long, value_name = "EXTS")]
    pub exclude: Option<String>,

    /// Text placed before everything else
    #[arg(long, value_name = "TEXT")]
    pub prepend: Option<String>,

    /// Text placed after everything else
    #[arg(long, value_name = "TEXT")]
    pub append: Option<String>,

    /// Output file, relative to the workspace root
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Use full paths in file headers
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub full_path: Option<bool>,

    /// Emit the folder structure block
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub folder_structure: Option<bool>,

    /// Open the artifact in $VISUAL / $EDITOR
    #[arg(long)]
    pub open: bool,

    /// Copy the artifact to the clipboard
    #[arg(long)]
    pub clip: bool,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Bind(args) => run_bind(args),
        Command::Selection { action } => run_selection(action),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "codebind", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_bind(args: BindArgs) -> Result<()> {
    let root = workspace_root(args.workspace.workspace.as_deref())?;
    let mut config = Config::load(&root)?;
    apply_overrides(&mut config, &args);

    let request = BindRequest {
        mode: args.mode,
        filter: config.filter.to_spec(),
        render: RenderConfig {
            prepend_text: config.output.prepend_text(),
            append_text: config.output.append_text(),
            output_path: config.output.resolve_path(&root),
            print_full_path: config.output.print_full_path(),
            print_folder_structure: config.output.print_folder_structure(),
            workspace_root: root.clone(),
        },
    };

    let cwd = env::current_dir().context("unable to determine working directory")?;
    let mut picker: Box<dyn PathPicker> = if args.interactive {
        Box::new(PromptPicker::new(cwd))
    } else {
        Box::new(ArgsPicker::new(args.paths.clone(), &cwd))
    };

    let mut sinks: Vec<Box<dyn DocumentSink>> = vec![Box::new(StatusSink)];
    if args.open {
        sinks.push(Box::new(EditorSink::from_env()?));
    }
    if args.clip {
        sinks.push(Box::new(ClipboardSink::new()));
    }

    let mut store = open_store(&root)?;
    match bind::run(&mut store, picker.as_mut(), &mut sinks, &request)? {
        BindOutcome::NothingSelected => {
            println!("Nothing selected: pass files or folders, or use --interactive");
        }
        BindOutcome::Written { .. } => {}
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &BindArgs) {
    if let Some(include) = &args.include {
        config.filter.set_include_extensions(include.clone());
    }
    if let Some(exclude) = &args.exclude {
        config.filter.set_exclude_extensions(exclude.clone());
    }
    if let Some(prepend) = &args.prepend {
        config.output.set_prepend_text(prepend.clone());
    }
    if let Some(append) = &args.append {
        config.output.set_append_text(append.clone());
    }
    if let Some(output) = &args.output {
        config.output.set_file_name(output.clone());
    }
    if let Some(full_path) = args.full_path {
        config.output.set_print_full_path(full_path);
    }
    if let Some(folder_structure) = args.folder_structure {
        config.output.set_print_folder_structure(folder_structure);
    }
}

fn open_store(root: &Path) -> Result<SelectionStore<StateStore>> {
    let state = StateStore::new(root);
    debug!(state = %state.path().display(), "opening selection state");
    SelectionStore::open(state)
}

fn run_selection(action: SelectionAction) -> Result<()> {
    match action {
        SelectionAction::Show(args) => {
            let root = workspace_root(args.workspace.as_deref())?;
            let store = open_store(&root)?;
            if store.is_empty() {
                println!("No paths selected");
            }
            for path in store.selection() {
                println!("{}", path.display());
            }
        }
        SelectionAction::Clear(args) => {
            let root = workspace_root(args.workspace.as_deref())?;
            let mut store = open_store(&root)?;
            let count = store.len();
            store.clear().context("failed to clear the persisted selection")?;
            println!("Cleared {count} selected path(s)");
        }
    }
    Ok(())
}
