use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use quiz_config::{Config, LoadOptions};
use quiz_edit_core::diff::build_unified_diff;
use quiz_edit_core::fs::write_atomic;
use quiz_edit_core::{
    EditError, ExitCode, ExportView, SelectionPolicy, Session, SessionOptions,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Markdown question bank editor", long_about = None)]
struct Cli {
    /// Path to the question bank
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Configuration file to apply on top of discovered ones
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Suppress informational output (diffs, success messages)
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Disable backup creation when writing the bank back
    #[arg(long = "no-backup", global = true)]
    no_backup: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List blocks with their option shape
    List,

    /// Split one-line four-option items into separate lines
    Repair {
        /// Only repair this block (1-based)
        #[arg(long = "block", value_name = "N")]
        block: Option<String>,

        /// Print diff without writing changes
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Select options on a block and strip its answer and analysis lines
    Select {
        /// Block to edit (1-based)
        #[arg(long = "block", value_name = "N")]
        block: String,

        /// Option keys, 1-4 or A-D, applied in order
        #[arg(long = "key", value_name = "KEY", num_args = 1.., required = true)]
        keys: Vec<String>,

        /// Override the configured selection policy
        #[arg(long = "policy", value_enum)]
        policy: Option<PolicyArg>,

        /// Print diff without writing changes
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Write one view of every block, separated by `---`
    Export {
        /// View to export (defaults to the configured view)
        #[arg(long = "view", value_enum)]
        view: Option<ViewArg>,

        /// Write to PATH instead of stdout
        #[arg(long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Single,
    Multi,
}

impl From<PolicyArg> for SelectionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Single => SelectionPolicy::Single,
            PolicyArg::Multi => SelectionPolicy::Multi,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewArg {
    Quoted,
    Unquoted,
    Raw,
}

impl From<ViewArg> for ExportView {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Quoted => ExportView::Quoted,
            ViewArg::Unquoted => ExportView::Unquoted,
            ViewArg::Raw => ExportView::Raw,
        }
    }
}

fn main() -> std::process::ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(exit) => std::process::ExitCode::from(exit as u8),
        Err(err) => {
            handle_error(&cli, &err);
            std::process::ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, EditError> {
    let config = load_config(cli)?;
    let mut options = SessionOptions::from_config(&config);
    if let Command::Select {
        policy: Some(policy),
        ..
    } = &cli.command
    {
        options = options.with_policy((*policy).into());
    }

    let mut session = Session::open(&cli.file, options)?;
    if session.is_empty() {
        return Err(EditError::NotFound);
    }

    match &cli.command {
        Command::List => {
            list(&session);
            Ok(ExitCode::Success)
        }
        Command::Repair { block, dry_run } => {
            let repaired = match block {
                Some(input) => {
                    session.jump(input)?;
                    usize::from(session.repair_current()?)
                }
                None => session.repair_all(),
            };
            log::info!("{repaired} block(s) repaired");
            write_back(cli, &session, *dry_run)
        }
        Command::Select {
            block,
            keys,
            dry_run,
            ..
        } => {
            session.jump(block)?;
            for key in keys {
                let changed = session.select_key(key)?;
                log::debug!("key {key}: changed={changed}");
            }
            let exit = write_back(cli, &session, *dry_run)?;
            if !dry_run && session.options().autosave {
                let target = session.autosave(&cli.file)?;
                if !cli.quiet {
                    println!("Autosaved {}", target.display());
                }
            }
            Ok(exit)
        }
        Command::Export { view, output } => {
            let view = view
                .map(ExportView::from)
                .unwrap_or(session.options().export_view);
            if output.as_deref() == Some(cli.file.as_path()) {
                return Err(EditError::InvalidArguments(
                    "--output must not overwrite the question bank itself".to_string(),
                ));
            }
            let text = session.export(view);
            match output {
                Some(path) => {
                    write_atomic(path, &text, false)?;
                    if !cli.quiet {
                        println!("Exported {} view to {}", view, path.display());
                    }
                }
                None => {
                    print!("{text}");
                    io::stdout().flush().ok();
                }
            }
            Ok(ExitCode::Success)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, EditError> {
    let mut load = LoadOptions::default().with_working_dir(document_dir(&cli.file));
    if let Some(path) = &cli.config {
        let path = if path.is_relative() {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.clone())
        } else {
            path.clone()
        };
        load = load.with_override_path(path);
    }

    let config = Config::load(load)?;
    for layer in &config.sources.layers {
        if let Some(path) = &layer.path {
            log::debug!("using {} from {}", layer.kind, path.display());
        }
    }
    Ok(config)
}

fn document_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn list(session: &Session) {
    for block in session.blocks() {
        println!(
            "{:>3}  {:<12}  {}",
            block.index(),
            block.shape().as_str(),
            session.title(block)
        );
        if let Some(reason) = block.shape().reason() {
            println!("     {reason}");
        }
    }
}

fn write_back(cli: &Cli, session: &Session, dry_run: bool) -> Result<ExitCode, EditError> {
    let rendered = session.render_checked()?;
    let diff = build_unified_diff(
        session.document(),
        &rendered,
        &cli.file.display().to_string(),
    );

    if dry_run {
        if !cli.quiet {
            match &diff {
                Some(diff) => {
                    print!("{diff}");
                    io::stdout().flush().ok();
                }
                None => println!("No changes (dry run)"),
            }
        }
        return Ok(ExitCode::Success);
    }

    if !session.is_modified() {
        if !cli.quiet {
            println!("No changes.");
        }
        return Ok(ExitCode::Success);
    }

    write_atomic(&cli.file, &rendered, !cli.no_backup)?;
    if !cli.quiet {
        if let Some(diff) = &diff {
            print!("{diff}");
        }
        println!("Updated {}", cli.file.display());
    }
    Ok(ExitCode::Success)
}

fn handle_error(cli: &Cli, err: &EditError) {
    match err {
        EditError::NotFound => {
            eprintln!("No question blocks found in {}.", cli.file.display());
        }
        EditError::Select(select) => {
            eprintln!("Selection rejected: {select}");
        }
        EditError::Session(session) => {
            eprintln!("Invalid block: {session}");
        }
        EditError::Config(config) => {
            eprintln!("{config}");
        }
        EditError::InvalidArguments(message)
        | EditError::InvalidInput(message)
        | EditError::Validation(message) => {
            eprintln!("{message}");
        }
        EditError::Io { .. } => {
            eprintln!("I/O error: {err}");
        }
    }
}
