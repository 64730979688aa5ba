use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ycmflags::commands;
use ycmflags::utils::log::{log, set_log_level, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "ycmflags", version)]
#[command(about = "Compile flags for semantic completion of C and C++ projects", long_about = None)]
struct Args {
    /// Project directory
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Config file to use instead of <dir>/ycm_flags.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep only the literal flags if a package query or walk fails
    #[arg(long)]
    fallback_literal: bool,

    /// Log level (Debug, Info, Log, Warn, Error), overrides YCMFLAGS_LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the completion engine reply for a file as JSON
    Flags {
        /// The file being completed
        file: PathBuf,
    },
    /// Print the flags, one per line
    List,
    /// Write compile_flags.txt into the project directory
    GenFlags {
        /// Rewrite even if unchanged
        #[arg(short, long)]
        force: bool,
    },
    /// Write compile_commands.json into the project directory
    GenCc {
        /// Files to describe, defaults to every source under the walk roots
        files: Vec<PathBuf>,
        /// Rewrite even if unchanged
        #[arg(short, long)]
        force: bool,
    },
    /// Write a sample ycm_flags.toml into the project directory
    Init,
}

fn run(args: Args) -> ycmflags::Result<()> {
    let load = || commands::load_provider(&args.dir, args.config.as_deref(), args.fallback_literal);
    match args.command {
        Cmd::Init => {
            commands::init_config(&args.dir)?;
        }
        Cmd::Flags { file } => {
            let (_, provider) = load()?;
            println!("{}", commands::flags_json(&provider, &file)?);
        }
        Cmd::List => {
            let (_, provider) = load()?;
            print!("{}", commands::flags_lines(&provider));
        }
        Cmd::GenFlags { force } => {
            let (_, provider) = load()?;
            commands::gen_flags(&provider, force)?;
        }
        Cmd::GenCc { files, force } => {
            let (config, provider) = load()?;
            commands::gen_cc(&config, &provider, &files, force)?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Some(level) = &args.log_level {
        set_log_level(LogLevel::from_name(level));
    }
    if let Err(err) = run(args) {
        log(LogLevel::Error, &format!("{}", err));
        std::process::exit(1);
    }
}
