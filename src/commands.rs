use crate::builder::FlagProvider;
use crate::error::{FlagError, Result};
use crate::hasher::{Hasher, HASH_FILE};
use crate::packages::{MetadataTool, PkgConfig};
use crate::parser::{self, FlagsConfig, CONFIG_FILE};
use crate::utils::log::{log, LogLevel};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const FLAGS_TXT: &str = "compile_flags.txt";
pub const COMPILE_COMMANDS: &str = "compile_commands.json";

lazy_static! {
    static ref SOURCE_EXTENSIONS: HashSet<&'static str> =
        ["c", "cc", "cpp", "cxx", "c++", "m", "mm"].into_iter().collect();
}

/// One entry of a `compile_commands.json` database
#[derive(Debug, Serialize, PartialEq)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    pub arguments: Vec<String>,
}

/// Loads the project config and builds its provider with the configured `pkg-config`
/// # Arguments
/// * `dir` - The project directory
/// * `config_path` - Explicit config file, if any
/// * `fallback_literal` - On a build failure, log it and keep only the literal flags
pub fn load_provider(
    dir: &Path,
    config_path: Option<&Path>,
    fallback_literal: bool,
) -> Result<(FlagsConfig, FlagProvider)> {
    let config = parser::locate_config(dir, config_path)?;
    let tool = PkgConfig::new(&config.packages.tool);
    let provider = build_provider(&config, &tool, fallback_literal)?;
    Ok((config, provider))
}

/// Builds the provider for an already loaded config with the given tool
pub fn build_provider(
    config: &FlagsConfig,
    tool: &dyn MetadataTool,
    fallback_literal: bool,
) -> Result<FlagProvider> {
    match FlagProvider::initialize(config, tool) {
        Ok(provider) => Ok(provider),
        Err(err) if fallback_literal => {
            log(LogLevel::Warn, &format!("{}", err));
            log(LogLevel::Warn, "Falling back to the literal flags");
            Ok(FlagProvider::literal(config))
        }
        Err(err) => Err(err),
    }
}

/// Renders the completion engine reply for `file` as JSON
pub fn flags_json(provider: &FlagProvider, file: &Path) -> Result<String> {
    log(LogLevel::Debug, &format!("Flags requested for {}", file.display()));
    Ok(serde_json::to_string_pretty(&provider.flags_for_file(file))?)
}

/// Renders the flags one per line
pub fn flags_lines(provider: &FlagProvider) -> String {
    let mut out = String::new();
    for flag in provider.flags() {
        out.push_str(flag);
        out.push('\n');
    }
    out
}

/// Writes `compile_flags.txt` into the project directory.
/// Returns false if the file was already up to date.
pub fn gen_flags(provider: &FlagProvider, force: bool) -> Result<bool> {
    let output = provider.dir().join(FLAGS_TXT);
    write_output(provider.dir(), &output, &flags_lines(provider), force)
}

/// Builds the compile database entries, one per source file
/// # Arguments
/// * `config` - The project config, its walk roots are scanned when `files` is empty
/// * `provider` - Supplies the shared flag list
/// * `files` - Explicit files to describe
pub fn compile_commands(
    config: &FlagsConfig,
    provider: &FlagProvider,
    files: &[PathBuf],
) -> Result<Vec<CompileCommand>> {
    let files = if files.is_empty() {
        let mut found = Vec::new();
        for root in &config.walk.roots {
            found.extend(source_files(provider.dir(), root)?);
        }
        found
    } else {
        files.to_vec()
    };
    let compiler = if config.base.language == "c" { "clang" } else { "clang++" };
    let directory = provider.dir().display().to_string();

    Ok(files
        .iter()
        .map(|file| {
            let file = file.display().to_string();
            let mut arguments = Vec::with_capacity(provider.flags().len() + 3);
            arguments.push(compiler.to_string());
            arguments.extend(provider.flags_for_file(&file).flags.iter().cloned());
            arguments.push("-c".to_string());
            arguments.push(file.clone());
            CompileCommand {
                directory: directory.clone(),
                file,
                arguments,
            }
        })
        .collect())
}

/// Writes `compile_commands.json` into the project directory.
/// Returns false if the file was already up to date.
pub fn gen_cc(
    config: &FlagsConfig,
    provider: &FlagProvider,
    files: &[PathBuf],
    force: bool,
) -> Result<bool> {
    let commands = compile_commands(config, provider, files)?;
    log(
        LogLevel::Info,
        &format!("{} entries in {}", commands.len(), COMPILE_COMMANDS),
    );
    let contents = serde_json::to_string_pretty(&commands)?;
    let output = provider.dir().join(COMPILE_COMMANDS);
    write_output(provider.dir(), &output, &contents, force)
}

/// Source files under `root`, spelled relative to the project directory
fn source_files(base: &Path, root: &str) -> Result<Vec<PathBuf>> {
    let walk_root = base.join(root);
    let mut files = Vec::new();
    for entry in WalkDir::new(&walk_root).sort_by_file_name() {
        let entry = entry.map_err(|source| FlagError::Walk {
            root: root.to_string(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_source = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| SOURCE_EXTENSIONS.contains(ext));
        if !is_source {
            continue;
        }
        let rel = entry.path().strip_prefix(&walk_root).unwrap_or(entry.path());
        files.push(Path::new(root).join(rel));
    }
    Ok(files)
}

/// Writes a generated file unless its recorded hash says it is unchanged
fn write_output(dir: &Path, output: &Path, contents: &str, force: bool) -> Result<bool> {
    let hash_path = dir.join(HASH_FILE);
    let mut hashes = Hasher::load_hashes_from_file(&hash_path);
    let hash = Hasher::hash_string(contents);
    if !force && !Hasher::is_output_changed(output, &hash, &hashes) {
        return Ok(false);
    }
    fs::write(output, contents).map_err(|source| FlagError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Hasher::save_hash(output, &hash, &mut hashes);
    Hasher::save_hashes_to_file(&hash_path, &hashes)?;
    log(LogLevel::Log, &format!("Wrote {}", output.display()));
    Ok(true)
}

/// Writes a sample `ycm_flags.toml` carrying the built-in values
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        log(LogLevel::Error, &format!("{} already exists", path.display()));
        return Err(FlagError::AlreadyExists(path));
    }
    fs::write(&path, parser::sample_config()).map_err(|source| FlagError::Write {
        path: path.clone(),
        source,
    })?;
    log(LogLevel::Log, &format!("Config {} initialised", path.display()));
    Ok(path)
}
