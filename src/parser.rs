//! Parsing Module

use crate::error::{FlagError, Result};
use crate::utils::log::{log, LogLevel};
use directories::ProjectDirs;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Name of the per-project configuration file
pub const CONFIG_FILE: &str = "ycm_flags.toml";

const DEFAULT_DEFINES: [&str; 7] = [
    "LINUX=1",
    "DEBUG=1",
    "_DEBUG=1",
    "DONT_SET_USING_JUCE_NAMESPACE=1",
    "JUCER_LINUX_MAKE_6D53C8B4=1",
    "JUCE_APP_VERSION=0.0.8.10",
    "JUCE_APP_VERSION_HEX=0x80a",
];
const DEFAULT_LIBS: [&str; 4] = ["crypto", "dl", "pthread", "rt"];
const DEFAULT_INCLUDE_DIRS: [&str; 2] = ["./JuceLibraryCode", "./deps/JUCE/modules"];
const DEFAULT_PACKAGES: [&str; 9] = [
    "NetworkManager",
    "libnm-glib",
    "alsa",
    "freetype2",
    "libssl",
    "gio-2.0",
    "x11",
    "xext",
    "xinerama",
];
const DEFAULT_ROOTS: [&str; 2] = ["./Source", "./Tests"];

/// Struct describing the whole flag configuration of a project
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FlagsConfig {
    /// Absolute directory relative include flags are resolved against
    pub dir: PathBuf,
    pub base: BaseFlags,
    pub packages: PackageConfig,
    pub walk: WalkConfig,
}

/// Struct describing the literal flags emitted before anything discovered
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct BaseFlags {
    pub std: String,
    pub language: String,
    pub completer: String,
    pub threading: String,
    pub defines: Vec<String>,
    pub libs: Vec<String>,
    pub include_dirs: Vec<String>,
}

/// Struct describing the packages queried through the metadata tool
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PackageConfig {
    pub tool: String,
    pub names: Vec<String>,
    pub skip_empty_tokens: bool,
}

/// Struct describing the source trees turned into include flags
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct WalkConfig {
    pub roots: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for BaseFlags {
    fn default() -> Self {
        BaseFlags {
            std: "gnu++14".to_string(),
            language: "c++".to_string(),
            completer: "./ClangCompleter".to_string(),
            threading: "-pthread".to_string(),
            defines: owned(&DEFAULT_DEFINES),
            libs: owned(&DEFAULT_LIBS),
            include_dirs: owned(&DEFAULT_INCLUDE_DIRS),
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        PackageConfig {
            tool: "pkg-config".to_string(),
            names: owned(&DEFAULT_PACKAGES),
            skip_empty_tokens: false,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            roots: owned(&DEFAULT_ROOTS),
        }
    }
}

impl BaseFlags {
    /// Renders the literal flags in their fixed order.
    /// `std` and `language` are always emitted. An empty `completer` or
    /// `threading` leaves that flag out, so a config can drop the
    /// completer token or `-pthread` without emitting an empty argument.
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        flags.push(format!("-std={}", self.std));
        flags.push("-x".to_string());
        flags.push(self.language.clone());
        if !self.completer.is_empty() {
            flags.push(self.completer.clone());
        }
        if !self.threading.is_empty() {
            flags.push(self.threading.clone());
        }
        flags.extend(self.defines.iter().map(|define| format!("-D{}", define)));
        flags.extend(self.libs.iter().map(|lib| format!("-l{}", lib)));
        flags.extend(self.include_dirs.iter().map(|dir| format!("-I{}", dir)));
        flags
    }
}

impl FlagsConfig {
    /// Built-in configuration anchored at `dir`
    pub fn default_in(dir: &Path) -> Result<FlagsConfig> {
        Ok(FlagsConfig {
            dir: canonical_dir(dir)?,
            base: BaseFlags::default(),
            packages: PackageConfig::default(),
            walk: WalkConfig::default(),
        })
    }
}

fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize().map_err(|source| FlagError::ProjectDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Finds the configuration for a project
/// # Arguments
/// * `dir` - The project directory
/// * `explicit` - A config file given on the command line, it wins over everything else
///
/// Without an explicit file, `<dir>/ycm_flags.toml` is tried, then the per-user
/// default, then the built-in values.
pub fn locate_config(dir: &Path, explicit: Option<&Path>) -> Result<FlagsConfig> {
    let user = user_config_path();
    locate_config_in(dir, explicit, user.as_deref())
}

/// Same lookup as `locate_config` with the per-user file given explicitly
pub fn locate_config_in(
    dir: &Path,
    explicit: Option<&Path>,
    user: Option<&Path>,
) -> Result<FlagsConfig> {
    if let Some(path) = explicit {
        return parse_config(path);
    }
    let local = dir.join(CONFIG_FILE);
    if local.is_file() {
        return parse_config(&local);
    }
    if let Some(user) = user.filter(|p| p.is_file()) {
        log(
            LogLevel::Info,
            &format!("Using user config file: {}", user.display()),
        );
        let contents = read_config(user)?;
        return parse_config_str(&contents, user, canonical_dir(dir)?);
    }
    log(
        LogLevel::Info,
        &format!("No {} found, using built-in flags", CONFIG_FILE),
    );
    FlagsConfig::default_in(dir)
}

/// Location of the per-user default configuration, if the platform has one
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ycmflags").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// This function is used to parse the config file of local project
/// # Arguments
/// * `path` - The path to the config file, its directory becomes the include base
pub fn parse_config(path: &Path) -> Result<FlagsConfig> {
    let contents = read_config(path)?;
    let absolute = path.canonicalize().map_err(|source| FlagError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    parse_config_str(&contents, path, dir)
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| FlagError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses config contents, `origin` is only used in error messages
pub fn parse_config_str(contents: &str, origin: &Path, dir: PathBuf) -> Result<FlagsConfig> {
    let config = contents
        .parse::<Table>()
        .map_err(|source| FlagError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;

    let base = parse_base_flags(section(&config, "flags")?)?;
    let packages = parse_packages(section(&config, "packages")?)?;
    let walk = parse_walk(section(&config, "walk")?)?;
    log(
        LogLevel::Debug,
        &format!("Parsed config {}: {:?}", origin.display(), base),
    );

    Ok(FlagsConfig {
        dir,
        base,
        packages,
        walk,
    })
}

/// Returns the named table, or an empty one if the section is absent
fn section(config: &Table, name: &str) -> Result<Table> {
    match config.get(name) {
        None => Ok(Table::new()),
        Some(Value::Table(table)) => Ok(table.clone()),
        Some(_) => Err(FlagError::ConfigField {
            field: name.to_string(),
            expected: "is not a table",
        }),
    }
}

/// Parses the literal flags
fn parse_base_flags(table: Table) -> Result<BaseFlags> {
    let defaults = BaseFlags::default();
    Ok(BaseFlags {
        std: parse_cfg_string(&table, "std", &defaults.std)?,
        language: parse_cfg_string(&table, "language", &defaults.language)?,
        completer: parse_cfg_string(&table, "completer", &defaults.completer)?,
        threading: parse_cfg_string(&table, "threading", &defaults.threading)?,
        defines: parse_cfg_vector(&table, "defines", &defaults.defines)?,
        libs: parse_cfg_vector(&table, "libs", &defaults.libs)?,
        include_dirs: parse_cfg_vector(&table, "include_dirs", &defaults.include_dirs)?,
    })
}

/// Parses the package query configuration
fn parse_packages(table: Table) -> Result<PackageConfig> {
    let defaults = PackageConfig::default();
    Ok(PackageConfig {
        tool: parse_cfg_string(&table, "tool", &defaults.tool)?,
        names: parse_cfg_vector(&table, "names", &defaults.names)?,
        skip_empty_tokens: parse_cfg_bool(&table, "skip_empty_tokens", defaults.skip_empty_tokens)?,
    })
}

/// Parses the walked source roots
fn parse_walk(table: Table) -> Result<WalkConfig> {
    let defaults = WalkConfig::default();
    Ok(WalkConfig {
        roots: parse_cfg_vector(&table, "roots", &defaults.roots)?,
    })
}

/// Parses the configuration field of the string type
fn parse_cfg_string(config: &Table, field: &str, default: &str) -> Result<String> {
    match config.get(field) {
        None => Ok(default.to_string()),
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FlagError::ConfigField {
                field: field.to_string(),
                expected: "is not a string",
            }),
    }
}

/// Parses the configuration field of the boolean type
fn parse_cfg_bool(config: &Table, field: &str, default: bool) -> Result<bool> {
    match config.get(field) {
        None => Ok(default),
        Some(value) => value.as_bool().ok_or_else(|| FlagError::ConfigField {
            field: field.to_string(),
            expected: "is not a boolean",
        }),
    }
}

/// Parses the configuration field of the vector type
fn parse_cfg_vector(config: &Table, field: &str, default: &[String]) -> Result<Vec<String>> {
    let values = match config.get(field) {
        None => return Ok(default.to_vec()),
        Some(value) => value.as_array().ok_or_else(|| FlagError::ConfigField {
            field: field.to_string(),
            expected: "is not an array",
        })?,
    };
    values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| FlagError::ConfigField {
                    field: field.to_string(),
                    expected: "must only contain strings",
                })
        })
        .collect()
}

/// Renders a config file carrying the built-in values, used by `init`
pub fn sample_config() -> String {
    let base = BaseFlags::default();
    let packages = PackageConfig::default();
    let walk = WalkConfig::default();
    let mut flags = Table::new();
    flags.insert("std".into(), Value::String(base.std));
    flags.insert("language".into(), Value::String(base.language));
    flags.insert("completer".into(), Value::String(base.completer));
    flags.insert("threading".into(), Value::String(base.threading));
    flags.insert("defines".into(), string_array(base.defines));
    flags.insert("libs".into(), string_array(base.libs));
    flags.insert("include_dirs".into(), string_array(base.include_dirs));

    let mut pkgs = Table::new();
    pkgs.insert("tool".into(), Value::String(packages.tool));
    pkgs.insert("names".into(), string_array(packages.names));
    pkgs.insert(
        "skip_empty_tokens".into(),
        Value::Boolean(packages.skip_empty_tokens),
    );

    let mut roots = Table::new();
    roots.insert("roots".into(), string_array(walk.roots));

    let mut config = Table::new();
    config.insert("flags".into(), Value::Table(flags));
    config.insert("packages".into(), Value::Table(pkgs));
    config.insert("walk".into(), Value::Table(roots));
    config.to_string()
}

fn string_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(contents: &str) -> Result<FlagsConfig> {
        parse_config_str(contents, Path::new("test.toml"), PathBuf::from("/project"))
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.base, BaseFlags::default());
        assert_eq!(config.packages.names.len(), 9);
        assert_eq!(config.walk.roots, vec!["./Source", "./Tests"]);
        assert_eq!(config.dir, PathBuf::from("/project"));
    }

    #[test]
    fn fields_override_defaults() {
        let config = parse(
            r#"
[flags]
std = "c++17"
defines = ["FOO=1"]

[packages]
tool = "pkgconf"
names = ["zlib"]
skip_empty_tokens = true

[walk]
roots = ["src"]
"#,
        )
        .unwrap();
        assert_eq!(config.base.std, "c++17");
        assert_eq!(config.base.defines, vec!["FOO=1"]);
        assert_eq!(config.base.libs, owned(&DEFAULT_LIBS));
        assert_eq!(config.packages.tool, "pkgconf");
        assert_eq!(config.packages.names, vec!["zlib"]);
        assert!(config.packages.skip_empty_tokens);
        assert_eq!(config.walk.roots, vec!["src"]);
    }

    #[test]
    fn wrong_types_name_the_field() {
        let err = parse("[flags]\nstd = 14\n").unwrap_err();
        assert!(matches!(err, FlagError::ConfigField { ref field, .. } if field == "std"));

        let err = parse("[walk]\nroots = [\"a\", 1]\n").unwrap_err();
        assert!(matches!(err, FlagError::ConfigField { ref field, .. } if field == "roots"));

        let err = parse("flags = 3\n").unwrap_err();
        assert!(matches!(err, FlagError::ConfigField { ref field, .. } if field == "flags"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(parse("[flags"), Err(FlagError::ConfigParse { .. })));
    }

    #[test]
    fn literal_flags_keep_their_order() {
        let flags = BaseFlags::default().to_flags();
        assert_eq!(&flags[..5], &["-std=gnu++14", "-x", "c++", "./ClangCompleter", "-pthread"]);
        assert_eq!(flags[5], "-DLINUX=1");
        assert_eq!(flags[12], "-lcrypto");
        assert_eq!(flags[15], "-lrt");
        assert_eq!(&flags[16..], &["-I./JuceLibraryCode", "-I./deps/JUCE/modules"]);
    }

    #[test]
    fn empty_completer_and_threading_are_left_out() {
        let base = BaseFlags {
            completer: String::new(),
            threading: String::new(),
            defines: Vec::new(),
            libs: Vec::new(),
            include_dirs: Vec::new(),
            ..BaseFlags::default()
        };
        assert_eq!(base.to_flags(), vec!["-std=gnu++14", "-x", "c++"]);
    }

    #[test]
    fn explicit_config_beats_local_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[flags]\nstd = \"c++11\"\n").unwrap();
        let other = tmp.path().join("other.toml");
        fs::write(&other, "[flags]\nstd = \"c++20\"\n").unwrap();

        let config = locate_config_in(tmp.path(), Some(&other), None).unwrap();
        assert_eq!(config.base.std, "c++20");

        let config = locate_config_in(tmp.path(), None, None).unwrap();
        assert_eq!(config.base.std, "c++11");
    }

    #[test]
    fn local_file_beats_user_file() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();
        let user = tmp.path().join("user.toml");
        fs::write(&user, "[flags]\nstd = \"c++17\"\n").unwrap();

        let config = locate_config_in(&project, None, Some(&user)).unwrap();
        assert_eq!(config.base.std, "c++17");
        assert_eq!(config.dir, project.canonicalize().unwrap());

        fs::write(project.join(CONFIG_FILE), "[flags]\nstd = \"c++11\"\n").unwrap();
        let config = locate_config_in(&project, None, Some(&user)).unwrap();
        assert_eq!(config.base.std, "c++11");
    }

    #[test]
    fn no_config_uses_built_ins_in_canonical_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let missing_user = tmp.path().join("absent.toml");

        let config = locate_config_in(&tmp.path().join("sub/.."), None, Some(&missing_user)).unwrap();
        assert_eq!(config.base, BaseFlags::default());
        assert_eq!(config.packages, PackageConfig::default());
        assert_eq!(config.dir, tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn sample_config_round_trips_to_defaults() {
        let config = parse(&sample_config()).unwrap();
        assert_eq!(config.base, BaseFlags::default());
        assert_eq!(config.packages, PackageConfig::default());
        assert_eq!(config.walk, WalkConfig::default());
    }
}
