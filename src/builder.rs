use crate::error::{FlagError, Result};
use crate::packages::{query_packages, MetadataTool};
use crate::parser::FlagsConfig;
use crate::utils::log::{log, LogLevel};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Holds the flag list built once for a project
#[derive(Debug, Clone)]
pub struct FlagProvider {
    flags: Vec<String>,
    dir: PathBuf,
}

/// The reply handed to the completion engine for one file
#[derive(Debug, PartialEq, Serialize)]
pub struct FileFlags<'a> {
    pub flags: &'a [String],
    pub include_paths_relative_to_dir: &'a Path,
}

impl FlagProvider {
    /// Builds the flag list: literal flags, then package flags, then one
    /// include flag per directory under every walk root.
    /// Any failure aborts, no partial provider is returned.
    pub fn initialize(config: &FlagsConfig, tool: &dyn MetadataTool) -> Result<Self> {
        let mut flags = config.base.to_flags();
        log(
            LogLevel::Info,
            &format!("Querying {} packages", config.packages.names.len()),
        );
        flags.extend(query_packages(
            tool,
            &config.packages.names,
            config.packages.skip_empty_tokens,
        )?);
        for root in &config.walk.roots {
            let include_flags = walk_include_flags(&config.dir, root)?;
            log(
                LogLevel::Info,
                &format!("  {}: {} include dirs", root, include_flags.len()),
            );
            flags.extend(include_flags);
        }
        log(LogLevel::Log, &format!("Built {} flags", flags.len()));
        Ok(FlagProvider {
            flags,
            dir: config.dir.clone(),
        })
    }

    /// Provider carrying only the literal flags, for callers that
    /// fall back after a failed `initialize`
    pub fn literal(config: &FlagsConfig) -> Self {
        FlagProvider {
            flags: config.base.to_flags(),
            dir: config.dir.clone(),
        }
    }

    /// Returns the flags for a file. Every file gets the same list and
    /// nothing is logged or computed per call.
    pub fn flags_for_file<P: AsRef<Path>>(&self, _filename: P) -> FileFlags<'_> {
        FileFlags {
            flags: &self.flags,
            include_paths_relative_to_dir: &self.dir,
        }
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Walks `root` (relative to `base`) and returns `-I<dir>` for the root and
/// every directory below it, spelled the way `root` is written.
/// Files are skipped, symlinks are not followed.
pub fn walk_include_flags(base: &Path, root: &str) -> Result<Vec<String>> {
    let walk_root = base.join(root);
    let mut flags = Vec::new();
    for entry in WalkDir::new(&walk_root).sort_by_file_name() {
        let entry = entry.map_err(|source| FlagError::Walk {
            root: root.to_string(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let rel = entry.path().strip_prefix(&walk_root).unwrap_or(entry.path());
        let shown = if rel.as_os_str().is_empty() {
            PathBuf::from(root)
        } else {
            Path::new(root).join(rel)
        };
        flags.push(format!("-I{}", shown.display()));
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_emits_one_flag_per_directory() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::create_dir_all(src.join("c")).unwrap();
        fs::write(src.join("main.cpp"), "int main() {}").unwrap();
        fs::write(src.join("a/b/x.h"), "").unwrap();

        let flags = walk_include_flags(tmp.path(), "./src").unwrap();
        assert_eq!(flags, vec!["-I./src", "-I./src/a", "-I./src/a/b", "-I./src/c"]);
    }

    #[test]
    fn walk_of_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        let err = walk_include_flags(tmp.path(), "nowhere").unwrap_err();
        assert!(matches!(err, FlagError::Walk { ref root, .. } if root == "nowhere"));
    }
}
