//! This module contains code related to package metadata queries.

use crate::error::{FlagError, Result};
use crate::utils::log::{log, LogLevel};
use std::process::Command;

/// A tool that reports the compile flags a package needs
pub trait MetadataTool {
    /// Name used in log lines and errors
    fn name(&self) -> &str;

    /// Returns the compile flags of `package` as one whitespace-separated string
    fn cflags(&self, package: &str) -> Result<String>;
}

/// `pkg-config` compatible command line tool
#[derive(Debug, Clone)]
pub struct PkgConfig {
    program: String,
}

impl PkgConfig {
    pub fn new(program: &str) -> Self {
        PkgConfig {
            program: program.to_string(),
        }
    }
}

impl Default for PkgConfig {
    fn default() -> Self {
        PkgConfig::new("pkg-config")
    }
}

impl MetadataTool for PkgConfig {
    fn name(&self) -> &str {
        &self.program
    }

    fn cflags(&self, package: &str) -> Result<String> {
        log(
            LogLevel::Debug,
            &format!("Command: {} --cflags {}", self.program, package),
        );
        let output = Command::new(&self.program)
            .arg("--cflags")
            .arg(package)
            .output()
            .map_err(|source| FlagError::ToolUnavailable {
                tool: self.program.clone(),
                package: package.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(FlagError::PackageNotFound {
                tool: self.program.clone(),
                package: package.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let stdout = String::from_utf8(output.stdout).map_err(|_| FlagError::InvalidOutput {
            tool: self.program.clone(),
            package: package.to_string(),
        })?;
        Ok(stdout.trim_end().to_string())
    }
}

/// Splits a tool reply on single spaces.
/// Runs of spaces and an empty reply yield empty tokens.
pub fn split_tokens(reply: &str) -> impl Iterator<Item = &str> {
    reply.split(' ')
}

/// Queries every package in order and collects the returned tokens
/// # Arguments
/// * `tool` - The metadata tool to ask
/// * `names` - The packages, in the order their flags must appear
/// * `skip_empty_tokens` - Drop the empty tokens produced by empty replies
///
/// The first failing package aborts the whole query.
pub fn query_packages(
    tool: &dyn MetadataTool,
    names: &[String],
    skip_empty_tokens: bool,
) -> Result<Vec<String>> {
    let mut flags = Vec::new();
    for name in names {
        let reply = tool.cflags(name).map_err(|err| {
            log(LogLevel::Error, &format!("Failed to query package '{}'", name));
            err
        })?;
        let before = flags.len();
        flags.extend(
            split_tokens(&reply)
                .filter(|token| !(skip_empty_tokens && token.is_empty()))
                .map(str::to_string),
        );
        log(
            LogLevel::Info,
            &format!("  {}: {} flags from {}", name, flags.len() - before, tool.name()),
        );
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Replies(HashMap<&'static str, &'static str>);

    impl MetadataTool for Replies {
        fn name(&self) -> &str {
            "replies"
        }

        fn cflags(&self, package: &str) -> Result<String> {
            self.0
                .get(package)
                .map(|reply| reply.to_string())
                .ok_or_else(|| FlagError::PackageNotFound {
                    tool: "replies".to_string(),
                    package: package.to_string(),
                    stderr: String::new(),
                })
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokens_follow_package_order() {
        let tool = Replies(HashMap::from([("a", "-A -B"), ("b", "-I/usr/include/b")]));
        let flags = query_packages(&tool, &names(&["a", "b"]), false).unwrap();
        assert_eq!(flags, vec!["-A", "-B", "-I/usr/include/b"]);
    }

    #[test]
    fn empty_reply_keeps_an_empty_token() {
        let tool = Replies(HashMap::from([("a", ""), ("b", "-X  -Y")]));
        let flags = query_packages(&tool, &names(&["a", "b"]), false).unwrap();
        assert_eq!(flags, vec!["", "-X", "", "-Y"]);

        let flags = query_packages(&tool, &names(&["a", "b"]), true).unwrap();
        assert_eq!(flags, vec!["-X", "-Y"]);
    }

    #[test]
    fn missing_package_aborts() {
        let tool = Replies(HashMap::from([("a", "-A")]));
        let err = query_packages(&tool, &names(&["a", "missing"]), false).unwrap_err();
        assert!(matches!(err, FlagError::PackageNotFound { ref package, .. } if package == "missing"));
    }

    #[test]
    fn missing_program_is_tool_unavailable() {
        let tool = PkgConfig::new("ycmflags-no-such-metadata-tool");
        let err = tool.cflags("zlib").unwrap_err();
        assert!(matches!(err, FlagError::ToolUnavailable { .. }));
    }
}
