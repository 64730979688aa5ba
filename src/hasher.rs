//! This module contains functions for hashing generated outputs and checking if they have changed.

use crate::error::{FlagError, Result};
use crate::utils::log::{log, LogLevel};
use itertools::Itertools;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File next to the generated outputs that records their hashes
pub const HASH_FILE: &str = ".ycmflags.hash";

pub struct Hasher;

impl Hasher {
    /// Hashes a string and returns the hash as a string.
    /// # Arguments
    /// * `content` - Contains the content to be hashed.
    pub fn hash_string(content: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(content.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    /// Loads the hashes from a file and returns them as a hashmap.
    /// A missing or unreadable file yields an empty map.
    /// # Arguments
    /// * `path` - The path of the file to load the hashes from.
    pub fn load_hashes_from_file(path: &Path) -> HashMap<String, String> {
        let mut output_hash = HashMap::new();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return output_hash,
        };
        for line in contents.lines() {
            if let Some((name, hash)) = line.split_once(' ') {
                output_hash.insert(name.to_string(), hash.to_string());
            }
        }
        output_hash
    }

    /// Saves the hashes to a file.
    /// # Arguments
    /// * `path` - The path of the file to save the hashes to.
    /// * `output_hash` - The hashmap of output names and hashes.
    pub fn save_hashes_to_file(path: &Path, output_hash: &HashMap<String, String>) -> Result<()> {
        let contents: String = output_hash
            .iter()
            .sorted()
            .map(|(name, hash)| format!("{} {}\n", name, hash))
            .collect();
        fs::write(path, contents).map_err(|source| FlagError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks if a generated output must be rewritten.
    /// # Arguments
    /// * `output` - The path of the generated file.
    /// * `hash` - The hash of the content about to be written.
    /// * `output_hash` - The hashmap of output names and hashes.
    pub fn is_output_changed(output: &Path, hash: &str, output_hash: &HashMap<String, String>) -> bool {
        if !output.exists() {
            return true;
        }
        let name = output_name(output);
        match output_hash.get(&name) {
            Some(old) if old == hash => {
                log(LogLevel::Info, &format!("Output unchanged: {}", name));
                false
            }
            _ => true,
        }
    }

    /// Records the hash of a freshly written output.
    pub fn save_hash(output: &Path, hash: &str, output_hash: &mut HashMap<String, String>) {
        output_hash.insert(output_name(output), hash.to_string());
    }
}

fn output_name(output: &Path) -> String {
    output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
