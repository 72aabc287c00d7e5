//! Named coding profiles loaded from TOML.
//!
//! A profile is a serializable description of a [`Radix4Config`]; the
//! registry bundles the built-in profiles and merges user overrides
//! from standard locations.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::coding::Radix4;
use crate::config::{BuildError, Radix4Config};

/// Configuration for a single coding profile loaded from TOML.
///
/// Every field is optional; unset fields keep the stream or block
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Stream layout (true, the default) or block layout
    #[serde(default)]
    pub streaming: Option<bool>,
    /// Defer radix characters until a non-radix-free byte appears
    #[serde(default)]
    pub optimistic: Option<bool>,
    /// Explicitly terminate encoded output
    #[serde(default)]
    pub terminated: Option<bool>,
    /// Characters per line, 0 for no line breaks
    #[serde(default)]
    pub line_length: Option<usize>,
    /// Line break sequence (whitespace only)
    #[serde(default)]
    pub line_break: Option<String>,
    /// Termination character
    #[serde(default)]
    pub terminator: Option<char>,
    /// Stream encoder buffer size in bytes
    #[serde(default)]
    pub buffer_size: Option<usize>,
    /// Custom 64-character alphabet
    #[serde(default)]
    pub alphabet: Option<String>,
    /// Characters skipped by decoders
    #[serde(default)]
    pub whitespace: Option<String>,
}

impl Profile {
    /// Expands this profile into a configuration.
    pub fn to_config(&self) -> Radix4Config {
        let mut config = if self.streaming.unwrap_or(true) {
            Radix4Config::stream()
        } else {
            Radix4Config::block()
        };
        if let Some(optimistic) = self.optimistic {
            config = config.optimistic(optimistic);
        }
        if let Some(terminated) = self.terminated {
            config = config.terminated(terminated);
        }
        if let Some(line_length) = self.line_length {
            config = config.line_length(line_length);
        }
        if let Some(line_break) = &self.line_break {
            config = config.line_break(line_break);
        }
        if let Some(terminator) = self.terminator {
            config = config.terminator(terminator);
        }
        if let Some(buffer_size) = self.buffer_size {
            config = config.buffer_size(buffer_size);
        }
        if let Some(alphabet) = &self.alphabet {
            config = config.alphabet(alphabet);
        }
        if let Some(whitespace) = &self.whitespace {
            config = config.whitespace(whitespace);
        }
        config
    }

    /// Builds the frozen definition this profile describes.
    pub fn build(&self) -> Result<Radix4, BuildError> {
        self.to_config().build()
    }
}

/// Collection of coding profiles loaded from TOML files.
#[derive(Debug, Deserialize)]
pub struct ProfileRegistry {
    /// Map of profile names to their configurations
    pub profiles: HashMap<String, Profile>,
}

impl ProfileRegistry {
    /// Parses a registry from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the built-in profiles bundled with the library.
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        let content = include_str!("../profiles.toml");
        Ok(Self::from_toml(content)?)
    }

    /// Loads a registry from a file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Loads the built-in profiles with user overrides applied.
    ///
    /// Searches in priority order:
    /// 1. Built-in profiles (from the library)
    /// 2. `~/.config/radix4/profiles.toml` (user overrides)
    /// 3. `./profiles.toml` (project-local overrides)
    ///
    /// Later profiles override earlier ones with the same name.
    pub fn load_with_overrides() -> Result<Self, Box<dyn std::error::Error>> {
        let mut registry = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("radix4").join("profiles.toml");
            if user_path.exists() {
                match Self::load_from_file(&user_path) {
                    Ok(user) => registry.merge(user),
                    Err(err) => {
                        eprintln!("Warning: failed to load {:?}: {}", user_path, err);
                    }
                }
            }
        }

        let local_path = std::path::Path::new("profiles.toml");
        if local_path.exists() {
            match Self::load_from_file(local_path) {
                Ok(local) => registry.merge(local),
                Err(err) => {
                    eprintln!("Warning: failed to load {:?}: {}", local_path, err);
                }
            }
        }

        Ok(registry)
    }

    /// Merges another registry into this one; profiles from `other`
    /// replace profiles with the same name.
    pub fn merge(&mut self, other: ProfileRegistry) {
        for (name, profile) in other.profiles {
            self.profiles.insert(name, profile);
        }
    }

    /// Retrieves a profile by name.
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// An error describing a missing profile, with a suggestion when a
    /// similarly named profile exists.
    pub fn not_found(&self, name: &str) -> ProfileNotFoundError {
        let mut available: Vec<String> = self.profiles.keys().cloned().collect();
        available.sort();
        ProfileNotFoundError {
            name: name.to_string(),
            suggestion: find_closest(name, &available),
        }
    }
}

/// Error when a named profile does not exist in the registry.
#[derive(Debug)]
pub struct ProfileNotFoundError {
    pub name: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ProfileNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile '{}' not found", self.name)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "; did you mean '{}'?", suggestion)?;
        }
        write!(f, " (run `radix4 --list` to see all profiles)")
    }
}

impl std::error::Error for ProfileNotFoundError {}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];
    for (i, c1) in s1.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, c2) in s2.chars().enumerate() {
            let cost = usize::from(c1 != c2);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }
    prev_row[len2]
}

/// Finds the closest matching profile name within a small edit
/// distance.
fn find_closest(name: &str, available: &[String]) -> Option<String> {
    let threshold = if name.len() < 5 { 2 } else { 3 };
    let mut best_match = None;
    let mut best_distance = usize::MAX;
    for candidate in available {
        let distance = levenshtein_distance(name, candidate);
        if distance < best_distance && distance <= threshold {
            best_distance = distance;
            best_match = Some(candidate.clone());
        }
    }
    best_match
}
