//! Reading and writing configuration files.
//!
//! Thin wrappers around the text codecs. A leading `~` component is the home
//! directory. Saves append a missing extension, create parent directories,
//! and only replace existing files on request.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::JsonOptions;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::registry::Registry;

const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];
const JSON_EXTENSIONS: &[&str] = &["json"];

// A leading `~` component stands for the home directory.
fn home_relative(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "cannot determine the home directory".to_string(),
    })?;
    Ok(home.join(rest))
}

// The file a save writes to: home expanded, and the first accepted
// extension appended unless the name already carries one of them.
fn save_target(path: &Path, accepted: &[&str]) -> Result<PathBuf> {
    let path = home_relative(path)?;
    let known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| accepted.contains(&ext));
    if known {
        return Ok(path);
    }
    let mut name = OsString::from(path);
    name.push(".");
    name.push(accepted[0]);
    Ok(PathBuf::from(name))
}

fn write_guarded(path: &Path, accepted: &[&str], overwrite: bool, contents: &str) -> Result<PathBuf> {
    let path = save_target(path, accepted)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if path.exists() && !overwrite {
        return Err(Error::FileExists { path });
    }
    fs::write(&path, contents)?;
    log::debug!("Saved configuration to {}", path.display());
    Ok(path)
}

/// Saves the YAML document of `node`.
///
/// Returns the path actually written, `.yaml` appended if `path` had no
/// YAML extension.
///
/// # Errors
///
/// - [`Error::FileExists`] if the file exists and `overwrite` is not set
/// - [`Error::InvalidPath`] if a leading `~` can not be expanded
/// - [`Error::Io`] if the file can not be written
pub fn save_yaml(node: &Node, path: impl AsRef<Path>, overwrite: bool) -> Result<PathBuf> {
    write_guarded(path.as_ref(), YAML_EXTENSIONS, overwrite, &node.to_yaml()?)
}

/// Saves the JSON document of `node`.
///
/// Returns the path actually written, `.json` appended if missing.
///
/// # Errors
///
/// Same as [`save_yaml`].
pub fn save_json(
    node: &Node,
    path: impl AsRef<Path>,
    overwrite: bool,
    options: &JsonOptions,
) -> Result<PathBuf> {
    write_guarded(path.as_ref(), JSON_EXTENSIONS, overwrite, &node.to_json(options)?)
}

/// Loads a node from a YAML file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can not be read, otherwise the errors
/// of [`Node::from_yaml`].
pub fn load_yaml(registry: &Registry, path: impl AsRef<Path>) -> Result<Node> {
    let contents = fs::read_to_string(home_relative(path.as_ref())?)?;
    Node::from_yaml(registry, &contents)
}

/// Loads a node from a JSON file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file can not be read, otherwise the errors
/// of [`Node::from_json`].
pub fn load_json(registry: &Registry, path: impl AsRef<Path>) -> Result<Node> {
    let contents = fs::read_to_string(home_relative(path.as_ref())?)?;
    Node::from_json(registry, &contents)
}
