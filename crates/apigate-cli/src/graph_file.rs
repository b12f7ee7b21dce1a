//! Component graph files.
//!
//! ```toml
//! [[component]]
//! id = "org.acme.core"
//! packages = ["org.acme.core", "org.acme.core.internal"]
//!
//! [[component.exports]]
//! name = "org.acme.core.internal"
//! friends = ["org.acme.ui"]
//!
//! [[component]]
//! id = "org.acme.ui"
//!
//! [[component.requires]]
//! id = "org.acme.core"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use apigate_resolver::Component;

use crate::error::{CliError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct GraphFile {
    #[serde(default, rename = "component")]
    pub components: Vec<Component>,
}

impl GraphFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| CliError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CliError::GraphNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let graph = Self::parse(&text, path)?;
        debug!(path = %path.display(), components = graph.components.len(), "loaded component graph");
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_components() {
        let graph = GraphFile::parse(
            r#"
[[component]]
id = "core"
packages = ["core.api"]

[[component.exports]]
name = "core.api"

[[component]]
id = "core.nl"
host = "core"
"#,
            Path::new("graph.toml"),
        )
        .unwrap();

        assert_eq!(graph.components.len(), 2);
        assert_eq!(graph.components[0].exports[0].name, "core.api");
        assert!(graph.components[1].is_fragment());
    }

    #[test]
    fn empty_file_has_no_components() {
        let graph = GraphFile::parse("", Path::new("graph.toml")).unwrap();
        assert!(graph.components.is_empty());
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let err = GraphFile::parse("[[component]\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CliError::Toml { ref path, .. } if path == Path::new("bad.toml")));
        assert!(err.to_string().contains("bad.toml"));
    }
}
