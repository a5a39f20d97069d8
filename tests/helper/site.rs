//! Update site and profile test utilities

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde_json::json;
use tempfile::TempDir;

pub const COMPONENT: &str = "org.example.feature.group";

/// Render a metadata or profile document
pub fn components_document(entries: &[(&str, &str)]) -> String {
    json!({
        "components": entries
            .iter()
            .map(|(id, version)| json!({ "id": id, "version": version }))
            .collect::<Vec<_>>()
    })
    .to_string()
}

/// Local update site directory holding an `updates.json`
pub struct TestSite {
    dir: TempDir,
}

impl TestSite {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("updates.json"), components_document(entries)).unwrap();
        Self { dir }
    }

    pub fn publish(&self, entries: &[(&str, &str)]) {
        std::fs::write(
            self.dir.path().join("updates.json"),
            components_document(entries),
        )
        .unwrap();
    }

    pub fn endpoint(&self) -> Url {
        Url::from_directory_path(self.dir.path()).unwrap()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Write a profile file listing installed components
pub fn create_profile(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("profile.json");
    std::fs::write(&path, components_document(entries)).unwrap();
    path
}
