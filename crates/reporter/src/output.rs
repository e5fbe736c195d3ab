use crate::prelude::*;
use akamai_reporter_core::report::Table;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes report files under one output directory and remembers what it wrote
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    written: Vec<String>,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths written so far, relative to the root and `/`-separated
    pub fn written(&self) -> &[String] {
        &self.written
    }

    fn prepare(&mut self, relative: &Path) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| f!("Failed to create directory {}", parent.display()))?;
        }
        self.written
            .push(relative.to_string_lossy().replace('\\', "/"));
        Ok(path)
    }

    pub fn write_table(&mut self, relative: impl AsRef<Path>, table: &Table) -> Result<PathBuf> {
        let path = self.prepare(relative.as_ref())?;

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| f!("Failed to create {}", path.display()))?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| f!("Failed to write {}", path.display()))?;

        log::debug!("Wrote {} ({} rows)", path.display(), table.len());
        Ok(path)
    }

    /// Pretty-printed JSON
    pub fn write_json<T: Serialize + ?Sized>(
        &mut self,
        relative: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf> {
        let path = self.prepare(relative.as_ref())?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| f!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn write_text(&mut self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let path = self.prepare(relative.as_ref())?;
        fs::write(&path, content).with_context(|| f!("Failed to write {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_table_creates_dirs_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        let mut table = Table::new(&["zone", "note"]);
        table.push(vec!["example.com".to_string(), "a, b".to_string()]);

        let path = writer.write_table("gtm/example/zones.csv", &table).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "zone,note\nexample.com,\"a, b\"\n");
        assert_eq!(writer.written(), ["gtm/example/zones.csv"]);
    }

    #[test]
    fn test_write_table_headers_only_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        let path = writer
            .write_table("gtm_domains.csv", &Table::new(&["gtm_domain"]))
            .unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "gtm_domain\n");
    }

    #[test]
    fn test_write_json_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        let path = writer
            .write_json("datacenters.json", &json!([{"datacenterId": 1}]))
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "[\n  {\n    \"datacenterId\": 1\n  }\n]");
    }

    #[test]
    fn test_write_text_tracks_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());

        writer.write_text("checklists/a.com.md", "# a").unwrap();
        writer.write_text("checklists/b.com.md", "# b").unwrap();

        assert_eq!(
            writer.written(),
            ["checklists/a.com.md", "checklists/b.com.md"]
        );
        assert!(dir.path().join("checklists/b.com.md").is_file());
    }
}
