//! JSON tree export

use crate::output::error::OutputResult;
use crate::tree::CrawlNode;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `tree` as pretty-printed JSON to `output_path`
pub fn write_tree_json(tree: &CrawlNode, output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads a tree previously written by [`write_tree_json`]
pub fn read_tree_json(path: &Path) -> OutputResult<CrawlNode> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_written_json_has_tree_fields() {
        let mut root = CrawlNode::new("https://example.com/", "home", "Home", vec![0.5; 3]);
        root.children
            .push(CrawlNode::new("https://example.com/a", "a", "Page", vec![1.0; 3]));

        let file = NamedTempFile::new().unwrap();
        write_tree_json(&root, file.path()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["url"], "https://example.com/");
        assert_eq!(value["title"], "https://example.com/");
        assert_eq!(value["type"], "Home");
        assert_eq!(value["children"][0]["summary"], "a");

        assert_eq!(read_tree_json(file.path()).unwrap(), root);
    }

    #[test]
    fn test_read_invalid_json() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            read_tree_json(file.path()),
            Err(OutputError::Serialize(_))
        ));
    }
}
