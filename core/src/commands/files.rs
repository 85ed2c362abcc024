//! Export and import files.

use std::path::Path;

use crate::content::Content;
use crate::error::PanelError;

/// Write `content` as pretty-printed JSON.
pub async fn write_export(path: &Path, content: &Content) -> Result<(), PanelError> {
    let json = content
        .to_pretty_json()
        .map_err(|e| PanelError::Surface(anyhow::Error::new(e)))?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Read an import file. The outer error is I/O, the inner one means the file
/// is not valid JSON.
pub async fn read_import(path: &Path) -> Result<serde_json::Result<Content>, PanelError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(Content::from_json_str(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_then_import_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("work.json");
        let content = Content::new(json!({"expressions": {"list": [{"latex": "y=x"}]}}));

        write_export(&path, &content).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"expressions\""));

        assert_eq!(read_import(&path).await.unwrap().unwrap(), content);
    }

    #[tokio::test]
    async fn test_invalid_json_is_inner_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_import(&path).await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_import(&dir.path().join("nope.json")).await,
            Err(PanelError::Io(_))
        ));
    }
}
