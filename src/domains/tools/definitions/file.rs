//! File capability: read, write and list within the configured root.
//!
//! Every path goes through the path validator first. Writes land in a
//! temporary sibling file that is renamed over the target.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::core::config::SecurityConfig;
use crate::core::security::{PathSecurityError, validate_new_path, validate_path};
use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PathParams {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteFileParams {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadOutput {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutput {
    pub path: String,
    pub bytes_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOutput {
    pub path: String,
    pub entries: Vec<DirEntry>,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct FileTool;

impl FileTool {
    #[instrument(skip_all, fields(path = %params.path))]
    async fn read(ctx: ToolContext, params: PathParams) -> Result<ReadOutput, ToolError> {
        let content = read_file(&params.path, &ctx.config.security).await?;
        Ok(ReadOutput {
            path: params.path,
            content,
        })
    }

    #[instrument(skip_all, fields(path = %params.path))]
    async fn write(ctx: ToolContext, params: WriteFileParams) -> Result<WriteOutput, ToolError> {
        let bytes_written = write_file(&params.path, &params.content, &ctx.config.security).await?;
        Ok(WriteOutput {
            path: params.path,
            bytes_written,
        })
    }

    #[instrument(skip_all, fields(path = %params.path))]
    async fn list(ctx: ToolContext, params: PathParams) -> Result<ListOutput, ToolError> {
        let entries = list_dir(&params.path, &ctx.config.security).await?;
        Ok(ListOutput {
            path: params.path,
            entries,
        })
    }
}

impl Capability for FileTool {
    const NAMESPACE: Option<&'static str> = Some("file");
    const DESCRIPTION: &'static str = "Text file access restricted to the configured root directory";

    fn operations() -> Vec<OperationDescriptor> {
        let path = || ParamSpec::new("path", TypeSpec::String);
        vec![
            OperationDescriptor::new("read", "Read a UTF-8 text file.", Self::read)
                .param(path().describe("File to read"))
                .returns(TypeSpec::object([
                    ParamSpec::new("path", TypeSpec::String),
                    ParamSpec::new("content", TypeSpec::String),
                ])),
            OperationDescriptor::new(
                "write",
                "Write a UTF-8 text file atomically, replacing any existing content.",
                Self::write,
            )
            .param(path().describe("File to write; its directory must exist"))
            .param(ParamSpec::new("content", TypeSpec::String))
            .returns(TypeSpec::object([
                ParamSpec::new("path", TypeSpec::String),
                ParamSpec::new("bytes_written", TypeSpec::integer()),
            ])),
            OperationDescriptor::new(
                "list",
                "List a directory. Entries are sorted by name; files carry their size.",
                Self::list,
            )
            .param(path().describe("Directory to list"))
            .returns(TypeSpec::object([
                ParamSpec::new("path", TypeSpec::String),
                ParamSpec::new(
                    "entries",
                    TypeSpec::list(TypeSpec::object([
                        ParamSpec::new("name", TypeSpec::String),
                        ParamSpec::new("kind", TypeSpec::one_of(&["file", "dir", "symlink"])),
                        ParamSpec::new("size", TypeSpec::optional(TypeSpec::integer())),
                    ])),
                ),
            ])),
        ]
    }
}

// ============================================================================
// File operations
// ============================================================================

fn rejected(e: PathSecurityError) -> ToolError {
    warn!("Path rejected: {}", e);
    ToolError::invalid_request(e.to_string())
}

fn io_failure(action: &str, path: &Path, e: io::Error) -> ToolError {
    ToolError::execution_failed(format!("Failed to {} '{}': {}", action, path.display(), e))
}

pub async fn read_file(path: &str, security: &SecurityConfig) -> Result<String, ToolError> {
    let resolved = validate_path(path, security).map_err(rejected)?;
    if !resolved.is_file() {
        return Err(ToolError::invalid_request(format!("Not a file: '{}'", path)));
    }
    let bytes = fs::read(&resolved)
        .await
        .map_err(|e| io_failure("read", &resolved, e))?;
    String::from_utf8(bytes)
        .map_err(|_| ToolError::invalid_request(format!("'{}' is not valid UTF-8 text", path)))
}

/// Write `content` to `path` via a temporary file in the same directory.
pub async fn write_file(path: &str, content: &str, security: &SecurityConfig) -> Result<usize, ToolError> {
    let target = validate_new_path(path, security).map_err(rejected)?;
    if target.is_dir() {
        return Err(ToolError::invalid_request(format!("Is a directory: '{}'", path)));
    }

    let temp = temp_sibling(&target);
    if let Err(e) = fs::write(&temp, content.as_bytes()).await {
        return Err(io_failure("write", &temp, e));
    }
    if let Err(e) = fs::rename(&temp, &target).await {
        let _ = fs::remove_file(&temp).await;
        return Err(io_failure("replace", &target, e));
    }

    info!(bytes = content.len(), "File written: {}", target.display());
    Ok(content.len())
}

fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

pub async fn list_dir(path: &str, security: &SecurityConfig) -> Result<Vec<DirEntry>, ToolError> {
    let resolved = validate_path(path, security).map_err(rejected)?;
    if !resolved.is_dir() {
        return Err(ToolError::invalid_request(format!("Not a directory: '{}'", path)));
    }

    let mut reader = fs::read_dir(&resolved)
        .await
        .map_err(|e| io_failure("list", &resolved, e))?;
    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| io_failure("list", &resolved, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = match entry.file_type().await {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to get file type for {}: {}", name, e);
                continue;
            }
        };
        let (kind, size) = if file_type.is_symlink() {
            ("symlink", None)
        } else if file_type.is_dir() {
            ("dir", None)
        } else {
            ("file", entry.metadata().await.ok().map(|m| m.len()))
        };
        entries.push(DirEntry { name, kind, size });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rooted(dir: &TempDir) -> SecurityConfig {
        SecurityConfig {
            root_path: Some(dir.path().to_path_buf()),
            allow_symlinks: false,
        }
    }

    fn inside(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let security = rooted(&dir);
        let path = inside(&dir, "notes.txt");

        assert_eq!(write_file(&path, "héllo", &security).await.unwrap(), 6);
        assert_eq!(read_file(&path, &security).await.unwrap(), "héllo");

        write_file(&path, "replaced", &security).await.unwrap();
        assert_eq!(read_file(&path, &security).await.unwrap(), "replaced");
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let security = rooted(&dir);
        write_file(&inside(&dir, "a.txt"), "x", &security).await.unwrap();

        let entries = list_dir(&dir.path().to_string_lossy(), &security).await.unwrap();
        assert_eq!(
            entries,
            vec![DirEntry {
                name: "a.txt".to_string(),
                kind: "file",
                size: Some(1),
            }]
        );
    }

    #[tokio::test]
    async fn test_list_sorts_and_marks_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "bb").unwrap();

        let entries = list_dir(&dir.path().to_string_lossy(), &rooted(&dir))
            .await
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(names, vec![("b.txt", "file"), ("sub", "dir")]);
    }

    #[tokio::test]
    async fn test_paths_outside_root_rejected() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        std::fs::write(other.path().join("secret.txt"), "s").unwrap();

        let err = read_file(&inside(&other, "secret.txt"), &rooted(&root))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidRequest(_)));

        let err = write_file(&inside(&other, "new.txt"), "x", &rooted(&root))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidRequest(_)));
        assert!(!other.path().join("new.txt").exists());
    }

    #[tokio::test]
    async fn test_type_mismatches_are_invalid_requests() {
        let dir = TempDir::new().unwrap();
        let security = rooted(&dir);
        std::fs::write(dir.path().join("f.txt"), "f").unwrap();

        assert!(matches!(
            read_file(&dir.path().to_string_lossy(), &security).await,
            Err(ToolError::InvalidRequest(_))
        ));
        assert!(matches!(
            list_dir(&inside(&dir, "f.txt"), &security).await,
            Err(ToolError::InvalidRequest(_))
        ));
        assert!(matches!(
            read_file(&inside(&dir, "missing.txt"), &security).await,
            Err(ToolError::InvalidRequest(_))
        ));
    }
}
