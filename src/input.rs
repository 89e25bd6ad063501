use crate::chunker::Chunk;
use crate::error::InputError;
use crate::estimator::{text_stats, TextStats};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Largest transcript file accepted (30 MB)
pub const MAX_FILE_BYTES: u64 = 30 * 1024 * 1024;

/// Accepted transcript extensions, without the dot
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt"];

/// Number of characters kept for a preview
pub const PREVIEW_CHARS: usize = 8000;

/// A transcript loaded from disk along with its statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedText {
    /// File name without directories
    pub name: String,
    /// Size on disk in bytes
    pub size: u64,
    /// Full text with CRLF line endings normalized to LF
    #[serde(skip)]
    pub text: String,
    pub stats: TextStats,
    /// First [`PREVIEW_CHARS`] characters of the text
    pub preview: String,
}

/// Load a plain-text transcript, enforcing type and size limits
pub fn load_text_file(path: &Path) -> Result<LoadedText, InputError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(InputError::UnsupportedFileType(name));
    }

    let read_err = |source| InputError::Read {
        path: path.display().to_string(),
        source,
    };

    let size = fs::metadata(path).map_err(read_err)?.len();
    if size > MAX_FILE_BYTES {
        return Err(InputError::FileTooLarge {
            size,
            max: MAX_FILE_BYTES,
        });
    }

    let bytes = fs::read(path).map_err(read_err)?;
    let raw = String::from_utf8(bytes).map_err(|_| InputError::InvalidUtf8(name.clone()))?;
    let text = normalize_newlines(&raw);
    let stats = text_stats(&text);
    let preview = text.chars().take(PREVIEW_CHARS).collect();

    debug!(%name, size, words = stats.words, tokens = stats.tokens, "loaded transcript");

    Ok(LoadedText {
        name,
        size,
        text,
        stats,
        preview,
    })
}

/// Convert CRLF and lone CR line endings to LF
///
/// Paragraph detection looks for blank lines made of `\n` only.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Human-readable file size: `512 B`, `1.5 KB`, `2.25 MB`
pub fn human_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// Write each chunk to `dir` under its generated file name
///
/// Part files left over from an earlier split into the same directory are
/// removed first; other files are left alone.
pub fn write_chunks(dir: &Path, chunks: &[Chunk]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output dir: {}", dir.display()))?;
    remove_stale_parts(dir)?;

    let mut written = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let path = dir.join(&chunk.filename);
        fs::write(&path, &chunk.text)
            .with_context(|| format!("writing chunk file: {}", path.display()))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "wrote chunk files");
    Ok(written)
}

fn remove_stale_parts(dir: &Path) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("listing output dir: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_part = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("chat-part-") && n.ends_with(".txt"));
        if is_part && path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("removing stale chunk file: {}", path.display()))?;
            debug!(path = %path.display(), "removed stale chunk file");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_text;

    #[test]
    fn test_load_txt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        fs::write(&path, "Hello there.\r\n\r\nGeneral Kenobi.").unwrap();

        let loaded = load_text_file(&path).unwrap();
        assert_eq!(loaded.name, "chat.txt");
        assert_eq!(loaded.text, "Hello there.\n\nGeneral Kenobi.");
        assert_eq!(loaded.stats.words, 4);
        assert_eq!(loaded.preview, loaded.text);
    }

    #[test]
    fn test_preview_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.TXT");
        fs::write(&path, "é".repeat(PREVIEW_CHARS + 10)).unwrap();

        let loaded = load_text_file(&path).unwrap();
        assert_eq!(loaded.preview.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_reject_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        fs::write(&path, "whatever").unwrap();

        let err = load_text_file(&path).unwrap_err();
        assert!(matches!(err, InputError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_reject_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        fs::write(&path, b"\xff\xfe\x00A").unwrap();

        let err = load_text_file(&path).unwrap_err();
        assert!(matches!(err, InputError::InvalidUtf8(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_text_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }

    #[test]
    fn test_human_file_size() {
        assert_eq!(human_file_size(512), "512 B");
        assert_eq!(human_file_size(1536), "1.5 KB");
        assert_eq!(human_file_size(5 * 1024 * 1024 / 2), "2.50 MB");
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\n\r\nb\rc"), "a\n\nb\nc");
        assert_eq!(normalize_newlines("plain\n"), "plain\n");
    }

    #[test]
    fn test_write_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("parts");
        let chunks = chunk_text("First.\n\nSecond.", 2);

        let written = write_chunks(&out, &chunks).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(out.join("chat-part-01.txt")).unwrap(), "First.");
        assert_eq!(fs::read_to_string(out.join("chat-part-02.txt")).unwrap(), "Second.");
    }

    #[test]
    fn test_write_chunks_clears_stale_parts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("parts");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("notes.txt"), "keep me").unwrap();

        write_chunks(&out, &chunk_text("One.\n\nTwo.\n\nThree.", 1)).unwrap();
        assert!(out.join("chat-part-03.txt").exists());

        let written = write_chunks(&out, &chunk_text("Only.", 10)).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(out.join("chat-part-01.txt")).unwrap(), "Only.");
        assert!(!out.join("chat-part-02.txt").exists());
        assert!(!out.join("chat-part-03.txt").exists());
        assert!(out.join("notes.txt").exists());
    }
}
