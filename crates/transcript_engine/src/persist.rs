use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Numbered names tried after the requested one is taken.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path} is unusable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("no free name for {filename} after {attempts} attempts")]
    NameTaken { filename: String, attempts: u32 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` if missing and checks that files can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    fs::create_dir_all(dir).map_err(|e| unusable(e.to_string()))?;
    tempfile::tempfile_in(dir).map_err(|e| unusable(e.to_string()))?;
    Ok(())
}

/// Saves transcripts into one output directory.
///
/// Content is staged in a temp file and moved into place, so a reader never sees a
/// half-written transcript. An existing transcript is never replaced: when the name is
/// taken the next free `{stem}-1.txt`, `{stem}-2.txt`, ... is used.
pub struct TranscriptWriter {
    dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the path the transcript ended up at.
    pub fn save(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;

        for attempt in 0..=MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(filename, attempt));
            match staged.persist_noclobber(&target) {
                Ok(_) => {
                    engine_info!("Wrote {} bytes to {}", content.len(), target.display());
                    return Ok(target);
                }
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    engine_debug!("{} already exists", target.display());
                    staged = err.file;
                }
                Err(err) => return Err(err.error.into()),
            }
        }

        Err(PersistError::NameTaken {
            filename: filename.to_string(),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

fn numbered_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{attempt}.{ext}"),
        _ => format!("{filename}-{attempt}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_names_keep_the_extension() {
        assert_eq!(numbered_name("chat.txt", 0), "chat.txt");
        assert_eq!(numbered_name("chat.txt", 2), "chat-2.txt");
        assert_eq!(numbered_name("chat", 1), "chat-1");
        assert_eq!(numbered_name(".hidden", 1), ".hidden-1");
    }
}
