//! Foreground editor session for capturing note text.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::NamedTempFile;

use crate::error::DispatchError;
use crate::message::Message;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("failed to launch editor '{editor}': {source}")]
    Launch {
        editor: String,
        #[source]
        source: io::Error,
    },
    #[error("editor exited with {status}")]
    Exited { status: ExitStatus },
}

/// Pick the editor to run: explicit override, then $VISUAL, then $EDITOR,
/// then vi.
pub fn resolve_editor(configured: Option<&str>) -> String {
    resolve_editor_with_env(
        configured,
        std::env::var("VISUAL").ok(),
        std::env::var("EDITOR").ok(),
    )
}

fn resolve_editor_with_env(
    configured: Option<&str>,
    visual: Option<String>,
    editor: Option<String>,
) -> String {
    let configured = configured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(configured) = configured {
        return configured;
    }

    let visual = visual
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(visual) = visual {
        return visual;
    }

    let editor = editor
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(editor) = editor {
        return editor;
    }

    "vi".to_string()
}

/// Prepare an editor session over a fresh anonymous temp file.
///
/// When this fails, no process has been started and none will be: the only
/// value that can spawn one is the [`PendingEdit`] that was never built.
pub fn begin_note_capture(editor: &str) -> Result<PendingEdit, DispatchError> {
    begin_note_capture_in(std::env::temp_dir(), editor)
}

fn begin_note_capture_in(
    dir: impl AsRef<Path>,
    editor: &str,
) -> Result<PendingEdit, DispatchError> {
    let mut tokens = editor.split_whitespace();
    let Some(program) = tokens.next() else {
        return Err(DispatchError::EditorNotConfigured);
    };
    let args: Vec<OsString> = tokens.map(OsString::from).collect();

    let file =
        NamedTempFile::new_in(dir).map_err(|source| DispatchError::EditorSetup { source })?;

    Ok(PendingEdit {
        file,
        program: program.to_string(),
        args,
    })
}

/// An editor session that has a file but has not launched yet.
#[derive(Debug)]
pub struct PendingEdit {
    file: NamedTempFile,
    program: String,
    args: Vec<OsString>,
}

impl PendingEdit {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Run `<editor> <path>` in the foreground and wait for it.
    ///
    /// The caller owns the terminal handoff; nothing here touches raw mode.
    /// The temp file rides along in the returned message either way.
    pub fn run_blocking(self) -> Message {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(self.file.path())
            .status();

        let error = match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(EditorError::Exited { status }),
            Err(source) => Some(EditorError::Launch {
                editor: self.program.clone(),
                source,
            }),
        };

        Message::EditorFinished {
            file: self.file,
            error,
        }
    }
}
