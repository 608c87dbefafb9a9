use std::io;

use triage_remote::RemoteError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Fixed text relied on by callers matching the silence failure.
    #[error("silenceIncidents: invalid arguments")]
    SilenceInvalidArgs,
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("failed to read note file: {source}")]
    NoteRead {
        #[source]
        source: io::Error,
    },
    #[error("failed to create note capture file: {source}")]
    EditorSetup {
        #[source]
        source: io::Error,
    },
    #[error("editor command is empty")]
    EditorNotConfigured,
}
