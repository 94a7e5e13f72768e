use crate::topology::FaceId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to open trace destination `{}` for writing", .path.display())]
    DestinationOpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to trace destination")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("node `{0}` is defined more than once")]
    DuplicateNode(String),
    #[error("node `{node}` defines face {face} more than once")]
    DuplicateFace { node: String, face: FaceId },
}
