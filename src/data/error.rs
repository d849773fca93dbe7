use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a dataset snapshot.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A token did not resolve in the named table.
    #[error("unknown {table} token: {token}")]
    UnknownToken { table: &'static str, token: String },

    #[error("scene index {index} out of range (dataset has {count} scenes)")]
    SceneOutOfRange { index: usize, count: usize },

    /// The sample has no key-frame record for the requested sensor channel.
    #[error("sample {sample} has no {channel} data")]
    MissingChannel { sample: String, channel: String },

    /// A `next` pointer led back to an already visited sample.
    #[error("sample chain revisits token {0}")]
    CyclicChain(String),

    #[error("point cloud {}: {len} bytes is not a multiple of {stride}", path.display())]
    MalformedPointCloud {
        path: PathBuf,
        len: usize,
        stride: usize,
    },

    #[error("calibrated sensor {0} has no 3x3 camera intrinsic")]
    MissingIntrinsic(String),

    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl DatasetError {
    pub fn unknown(table: &'static str, token: impl Into<String>) -> Self {
        Self::UnknownToken {
            table,
            token: token.into(),
        }
    }
}

pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
