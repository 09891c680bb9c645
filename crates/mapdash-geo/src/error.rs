use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("boundary file not found: {path}")]
    NotFound { path: String },

    #[error("boundary file {path} is not a valid feature collection: {reason}")]
    Parse { path: String, reason: String },

    #[error("failed to read boundary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
