//! Build error types.
//!
//! Every variant names the offending document or template so a failed pass
//! can be diagnosed from one log line.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("template `{template}` required by `{document}` not found at `{path}`")]
    MissingTemplate {
        template: String,
        document: PathBuf,
        path: PathBuf,
    },

    #[error("`{document}` names template `{template}`, which is not a plain identifier")]
    InvalidTemplateName { template: String, document: PathBuf },

    #[error("invalid front matter in `{document}`")]
    FrontMatter {
        document: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("`{second}` and `{first}` both render to `{output}`")]
    Collision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("`{0}` has no usable file name")]
    InvalidLocation(PathBuf),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}
