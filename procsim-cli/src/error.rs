use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: expected a .{expected} file")]
    Extension {
        path: PathBuf,
        expected: &'static str,
    },
}
