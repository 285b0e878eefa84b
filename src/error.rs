use crate::{FsType, StructureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("layout table {layout} is inconsistent: {detail}")]
    LayoutInconsistency { layout: &'static str, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown field {field:?} in {layout}")]
    UnknownField { layout: &'static str, field: String },

    #[error("index {index} out of range, {count} instance(s) located")]
    Index { index: usize, count: usize },

    #[error("{fs} has no {kind} structure")]
    UnsupportedKind { fs: FsType, kind: StructureKind },

    #[error("mutation failed: {0}")]
    MutationFailure(String),

    #[error("invalid selector: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
