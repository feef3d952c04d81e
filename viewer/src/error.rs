use std::io;

use guide::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

impl ViewError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::Store(e) if e.is_not_found())
    }
}
