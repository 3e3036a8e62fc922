use thiserror::Error;

use yard_core::{TrainNumber, YardError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch configuration error: {0}")]
    Config(#[from] YardError),

    #[error("train {0} appears more than once in the fleet")]
    DuplicateTrain(TrainNumber),

    #[error("dispatch cancelled by operator")]
    Cancelled,

    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
