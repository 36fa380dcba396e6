use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParticleError {
    #[error("supplied buffer holds {supplied} elements but {required} particles are live")]
    BufferTooSmall { required: usize, supplied: usize },
}
