use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("duplicate entity-time combination: time={time}, entity={entity}")]
    DuplicateKey { time: String, entity: String },
}
