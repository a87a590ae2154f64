use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("Timestamp error: unrecognised format [{0}]")]
    UnrecognisedFormat(String)
}
