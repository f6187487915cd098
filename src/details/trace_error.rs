use std::{error::Error, fmt, io};

pub type GenericError = Box<dyn Error + Send + Sync + 'static>;

pub type TraceResult<T> = std::result::Result<T, GenericError>;

#[derive(Debug)]
pub enum TraceError {
    /// A socket option (TTL, receive timeout) could not be set.
    Configuration(io::Error),
    /// Sending an echo request failed.
    Transmit(io::Error),
    /// Receiving failed for a reason other than a timeout.
    Transport(io::Error),
    /// Writing the hop line to the output failed.
    Output(io::Error),
    /// An outbound packet could not be assembled.
    Packet(String),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            TraceError::Configuration(e) => write!(f, "TraceError: could not configure socket: {e}"),
            TraceError::Transmit(e) => write!(f, "TraceError: could not send echo request: {e}"),
            TraceError::Transport(e) => write!(f, "TraceError: could not receive: {e}"),
            TraceError::Output(e) => write!(f, "TraceError: could not write output: {e}"),
            TraceError::Packet(message) => write!(f, "TraceError: {message}"),
        }
    }
}

impl Error for TraceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TraceError::Configuration(e) | TraceError::Transmit(e) | TraceError::Transport(e) | TraceError::Output(e) => {
                Some(e)
            }
            TraceError::Packet(_) => None,
        }
    }
}
