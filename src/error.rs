// Error type shared by the encoder session, the tag scanner and the host bindings

use crate::scanner::ScanState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A codec or container primitive could not allocate its state.
    Allocation(&'static str),
    /// Channel count, sample rate or quality rejected.
    InvalidConfiguration(String),
    /// Tag name or value contains a reserved character.
    InvalidTag(String),
    /// More samples committed than the analysis window can hold.
    WindowOverflow { requested: usize, capacity: usize },
    /// Samples committed without requesting an analysis window first.
    WindowNotRequested,
    /// The session already signalled end of stream.
    Finished,
    /// A libvorbis call returned a failure code.
    Codec { op: &'static str, code: i32 },
    /// A libogg call returned a failure code.
    Container { op: &'static str, code: i32 },
    /// Input ran out before the comment header was reached.
    Truncated { reached: ScanState },
    /// Input is not a well-formed Vorbis header sequence.
    Corrupt(String),
    /// An encode finished without producing any bytes.
    EmptyOutput,
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Allocation(what) => write!(f, "Allocation failed: {}", what),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid encoder configuration: {}", msg),
            Error::InvalidTag(msg) => write!(f, "Invalid tag: {}", msg),
            Error::WindowOverflow { requested, capacity } => write!(
                f,
                "Analysis window overflow: {} samples written, capacity is {}",
                requested, capacity
            ),
            Error::WindowNotRequested => write!(f, "Samples written without an analysis window"),
            Error::Finished => write!(f, "Encoder already reached end of stream"),
            Error::Codec { op, code } => write!(f, "Codec error in {}: code {}", op, code),
            Error::Container { op, code } => write!(f, "Container error in {}: code {}", op, code),
            Error::Truncated { reached } => {
                write!(f, "Truncated or corrupt Ogg data (stopped at {:?})", reached)
            }
            Error::Corrupt(msg) => write!(f, "Corrupt Ogg Vorbis data: {}", msg),
            Error::EmptyOutput => write!(f, "Encoder produced no data"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
