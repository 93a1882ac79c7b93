//! SIA adapter error types.

/// Why a received chunk is not a usable SIA DC-09 frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("malformed {0}")]
    Malformed(&'static str),

    #[error("unsupported protocol {0:?}")]
    UnsupportedProtocol(String),

    #[error("CRC mismatch: header {header:04X}, computed {computed:04X}")]
    CrcMismatch { header: u16, computed: u16 },

    #[error("length mismatch: header {header}, body {body}")]
    LengthMismatch { header: usize, body: usize },
}

/// Errors that end a panel connection.
#[derive(Debug, thiserror::Error)]
pub enum SiaError {
    #[error("socket error")]
    Io(#[from] std::io::Error),

    #[error("frame is not valid UTF-8")]
    Decode(#[from] std::str::Utf8Error),

    #[error("invalid frame")]
    Frame(#[from] FrameError),

    #[error("failed to encode event")]
    Encode(#[from] serde_json::Error),
}

/// Errors loading an event description table.
#[derive(Debug, thiserror::Error)]
pub enum EventCodesError {
    #[error("failed to read event codes from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse event codes")]
    Parse(#[from] serde_json::Error),
}
