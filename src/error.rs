use std::error::Error;
use std::fmt;

/// Error raised while decoding a single ST_Geometry blob.
///
/// Decoding is a pure function of the blob bytes and the coordinate system;
/// a malformed blob fails on its own and cannot affect other decode calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The first four bytes are not the ST_Geometry magic header.
    BadMagic,
    /// The buffer ended before a required field was fully read.
    Truncated,
    /// A varint ran beyond 10 bytes without terminating.
    VarintOverflow,
    /// The lower four bits of the geometry flags are not a known shape.
    UnsupportedGeometryKind(u64),
    /// The header declares zero points.
    EmptyGeometry,
    /// No absolute coordinate was found after the part-info region.
    InvalidCoordinateStream,
    /// The Z flag is set but fewer Z varints than points remain.
    TruncatedZStream,
    /// Strict mode only: bytes remain after the geometry was fully read.
    TrailingBytes(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "invalid magic header"),
            Self::Truncated => write!(f, "blob ended before a required field"),
            Self::VarintOverflow => write!(f, "varint longer than 10 bytes"),
            Self::UnsupportedGeometryKind(flags) => {
                write!(f, "unsupported geometry kind in flags: {flags:#x}")
            }
            Self::EmptyGeometry => write!(f, "empty geometry (point count = 0)"),
            Self::InvalidCoordinateStream => {
                write!(f, "could not find the coordinate start after the part info")
            }
            Self::TruncatedZStream => write!(f, "fewer z values than points"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after geometry"),
        }
    }
}

impl Error for DecodeError {}

/// Crate error type for geodatabase operations.
#[derive(Debug)]
pub enum GeodatabaseError {
    Sql(rusqlite::Error),
    Wkb(wkb::error::WKBError),
    Wkt(wkt::error::Error),
    Decode(DecodeError),
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAGeodatabase(String),
    TableNotFound(String),
    MissingGeometry,
    Message(String),
}

impl fmt::Display for GeodatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql(err) => write!(f, "{err}"),
            Self::Wkb(err) => write!(f, "{err}"),
            Self::Wkt(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::NotAGeodatabase(reason) => write!(f, "not a valid geodatabase: {reason}"),
            Self::TableNotFound(name) => write!(f, "table not found: {name}"),
            Self::MissingGeometry => write!(f, "feature has no geometry"),
            Self::Message(message) => write!(f, "{message}"),
        }
    }
}

impl Error for GeodatabaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            Self::Wkb(err) => Some(err),
            Self::Wkt(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for GeodatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sql(err)
    }
}

impl From<wkb::error::WKBError> for GeodatabaseError {
    fn from(err: wkb::error::WKBError) -> Self {
        Self::Wkb(err)
    }
}

impl From<wkt::error::Error> for GeodatabaseError {
    fn from(err: wkt::error::Error) -> Self {
        Self::Wkt(err)
    }
}

impl From<DecodeError> for GeodatabaseError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<std::io::Error> for GeodatabaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for GeodatabaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<std::fmt::Error> for GeodatabaseError {
    fn from(_: std::fmt::Error) -> Self {
        Self::Message("formatting error".to_string())
    }
}

impl From<String> for GeodatabaseError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for GeodatabaseError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeodatabaseError>;
