use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("tf lookup error: {0}")]
    Lookup(String),

    #[error("tf connectivity error: {0}")]
    Connectivity(String),

    #[error("tf extrapolation error: {0}")]
    Extrapolation(String),

    #[error("tf invalid argument: {0}")]
    InvalidArgument(String),

    #[error("tf error: {0}")]
    Other(String),
}

pub type TransformResult<T> = Result<T, TransformError>;

impl TransformError {
    /// The status code this error is reported with across a boundary.
    pub fn code(&self) -> StatusCode {
        match self {
            TransformError::Lookup(_) => StatusCode::Lookup,
            TransformError::Connectivity(_) => StatusCode::Connectivity,
            TransformError::Extrapolation(_) => StatusCode::Extrapolation,
            TransformError::InvalidArgument(_) => StatusCode::InvalidArgument,
            TransformError::Other(_) => StatusCode::Other,
        }
    }

    /// The free-form diagnostic carried by the error.
    pub fn message(&self) -> &str {
        match self {
            TransformError::Lookup(msg)
            | TransformError::Connectivity(msg)
            | TransformError::Extrapolation(msg)
            | TransformError::InvalidArgument(msg)
            | TransformError::Other(msg) => msg,
        }
    }

    /// True for the "not available (yet)" kinds a feasibility probe answers with `false`.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            TransformError::Lookup(_)
                | TransformError::Connectivity(_)
                | TransformError::Extrapolation(_)
        )
    }
}

/// Outcome kinds as they cross a process or language boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StatusCode {
    #[default]
    Ok = 0,
    Lookup = 1,
    Connectivity = 2,
    Extrapolation = 3,
    InvalidArgument = 4,
    Other = 100,
}

impl StatusCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Unknown raw codes collapse into `Other`.
    pub fn from_i32(raw: i32) -> Self {
        match raw {
            0 => StatusCode::Ok,
            1 => StatusCode::Lookup,
            2 => StatusCode::Connectivity,
            3 => StatusCode::Extrapolation,
            4 => StatusCode::InvalidArgument,
            _ => StatusCode::Other,
        }
    }
}

/// Encoded as the raw i32 code.
impl Encode for StatusCode {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.as_i32().encode(encoder)
    }
}

impl Decode for StatusCode {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(StatusCode::from_i32(i32::decode(decoder)?))
    }
}

impl<'de> BorrowDecode<'de> for StatusCode {
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(StatusCode::from_i32(i32::decode(decoder)?))
    }
}

/// `{code, message}` pair: the only shape a failure takes outside the engine.
/// The message is empty on success.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }

    /// Builds the status reported for an engine outcome.
    pub fn from_result<T>(result: &TransformResult<T>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::from(e),
        }
    }

    /// Turns a received status back into a typed outcome.
    pub fn into_result(self) -> TransformResult<()> {
        match self.code {
            StatusCode::Ok => Ok(()),
            StatusCode::Lookup => Err(TransformError::Lookup(self.message)),
            StatusCode::Connectivity => Err(TransformError::Connectivity(self.message)),
            StatusCode::Extrapolation => Err(TransformError::Extrapolation(self.message)),
            StatusCode::InvalidArgument => Err(TransformError::InvalidArgument(self.message)),
            StatusCode::Other => Err(TransformError::Other(if self.message.is_empty() {
                "unspecified failure".to_string()
            } else {
                self.message
            })),
        }
    }
}

impl From<&TransformError> for Status {
    fn from(e: &TransformError) -> Self {
        Self {
            code: e.code(),
            message: e.message().to_string(),
        }
    }
}

impl From<TransformError> for Status {
    fn from(e: TransformError) -> Self {
        Status::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = TransformError::Connectivity("a and b are not connected".to_string());
        let status = Status::from(&err);
        assert_eq!(status.code, StatusCode::Connectivity);
        assert_eq!(status.code.as_i32(), 2);
        assert_eq!(status.message, "a and b are not connected");
        assert_eq!(status.into_result(), Err(err));
    }

    #[test]
    fn test_ok_status_has_empty_message() {
        let status = Status::from_result(&Ok::<u32, TransformError>(3));
        assert!(status.is_ok());
        assert!(status.message.is_empty());
        assert_eq!(status.into_result(), Ok(()));
    }

    #[test]
    fn test_unknown_code_is_other() {
        assert_eq!(StatusCode::from_i32(42), StatusCode::Other);
        assert_eq!(StatusCode::from_i32(100), StatusCode::Other);
        assert_eq!(StatusCode::from_i32(3), StatusCode::Extrapolation);

        let status = Status {
            code: StatusCode::Other,
            message: String::new(),
        };
        match status.into_result() {
            Err(TransformError::Other(msg)) => assert!(!msg.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_soft_errors() {
        assert!(TransformError::Lookup(String::new()).is_soft());
        assert!(TransformError::Connectivity(String::new()).is_soft());
        assert!(TransformError::Extrapolation(String::new()).is_soft());
        assert!(!TransformError::InvalidArgument(String::new()).is_soft());
        assert!(!TransformError::Other(String::new()).is_soft());
    }

    #[test]
    fn test_status_bincode_encoding() {
        let status = Status {
            code: StatusCode::Extrapolation,
            message: "requested time is in the past".to_string(),
        };
        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&status, config).unwrap();
        let (decoded, read): (Status, usize) = bincode::decode_from_slice(&bytes, config).unwrap();
        assert_eq!(read, bytes.len());
        assert_eq!(decoded, status);
    }
}
