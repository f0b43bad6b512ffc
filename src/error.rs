use thiserror::Error;

/// Fallback shown when the backend rejects a request without saying why
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors produced while snapshotting the sketch canvas
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("the canvas has no pixels to encode")]
    Empty,
    #[error("failed to encode canvas as PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors that can occur while decoding an embedded `data:` URL
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL has no payload separator")]
    MissingPayload,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Everything that can go wrong between pressing "Generate" and showing a result.
///
/// The `Display` output is what ends up in the error slot of the UI, so the
/// server variant renders the server's message verbatim.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// A request is already in flight
    #[error("a generation request is already in progress")]
    Busy,
    /// The request never produced a response
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    /// The returned image reference could not be turned into pixels
    #[error("could not decode generated image: {0}")]
    Decode(String),
}

impl From<DataUrlError> for GenerationError {
    fn from(err: DataUrlError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<image::ImageError> for GenerationError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_message_verbatim() {
        let err = GenerationError::Server {
            status: 400,
            message: "bad prompt".to_owned(),
        };
        assert_eq!(err.to_string(), "bad prompt");
    }

    #[test]
    fn data_url_errors_become_decode_errors() {
        let err: GenerationError = DataUrlError::NotBase64.into();
        assert!(matches!(err, GenerationError::Decode(_)));
    }
}
