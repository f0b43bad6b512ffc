use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::DataUrlError;

/// A decoded `data:<mime>;base64,<payload>` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Encode raw bytes as a base64 `data:` URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Returns true if `url` looks like an embedded image rather than a link
pub fn is_data_url(url: &str) -> bool {
    url.trim_start().starts_with("data:")
}

/// Decode a base64 `data:` URL back into its mime type and bytes
pub fn parse_data_url(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(DataUrlError::NotBase64);
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| DataUrlError::InvalidBase64(err.to_string()))?;

    Ok(DataUrl {
        mime: if mime.is_empty() {
            "text/plain".to_owned()
        } else {
            mime.to_owned()
        },
        bytes,
    })
}
