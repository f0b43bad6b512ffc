use egui::ColorImage;

use crate::data_url::parse_data_url;
use crate::error::{GenerationError, UNKNOWN_ERROR};

/// Body of the POST sent to the generation endpoint
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// PNG snapshot of the canvas as a base64 `data:` URL
    pub image_data: String,
}

/// Body returned by the generation endpoint, for both success and failure
#[derive(serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationResponse {
    pub image_url: Option<String>,
    pub error: Option<String>,
}

/// A successful generation: the reference the backend returned and its pixels
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub reference: String,
    pub image: ColorImage,
}

/// Classify a response and pull out the image reference.
///
/// An unparseable body is a malformed response regardless of status. A
/// non-success status carries the server's `error` message, or
/// [`UNKNOWN_ERROR`] when it has none.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<String, GenerationError> {
    let response: GenerationResponse = serde_json::from_slice(body)
        .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;

    if !(200..300).contains(&status) {
        let message = response
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
        return Err(GenerationError::Server { status, message });
    }

    response
        .image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| GenerationError::MalformedResponse("response has no image_url".to_owned()))
}

/// Decode encoded image bytes (PNG, JPEG, ...) into an egui image
pub fn decode_image(bytes: &[u8]) -> Result<ColorImage, GenerationError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

/// Decode an image reference that carries its own bytes
pub fn decode_embedded(reference: &str) -> Result<ColorImage, GenerationError> {
    let data_url = parse_data_url(reference)?;
    if !data_url.mime.starts_with("image/") {
        return Err(GenerationError::Decode(format!(
            "expected an image, got {}",
            data_url.mime
        )));
    }
    decode_image(&data_url.bytes)
}
