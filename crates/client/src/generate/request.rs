//! Request types for the image-generation API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::Serialize;

use crate::generate::GenerationError;

/// Instruction sent with the vehicle photo to the vision model.
pub const DESCRIBE_VEHICLE_PROMPT: &str = "Describe the vehicle in this photo in one short phrase: colour, \
     make, model if recognisable, and body style (for example \"a white Toyota Corolla sedan\"). \
     Reply with the phrase only.";

/// Longest side, in pixels, of a photo sent for editing.
pub const MAX_UPLOAD_SIDE: u32 = 1024;

const UPLOAD_JPEG_QUALITY: u8 = 85;

/// A decoded vehicle photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleImage {
    pub bytes: Bytes,
    /// MIME type, from the data URL or sniffed from the bytes.
    pub mime: String,
}

impl VehicleImage {
    /// Decode a base64 payload, either bare or as a `data:<mime>;base64,` URL.
    pub fn from_base64_payload(payload: &str) -> Result<Self, GenerationError> {
        let payload = payload.trim();

        let (declared_mime, encoded) = match payload.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| GenerationError::InvalidImage("data URL has no payload".into()))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| GenerationError::InvalidImage("data URL is not base64".into()))?;
                (Some(mime.to_string()), data)
            }
            None => (None, payload),
        };

        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| GenerationError::InvalidImage(e.to_string()))?;

        if bytes.is_empty() {
            return Err(GenerationError::InvalidImage("image is empty".into()));
        }

        let mime = declared_mime
            .filter(|m| m.starts_with("image/"))
            .or_else(|| sniff_mime(&bytes).map(str::to_string))
            .ok_or_else(|| GenerationError::InvalidImage("unrecognised image format".into()))?;

        Ok(Self { bytes: Bytes::from(bytes), mime })
    }

    /// Re-encode as JPEG, scaled down to fit within `max_side` x `max_side`.
    ///
    /// Aspect ratio is kept and smaller photos are never enlarged.
    pub fn prepared_for_upload(&self, max_side: u32) -> Result<Self, GenerationError> {
        let decoded = image::load_from_memory(&self.bytes).map_err(|e| GenerationError::InvalidImage(e.to_string()))?;

        let fitted = if decoded.width() > max_side || decoded.height() > max_side {
            decoded.resize(max_side, max_side, FilterType::Lanczos3)
        } else {
            decoded
        };

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, UPLOAD_JPEG_QUALITY)
            .encode_image(&fitted.to_rgb8())
            .map_err(|e| GenerationError::InvalidImage(e.to_string()))?;

        tracing::debug!(
            original_bytes = self.bytes.len(),
            upload_bytes = out.len(),
            width = fitted.width(),
            height = fitted.height(),
            "prepared vehicle photo"
        );
        Ok(Self { bytes: Bytes::from(out), mime: "image/jpeg".into() })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// File name for multipart uploads, with an extension matching the MIME type.
    pub fn file_name(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "vehicle.png",
            "image/webp" => "vehicle.webp",
            _ => "vehicle.jpg",
        }
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Chat completion request carrying one image.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Vision request asking for a one-phrase vehicle description.
    pub fn describe_vehicle(model: &str, image: &VehicleImage) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: DESCRIBE_VEHICLE_PROMPT.to_string() },
                    ContentPart::ImageUrl { image_url: ImageUrl { url: image.to_data_url() } },
                ],
            }],
            max_tokens: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_bare_base64_sniffs_png() {
        let image = VehicleImage::from_base64_payload(PNG_1X1).unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.file_name(), "vehicle.png");
    }

    #[test]
    fn test_decode_data_url() {
        let image = VehicleImage::from_base64_payload(&format!("data:image/png;base64,{PNG_1X1}")).unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.to_data_url(), format!("data:image/png;base64,{PNG_1X1}"));
    }

    #[test]
    fn test_decode_tolerates_line_breaks() {
        let wrapped = format!("{}\n{}", &PNG_1X1[..20], &PNG_1X1[20..]);
        assert!(VehicleImage::from_base64_payload(&wrapped).is_ok());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(VehicleImage::from_base64_payload("%%%"), Err(GenerationError::InvalidImage(_))));
        assert!(matches!(VehicleImage::from_base64_payload(""), Err(GenerationError::InvalidImage(_))));
        assert!(matches!(
            VehicleImage::from_base64_payload("data:image/png,abc"),
            Err(GenerationError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        // "hello world"
        let result = VehicleImage::from_base64_payload("aGVsbG8gd29ybGQ=");
        assert!(matches!(result, Err(GenerationError::InvalidImage(_))));
    }

    fn png_of(width: u32, height: u32) -> VehicleImage {
        let mut bytes = Vec::new();
        image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 40]))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        VehicleImage { bytes: Bytes::from(bytes), mime: "image/png".into() }
    }

    #[test]
    fn test_prepared_for_upload_fits_large_photo() {
        let prepared = png_of(2048, 1536).prepared_for_upload(MAX_UPLOAD_SIDE).unwrap();
        assert_eq!(prepared.mime, "image/jpeg");

        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1024, 768));
    }

    #[test]
    fn test_prepared_for_upload_fits_portrait_photo() {
        let prepared = png_of(900, 1800).prepared_for_upload(MAX_UPLOAD_SIDE).unwrap();
        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 1024));
    }

    #[test]
    fn test_prepared_for_upload_never_enlarges() {
        let prepared = VehicleImage::from_base64_payload(PNG_1X1).unwrap().prepared_for_upload(MAX_UPLOAD_SIDE).unwrap();
        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
        assert_eq!(prepared.file_name(), "vehicle.jpg");
    }

    #[test]
    fn test_prepared_for_upload_rejects_undecodable_bytes() {
        let image = VehicleImage { bytes: Bytes::from_static(b"\xFF\xD8\xFFnot really"), mime: "image/jpeg".into() };
        assert!(matches!(image.prepared_for_upload(MAX_UPLOAD_SIDE), Err(GenerationError::InvalidImage(_))));
    }

    #[test]
    fn test_describe_vehicle_request_shape() {
        let image = VehicleImage::from_base64_payload(PNG_1X1).unwrap();
        let req = ChatRequest::describe_vehicle("gpt-4o-mini", &image);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert!(json["messages"][0]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }
}
