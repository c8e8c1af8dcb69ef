use async_trait::async_trait;

use crate::utils::ScanError;

/// Capture details the recognizer may need to read a frame upright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameMetadata {
    pub width: u32,
    pub height: u32,
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u16,
}

/// One camera frame as handed over by the capture layer.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub data: Vec<u8>,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Vec<u8>, metadata: FrameMetadata) -> Self {
        Frame { data, metadata }
    }

    /// Frame whose payload is already recognized text.
    pub fn from_text(text: &str) -> Self {
        Frame {
            data: text.as_bytes().to_vec(),
            metadata: FrameMetadata::default(),
        }
    }
}

/// Text recognition backend. Implementations turn one frame into raw text
/// with lines separated by `\n`.
#[async_trait]
pub trait TextRecognizer: Send + Sync + 'static {
    fn name(&self) -> &str;
    async fn recognize(&self, frame: &Frame) -> Result<String, ScanError>;
}

/// Treats the frame payload as UTF-8 text that has already been recognized.
/// Used to replay OCR dumps through the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRecognizer;

#[async_trait]
impl TextRecognizer for PassthroughRecognizer {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn recognize(&self, frame: &Frame) -> Result<String, ScanError> {
        String::from_utf8(frame.data.clone())
            .map_err(|e| ScanError::Recognizer(format!("frame is not UTF-8 text: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_returns_payload() {
        let frame = Frame::from_text("P<UTOERIKSSON\nL898902C36");
        let text = PassthroughRecognizer.recognize(&frame).await.unwrap();
        assert_eq!(text, "P<UTOERIKSSON\nL898902C36");
    }

    #[tokio::test]
    async fn test_passthrough_rejects_binary() {
        let frame = Frame::new(vec![0xff, 0xfe, 0x00], FrameMetadata::default());
        let err = PassthroughRecognizer.recognize(&frame).await.unwrap_err();
        assert!(matches!(err, ScanError::Recognizer(_)));
    }
}
