use billsplit_application::{ParsedReceipt, ReceiptImage, ReceiptReadError, ReceiptReader};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;

use crate::parser::parse_receipt_text;

/// Receipt reader backed by the ocrs engine. Text recognition and receipt
/// interpretation are separate steps; only the recognition lives here.
pub struct OcrsReceiptReader {
    engine: OcrEngine,
}

#[derive(Debug)]
struct AnyhowWrapper<T>(T);
impl<T: std::fmt::Display> std::fmt::Display for AnyhowWrapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
impl<T: std::fmt::Debug + std::fmt::Display> std::error::Error for AnyhowWrapper<T> {}

impl OcrsReceiptReader {
    pub fn new(
        detection_model_path: &str,
        recognition_model_path: &str,
    ) -> Result<Self, ReceiptReadError> {
        let detection_model =
            Model::load_file(detection_model_path).map_err(|err| ReceiptReadError::ModelLoad {
                path: detection_model_path.into(),
                source: Box::new(err),
            })?;
        let recognition_model =
            Model::load_file(recognition_model_path).map_err(|err| ReceiptReadError::ModelLoad {
                path: recognition_model_path.into(),
                source: Box::new(err),
            })?;

        let params = OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..OcrEngineParams::default()
        };
        let engine = OcrEngine::new(params).map_err(|err| ReceiptReadError::EngineInit {
            source: Box::new(AnyhowWrapper(err)),
        })?;

        tracing::info!("receipt reader engine initialized");
        Ok(Self { engine })
    }
}

impl ReceiptReader for OcrsReceiptReader {
    fn read(&self, image: &ReceiptImage<'_>) -> Result<ParsedReceipt, ReceiptReadError> {
        let decoded =
            image::load_from_memory(image.bytes).map_err(|err| ReceiptReadError::ImageDecode {
                source: Box::new(err),
            })?;
        let rgb = decoded.into_rgb8();
        let (width, height) = rgb.dimensions();
        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            ReceiptReadError::ImageDecode {
                source: Box::new(err),
            }
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| ReceiptReadError::ScanFailed {
                source: Box::new(AnyhowWrapper(err)),
            })?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| ReceiptReadError::ScanFailed {
                source: Box::new(AnyhowWrapper(err)),
            })?;

        tracing::debug!(width, height, chars = text.len(), "receipt image scanned");
        parse_receipt_text(&text)
    }
}
