//! Digit recognition: per-cell thresholding plus whitelisted OCR with
//! confidence gating.

use image::GrayImage;
use leptess::{LepTess, Variable};

use crate::pipeline::ScanError;
use crate::preprocess;

const DIGIT_WHITELIST: &str = "123456789";

/// Recognition controls.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecognizeConfig {
    /// Fixed binary threshold isolating digit strokes in a cell crop.
    pub cell_threshold: u8,
    /// Minimum OCR confidence (0–100) required to accept a digit.
    pub min_confidence: f32,
    /// Tesseract language model.
    pub lang: String,
    /// Cells whose foreground fraction after thresholding falls below this
    /// are treated as blank without an OCR call.
    pub min_ink_frac: f32,
}

impl Default for RecognizeConfig {
    fn default() -> Self {
        Self {
            cell_threshold: 150,
            min_confidence: 60.0,
            lang: "eng".into(),
            min_ink_frac: 0.02,
        }
    }
}

/// Outcome of recognizing a single cell.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecognitionResult {
    /// Accepted digit, present only when the text parsed to 1..=9 and the
    /// confidence cleared the gate.
    pub digit: Option<u8>,
    /// Recognizer-reported confidence, 0–100.
    pub confidence: f32,
    /// Raw recognized text, trimmed.
    pub text: String,
}

impl RecognitionResult {
    /// A blank cell: nothing recognized.
    pub fn empty() -> Self {
        Self {
            digit: None,
            confidence: 0.0,
            text: String::new(),
        }
    }
}

/// OCR engine for digit cells.
///
/// One engine is constructed per scan and reused sequentially across all 81
/// cells to amortize initialization; it is released when dropped, on every
/// exit path.
pub struct DigitOcr {
    engine: LepTess,
    config: RecognizeConfig,
}

impl DigitOcr {
    /// Initialize Tesseract with the digit whitelist.
    pub fn new(config: &RecognizeConfig) -> Result<Self, ScanError> {
        let mut engine = LepTess::new(None, &config.lang)
            .map_err(|e| ScanError::ScanFailed(format!("OCR engine init: {}", e)))?;
        engine
            .set_variable(Variable::TesseditCharWhitelist, DIGIT_WHITELIST)
            .map_err(|e| ScanError::ScanFailed(format!("OCR whitelist: {}", e)))?;
        Ok(Self {
            engine,
            config: config.clone(),
        })
    }

    /// Recognize one cell crop.
    ///
    /// The crop is binarized (threshold 150, inverted so strokes become
    /// foreground) and handed to the engine. Low-confidence or non-digit
    /// output degrades to an empty result, never an error.
    pub fn recognize(&mut self, cell: &GrayImage) -> Result<RecognitionResult, ScanError> {
        let bin = preprocess::threshold_inv(cell, self.config.cell_threshold);
        if preprocess::foreground_fraction(&bin) < self.config.min_ink_frac {
            return Ok(RecognitionResult::empty());
        }

        let mut png = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut png);
        bin.write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| ScanError::ScanFailed(format!("cell encode: {}", e)))?;

        self.engine
            .set_image_from_mem(&png)
            .map_err(|e| ScanError::ScanFailed(format!("OCR image load: {}", e)))?;
        self.engine.set_source_resolution(300);

        let text = self
            .engine
            .get_utf8_text()
            .map_err(|e| ScanError::ScanFailed(format!("OCR text: {}", e)))?;
        let confidence = self.engine.mean_text_conf() as f32;

        let text = text.trim().to_string();
        let digit = gate_digit(&text, confidence, self.config.min_confidence);
        Ok(RecognitionResult {
            digit,
            confidence,
            text,
        })
    }
}

/// Accept the recognized text as a digit only when it parses to 1..=9 and
/// the confidence clears `min_confidence`.
fn gate_digit(text: &str, confidence: f32, min_confidence: f32) -> Option<u8> {
    let value: u8 = text.trim().parse().ok()?;
    ((1..=9).contains(&value) && confidence > min_confidence).then_some(value)
}
