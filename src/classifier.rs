use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;

use crate::picker::Photo;

/// Side length of the square input image classification models expect.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// Turns a photo into a label. `None` means classification failed.
pub trait Classifier {
    fn classify(&self, photo: &Photo) -> Option<String>;
}

impl<F> Classifier for F
where
    F: Fn(&Photo) -> Option<String>,
{
    fn classify(&self, photo: &Photo) -> Option<String> {
        self(photo)
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected a {expected}x{expected} input, got {width}x{height}")]
    InputSize {
        expected: u32,
        width: u32,
        height: u32,
    },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// 32-bit ARGB pixels, row-major, `width * 4` bytes per row
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Resizes `image` to the model input size and lays it out as ARGB.
    pub fn prepare(image: &DynamicImage) -> Self {
        let resized = image
            .resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Triangle)
            .to_rgba8();

        let data = resized
            .pixels()
            .flat_map(|p| {
                let [r, g, b, a] = p.0;
                [a, r, g, b]
            })
            .collect();

        Self {
            width: MODEL_INPUT_SIZE,
            height: MODEL_INPUT_SIZE,
            data,
        }
    }
}

/// An image classification model working on prepared input
pub trait Model {
    fn predict(&self, input: &PixelBuffer) -> Result<String, ModelError>;
}

/// Adapts a [`Model`]: prepares the input and swallows failures.
pub struct ModelClassifier<M: Model> {
    model: M,
}

impl<M: Model> ModelClassifier<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: Model> Classifier for ModelClassifier<M> {
    fn classify(&self, photo: &Photo) -> Option<String> {
        let input = PixelBuffer::prepare(&photo.image);
        match self.model.predict(&input) {
            Ok(label) => Some(label),
            Err(e) => {
                log::warn!("couldn't classify {}: {e}", photo.path.display());
                None
            }
        }
    }
}

/// Offline stand-in for a real model: labels a photo by its file name,
/// e.g. `sports_car.jpg` becomes `"sports car"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameClassifier;

impl Classifier for FileNameClassifier {
    fn classify(&self, photo: &Photo) -> Option<String> {
        let stem = photo.path.file_stem()?.to_string_lossy();
        let label = stem
            .split(['_', '-'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    fn solid_photo(name: &str, width: u32, height: u32, color: [u8; 4]) -> Photo {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        Photo::new(name, DynamicImage::ImageRgba8(image))
    }

    struct RecordingModel {
        calls: Cell<usize>,
        answer: Option<&'static str>,
    }

    impl Model for RecordingModel {
        fn predict(&self, input: &PixelBuffer) -> Result<String, ModelError> {
            self.calls.set(self.calls.get() + 1);
            if input.width != MODEL_INPUT_SIZE || input.height != MODEL_INPUT_SIZE {
                return Err(ModelError::InputSize {
                    expected: MODEL_INPUT_SIZE,
                    width: input.width,
                    height: input.height,
                });
            }
            self.answer
                .map(str::to_string)
                .ok_or_else(|| ModelError::Inference("no confident class".into()))
        }
    }

    #[test]
    fn test_prepare_resizes_to_model_input() {
        let photo = solid_photo("wide.png", 640, 480, [10, 20, 30, 255]);
        let buffer = PixelBuffer::prepare(&photo.image);

        assert_eq!(buffer.width, 224);
        assert_eq!(buffer.height, 224);
        assert_eq!(buffer.data.len(), 224 * 224 * 4);
    }

    #[test]
    fn test_prepare_lays_out_argb() {
        let photo = solid_photo("solid.png", 8, 8, [10, 20, 30, 255]);
        let buffer = PixelBuffer::prepare(&photo.image);

        assert_eq!(&buffer.data[..4], &[255, 10, 20, 30]);
        assert!(buffer.data.chunks(4).all(|px| px == [255, 10, 20, 30]));
    }

    #[test]
    fn test_model_classifier_returns_label() {
        let classifier = ModelClassifier::new(RecordingModel {
            calls: Cell::new(0),
            answer: Some("golden retriever"),
        });
        let photo = solid_photo("dog.png", 300, 300, [0, 0, 0, 255]);

        assert_eq!(classifier.classify(&photo), Some("golden retriever".into()));
        assert_eq!(classifier.model.calls.get(), 1);
    }

    #[test]
    fn test_model_classifier_swallows_failures() {
        let classifier = ModelClassifier::new(RecordingModel {
            calls: Cell::new(0),
            answer: None,
        });
        let photo = solid_photo("blur.png", 10, 10, [0, 0, 0, 255]);

        assert_eq!(classifier.classify(&photo), None);
    }

    #[test]
    fn test_file_name_classifier() {
        let photo = solid_photo("photos/sports_car.jpg", 1, 1, [0, 0, 0, 255]);
        assert_eq!(FileNameClassifier.classify(&photo), Some("sports car".into()));

        let photo = solid_photo("ice-lolly.png", 1, 1, [0, 0, 0, 255]);
        assert_eq!(FileNameClassifier.classify(&photo), Some("ice lolly".into()));
    }

    #[test]
    fn test_file_name_classifier_without_name() {
        let photo = solid_photo("__.png", 1, 1, [0, 0, 0, 255]);
        assert_eq!(FileNameClassifier.classify(&photo), None);
    }

    #[test]
    fn test_closure_is_a_classifier() {
        let classifier = |_: &Photo| Some("teapot".to_string());
        let photo = solid_photo("x.png", 1, 1, [0, 0, 0, 255]);

        assert_eq!(classifier.classify(&photo), Some("teapot".into()));
    }
}
