use crate::image_classifier::models::model_config::ModelConfig;
use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// [1, height, width, 3], what Keras exports expect.
    Nhwc,
    Nchw,
}

impl FromStr for TensorLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nhwc" => Ok(TensorLayout::Nhwc),
            "nchw" => Ok(TensorLayout::Nchw),
            other => Err(format!("unknown tensor layout '{}'", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }
}

pub fn parse_filter(name: &str) -> Option<FilterType> {
    match name.to_ascii_lowercase().as_str() {
        "nearest" => Some(FilterType::Nearest),
        "triangle" | "bilinear" => Some(FilterType::Triangle),
        "catmullrom" | "bicubic" => Some(FilterType::CatmullRom),
        "gaussian" => Some(FilterType::Gaussian),
        "lanczos3" => Some(FilterType::Lanczos3),
        _ => None,
    }
}

/// Stretches to exactly `width`x`height`; aspect ratio is not preserved.
pub fn resize_image(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.width() == width && rgb.height() == height {
        return rgb;
    }
    imageops::resize(&rgb, width, height, filter)
}

pub fn image_to_tensor(rgb: &RgbImage, layout: TensorLayout) -> ImageTensor {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    match layout {
        TensorLayout::Nhwc => ImageTensor {
            shape: [1, height, width, 3],
            data: rgb.as_raw().iter().map(|&v| v as f32 / 255.0).collect(),
        },
        TensorLayout::Nchw => {
            let plane = width * height;
            let mut data = vec![0.0f32; 3 * plane];
            for (x, y, pixel) in rgb.enumerate_pixels() {
                let offset = y as usize * width + x as usize;
                for c in 0..3 {
                    data[c * plane + offset] = pixel[c] as f32 / 255.0;
                }
            }
            ImageTensor {
                shape: [1, 3, height, width],
                data,
            }
        }
    }
}

pub fn resize_image_to_tensor(
    image: &DynamicImage,
    config: &ModelConfig,
) -> Result<ImageTensor, PreprocessError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PreprocessError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let (height, width) = config.input_shape;
    let resized = resize_image(image, width, height, config.filter);

    Ok(image_to_tensor(&resized, config.layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        let mut img = ImageBuffer::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgb(color);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_image_to_tensor_square() {
        let image = solid(100, 100, [255, 0, 0]);

        let tensor = resize_image_to_tensor(&image, &ModelConfig::default()).unwrap();
        assert_eq!(tensor.shape(), [1, 224, 224, 3]);

        let slice = tensor.data();
        assert_eq!(slice.len(), 224 * 224 * 3);
        assert_eq!(slice[0], 1.0);
        assert_eq!(slice[1], 0.0);
        assert_eq!(slice[2], 0.0);
    }

    #[test]
    fn test_image_to_tensor_channel_planes() {
        let image = solid(100, 100, [255, 0, 0]);
        let config = ModelConfig {
            layout: TensorLayout::Nchw,
            ..ModelConfig::default()
        };

        let tensor = resize_image_to_tensor(&image, &config).unwrap();
        assert_eq!(tensor.shape(), [1, 3, 224, 224]);

        let slice = tensor.data();
        assert_eq!(slice[0], 1.0);
        assert_eq!(slice[224 * 224], 0.0);
        assert_eq!(slice[2 * 224 * 224], 0.0);
    }

    #[test]
    fn test_image_to_tensor_rectangle_is_stretched() {
        let image = solid(200, 100, [0, 255, 0]);

        let tensor = resize_image_to_tensor(&image, &ModelConfig::default()).unwrap();
        let slice = tensor.data();

        // no letterbox padding: corners carry image content too
        assert_eq!(slice[1], 1.0);
        let last_pixel = (224 * 224 - 1) * 3;
        assert_eq!(slice[last_pixel + 1], 1.0);
    }

    #[test]
    fn test_image_to_tensor_normalization() {
        let image = solid(100, 100, [128, 128, 128]);

        let tensor = resize_image_to_tensor(&image, &ModelConfig::default()).unwrap();
        let slice = tensor.data();

        let expected = 128.0 / 255.0;
        assert!((slice[0] - expected).abs() < 0.0001);
        assert!((slice[1] - expected).abs() < 0.0001);
        assert!((slice[2] - expected).abs() < 0.0001);
        assert!(slice.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_alpha_channel_is_dropped() {
        let mut img = ImageBuffer::new(10, 10);
        for pixel in img.pixels_mut() {
            *pixel = Rgba([0u8, 0, 255, 10]);
        }
        let image = DynamicImage::ImageRgba8(img);

        let tensor = resize_image_to_tensor(&image, &ModelConfig::default()).unwrap();

        assert_eq!(tensor.shape()[3], 3);
        assert_eq!(tensor.data()[2], 1.0);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = DynamicImage::new_rgb8(0, 0);

        let result = resize_image_to_tensor(&image, &ModelConfig::default());

        assert_eq!(
            result,
            Err(PreprocessError::EmptyImage {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn test_resize_is_deterministic() {
        let mut img = ImageBuffer::new(37, 91);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 7) as u8, (y * 3) as u8, ((x + y) % 256) as u8]);
        }
        let image = DynamicImage::ImageRgb8(img);
        let config = ModelConfig::default();

        let first = resize_image_to_tensor(&image, &config).unwrap();
        let second = resize_image_to_tensor(&image, &config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_layout_and_filter() {
        assert_eq!("NHWC".parse::<TensorLayout>(), Ok(TensorLayout::Nhwc));
        assert!("hwcn".parse::<TensorLayout>().is_err());
        assert_eq!(parse_filter("bilinear"), Some(FilterType::Triangle));
        assert_eq!(parse_filter("sharp"), None);
    }
}
