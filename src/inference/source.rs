use crate::error::PredictionError;
use image::DynamicImage;
use std::path::Path;

/// One image to classify, borrowed from the caller for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// An image file on disk, decoded by content rather than extension.
    Path(&'a Path),
    Pixels(&'a DynamicImage),
    Bytes(&'a [u8]),
}

impl<'a> ImageSource<'a> {
    pub fn from_parts(
        path: Option<&'a Path>,
        pixels: Option<&'a DynamicImage>,
    ) -> Result<Self, PredictionError> {
        match (path, pixels) {
            (Some(path), None) => Ok(ImageSource::Path(path)),
            (None, Some(pixels)) => Ok(ImageSource::Pixels(pixels)),
            (None, None) => Err(PredictionError::Usage(
                "either an image path or a pixel buffer is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(PredictionError::Usage(
                "give an image path or a pixel buffer, not both".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_part() {
        let image = DynamicImage::new_rgb8(4, 4);
        let path = Path::new("rose.jpg");

        assert!(matches!(
            ImageSource::from_parts(Some(path), None),
            Ok(ImageSource::Path(_))
        ));
        assert!(matches!(
            ImageSource::from_parts(None, Some(&image)),
            Ok(ImageSource::Pixels(_))
        ));
        assert!(matches!(
            ImageSource::from_parts(None, None),
            Err(PredictionError::Usage(_))
        ));
        assert!(matches!(
            ImageSource::from_parts(Some(path), Some(&image)),
            Err(PredictionError::Usage(_))
        ));
    }
}
