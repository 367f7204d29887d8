use std::borrow::Cow;
use std::path::Path;

use super::error::GraphicsError;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureWrap {
    #[default]
    Repeat,
    ClampToEdge,
}

/// Sampling and load options for a 2D texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TextureOptions {
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    /// Flip rows on load so that row 0 is the bottom of the image.
    pub flip_vertically: bool,
}

/// Tightly packed 8-bit RGB or RGBA pixels.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// RGBA view of the pixels; RGB data gains an opaque alpha channel.
    pub fn to_rgba(&self) -> Cow<'_, [u8]> {
        if self.channels == 4 {
            return Cow::Borrowed(&self.pixels);
        }
        let mut out = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(3) {
            out.extend_from_slice(px);
            out.push(u8::MAX);
        }
        Cow::Owned(out)
    }
}

/// Decodes an image file into 3- or 4-channel 8-bit pixels.
///
/// Any other channel count is a hard failure.
pub fn decode_file(path: &Path, flip_vertically: bool) -> Result<DecodedImage, GraphicsError> {
    let mut img = image::open(path).map_err(|source| GraphicsError::TextureDecode {
        path: path.to_path_buf(),
        source,
    })?;

    if flip_vertically {
        img = img.flipv();
    }

    let channels = img.color().channel_count();
    let (width, height) = (img.width(), img.height());
    let pixels = match channels {
        4 => img.into_rgba8().into_raw(),
        3 => img.into_rgb8().into_raw(),
        _ => {
            return Err(GraphicsError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            });
        }
    };

    Ok(DecodedImage {
        width,
        height,
        channels,
        pixels,
    })
}

#[cfg(test)]
pub(crate) mod test_images {
    use std::path::PathBuf;

    /// Writes a 2x2 PNG with a red top row and a blue bottom row.
    pub fn write_rgb_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trimana-{}-{name}.png", std::process::id()));
        let img = image::RgbImage::from_fn(2, 2, |_, y| {
            if y == 0 { image::Rgb([255, 0, 0]) } else { image::Rgb([0, 0, 255]) }
        });
        img.save(&path).expect("write test png");
        path
    }

    pub fn write_rgba_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trimana-{}-{name}.png", std::process::id()));
        image::RgbaImage::from_pixel(3, 1, image::Rgba([1, 2, 3, 4]))
            .save(&path)
            .expect("write test png");
        path
    }

    pub fn write_gray_png(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trimana-{}-{name}.png", std::process::id()));
        image::GrayImage::from_pixel(1, 1, image::Luma([9]))
            .save(&path)
            .expect("write test png");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::test_images::*;
    use super::*;

    #[test]
    fn rgb_png_decodes_with_three_channels() {
        let path = write_rgb_png("decode-rgb");
        let img = decode_file(&path, false).unwrap();

        assert_eq!((img.width, img.height, img.channels), (2, 2, 3));
        assert_eq!(&img.pixels[..3], &[255, 0, 0]);
    }

    #[test]
    fn flip_moves_bottom_row_first() {
        let path = write_rgb_png("decode-flip");
        let img = decode_file(&path, true).unwrap();
        assert_eq!(&img.pixels[..3], &[0, 0, 255]);
    }

    #[test]
    fn rgba_png_keeps_alpha() {
        let path = write_rgba_png("decode-rgba");
        let img = decode_file(&path, false).unwrap();
        assert_eq!(img.channels, 4);
        assert_eq!(img.to_rgba().as_ref(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let img = DecodedImage { width: 1, height: 1, channels: 3, pixels: vec![7, 8, 9] };
        assert_eq!(img.to_rgba().as_ref(), &[7, 8, 9, 255]);
    }

    #[test]
    fn grayscale_is_rejected() {
        let path = write_gray_png("decode-gray");
        let err = decode_file(&path, false).unwrap_err();
        assert!(matches!(err, GraphicsError::UnsupportedChannels { channels: 1, .. }));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let path = std::env::temp_dir().join("trimana-missing-texture.png");
        assert!(matches!(
            decode_file(&path, false),
            Err(GraphicsError::TextureDecode { .. })
        ));
    }
}
