//! Output sink: render target to image file

use std::path::Path;

use image::{ImageError, Rgb, RgbImage};

use crate::rasterizer::{Resource, UnsignedColor};

/// RGBA8 bytes, row-major, alpha 255
pub fn to_rgba_bytes(target: &Resource<UnsignedColor>) -> Vec<u8> {
    target.iter().flat_map(|c| c.to_bytes()).collect()
}

pub fn to_image(target: &Resource<UnsignedColor>) -> RgbImage {
    RgbImage::from_fn(target.width() as u32, target.height() as u32, |x, y| {
        let c = target.item_at(x as usize, y as usize);
        Rgb([c.r, c.g, c.b])
    })
}

/// Write the target to `path`; the format follows the file extension
pub fn save_resource<P: AsRef<Path>>(target: &Resource<UnsignedColor>, path: P) -> Result<(), ImageError> {
    to_image(target).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resource<UnsignedColor> {
        let mut target = Resource::new_2d(3, 2);
        *target.item_at_mut(2, 1) = UnsignedColor::new(10, 20, 30);
        *target.item_at_mut(0, 0) = UnsignedColor::WHITE;
        target
    }

    #[test]
    fn test_rgba_bytes_layout() {
        let bytes = to_rgba_bytes(&sample());
        assert_eq!(bytes.len(), 3 * 2 * 4);
        assert_eq!(&bytes[0..4], &[255, 255, 255, 255]);
        assert_eq!(&bytes[20..24], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_saved_png_matches_target() {
        let path = std::env::temp_dir().join(format!("softras-output-{}.png", std::process::id()));
        save_resource(&sample(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1), &Rgb([10, 20, 30]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 0, 0]));

        std::fs::remove_file(&path).unwrap();
    }
}
