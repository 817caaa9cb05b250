use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::compositor::SourceFrame;
use crate::error::FrameError;
use crate::pixel_format::{rgba_to_bgra, SOURCE_STRIDE};

/// Decode every page of an image file.
///
/// GIFs yield one fully composited frame per page; still images yield a
/// single frame.
pub fn decode_frames(path: &Path) -> Result<Vec<SourceFrame>, FrameError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    debug!("Detected format {:?} for {}", format, path.display());

    let images: Vec<RgbaImage> = match format {
        Some(ImageFormat::Gif) => {
            let decoder = GifDecoder::new(BufReader::new(File::open(path)?))?;
            decoder
                .into_frames()
                .collect_frames()?
                .into_iter()
                .map(|frame| frame.into_buffer())
                .collect()
        }
        _ => vec![reader.decode()?.into_rgba8()],
    };
    if images.is_empty() {
        return Err(FrameError::Empty);
    }
    let frames = images
        .into_iter()
        .map(to_source_frame)
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "Opened {} ({} frames, {}x{})",
        path.display(),
        frames.len(),
        frames[0].width(),
        frames[0].height()
    );
    Ok(frames)
}

fn to_source_frame(image: RgbaImage) -> Result<SourceFrame, FrameError> {
    let (width, height) = image.dimensions();
    let width = width as usize;
    SourceFrame::new(
        width,
        height as usize,
        width * SOURCE_STRIDE,
        rgba_to_bgra(image.into_raw()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::resample;
    use crate::geometry::Geometry;
    use crate::test_support::scratch_dir;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};

    #[test]
    fn test_decode_animated_gif() {
        let dir = scratch_dir("decode_gif");
        let path = dir.join("anim.gif");
        {
            let mut encoder = GifEncoder::new(File::create(&path).unwrap());
            for color in [[255, 0, 0, 255], [0, 0, 255, 255]] {
                let buffer = RgbaImage::from_pixel(5, 4, Rgba(color));
                let frame = Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1));
                encoder.encode_frame(frame).unwrap();
            }
        }

        let frames = decode_frames(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!((frames[0].width(), frames[0].height()), (5, 4));
        // red ends up in the third byte of each source pixel; the GIF
        // palette may shift colors slightly
        let packed = resample(&frames, &Geometry::default());
        assert!(packed[0] >= 0xF0 && packed[2] <= 0x0C);
        let second = Geometry::default().panel.frame_size();
        assert!(packed[second] <= 0x0C && packed[second + 2] >= 0xF0);
    }

    #[test]
    fn test_decode_still_image() {
        let dir = scratch_dir("decode_png");
        let path = dir.join("still.png");
        RgbaImage::from_pixel(3, 2, Rgba([0, 255, 0, 255]))
            .save(&path)
            .unwrap();

        let frames = decode_frames(&path).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!((frames[0].width(), frames[0].height()), (3, 2));
    }

    #[test]
    fn test_decode_missing_file() {
        let dir = scratch_dir("decode_missing");
        assert!(matches!(
            decode_frames(&dir.join("nope.gif")),
            Err(FrameError::Io(_))
        ));
    }

    #[test]
    fn test_decode_garbage() {
        let dir = scratch_dir("decode_garbage");
        let path = dir.join("junk.gif");
        std::fs::write(&path, b"GIF89a not really").unwrap();
        assert!(decode_frames(&path).is_err());
    }
}
