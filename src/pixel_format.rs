/// Bytes per source pixel
pub const SOURCE_STRIDE: usize = 4;

/// Output channels, in the order they are stored per packed pixel
pub const CHANNELS: usize = 3;

/// Offset of output channel `channel` (0 = R, 1 = G, 2 = B) inside a source
/// pixel. Source pixels sit in memory as B, G, R, A.
#[inline]
pub const fn source_offset(channel: usize) -> usize {
    2 - channel
}

/// Quantize an 8-bit intensity to 6 bits, kept in the top of the byte
#[inline]
pub fn quantize(value: f32) -> u8 {
    let level = (value * 63.0 / 255.0).round().clamp(0.0, 63.0) as u8;
    level << 2
}

/// Reorder RGBA pixels into the BGRA layout (swap R and B in-place)
pub fn rgba_to_bgra(mut data: Vec<u8>) -> Vec<u8> {
    for pixel in data.chunks_exact_mut(SOURCE_STRIDE) {
        pixel.swap(0, 2);
    }
    data
}
