use crate::gb::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Frame buffer to store the current screen state as row-major RGBA pixels.
#[derive(Clone)]
pub struct FrameBuffer {
    buffer: Vec<[u8; 4]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            buffer: vec![[0, 0, 0, 255]; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl FrameBuffer {
    /// Returns the width of the frame buffer image in pixels.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    /// Returns the height of the frame buffer image in pixels.
    #[inline(always)]
    pub const fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    #[inline]
    pub fn write_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        self.buffer[y * SCREEN_WIDTH + x] = rgba;
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.buffer[y * SCREEN_WIDTH + x]
    }

    /// Returns the packed `[R, G, B, A]` bytes of the whole frame.
    #[inline]
    pub fn as_rgba(&self) -> &[u8] {
        self.buffer.as_flattened()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_layout() {
        let mut frame = FrameBuffer::default();
        assert_eq!(frame.as_rgba().len(), 160 * 144 * 4);

        frame.write_pixel(0, 0, [1, 2, 3, 4]);
        frame.write_pixel(10, 0, [5, 6, 7, 8]);
        frame.write_pixel(0, 10, [9, 10, 11, 12]);

        assert_eq!(frame.pixel(10, 0), [5, 6, 7, 8]);
        assert_eq!(&frame.as_rgba()[0..4], &[1, 2, 3, 4]);
        assert_eq!(&frame.as_rgba()[40..44], &[5, 6, 7, 8]);
        assert_eq!(&frame.as_rgba()[160 * 10 * 4..160 * 10 * 4 + 4], &[9, 10, 11, 12]);
    }
}
