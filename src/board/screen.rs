//! Screen Module - The brick's 178x128 LCD surface
//!
//! A flat row-major intensity buffer with render dirty tracking. User
//! programs replace the whole frame at once; partial patches do not
//! exist at this layer. `did_change` compares bytes against the frame
//! the renderer last consumed, so writing an identical frame twice
//! renders nothing.
//!
//! The render consumer reads through a fixed RGBA interleave: pixel `i`
//! lands at output byte `3 + 4*i` (the alpha channel of an RGBA
//! surface over a black background). That stride is a compatibility
//! contract with existing render surfaces.

use crate::error::FrameError;
use crate::types::{SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH};

// =============================================================================
// SCREEN BUFFER
// =============================================================================

/// The brick's screen with render dirty tracking.
pub struct ScreenBuffer {
    points: Vec<u8>,
    rendered: Vec<u8>,
    dirty: bool,
}

impl ScreenBuffer {
    /// A black (all-zero) screen.
    pub fn new() -> Self {
        Self {
            points: vec![0; SCREEN_PIXELS],
            rendered: vec![0; SCREEN_PIXELS],
            dirty: false,
        }
    }

    /// Screen width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    /// Screen height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Replace the whole frame.
    ///
    /// The frame must cover every pixel. Dirtiness is decided here by
    /// byte comparison against the last rendered frame, so a write that
    /// restores the rendered content clears the dirty state.
    pub fn write(&mut self, frame: &[u8]) -> Result<(), FrameError> {
        if frame.len() != SCREEN_PIXELS {
            return Err(FrameError::BadFrameLength {
                got: frame.len(),
                want: SCREEN_PIXELS,
            });
        }
        self.points.copy_from_slice(frame);
        self.dirty = self.points != self.rendered;
        Ok(())
    }

    /// Black out the screen.
    pub fn clear(&mut self) {
        self.points.fill(0);
        self.dirty = self.points != self.rendered;
    }

    /// Whether the current frame differs from the last rendered one.
    ///
    /// A true read marks the current frame as rendered, so the next
    /// read is false until another differing write lands.
    pub fn did_change(&mut self) -> bool {
        if self.dirty {
            self.rendered.copy_from_slice(&self.points);
            self.dirty = false;
            true
        } else {
            false
        }
    }

    /// Intensity of one pixel. None outside the screen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            Some(self.points[y * SCREEN_WIDTH + x])
        } else {
            None
        }
    }

    /// The current frame, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.points
    }

    /// Blit the frame into an RGBA interleaved buffer.
    ///
    /// Writes pixel `i` to output byte `3 + 4*i` and leaves the other
    /// three channels untouched. The output must hold the whole screen
    /// (4 bytes per pixel).
    pub fn blit_rgba(&self, out: &mut [u8]) -> Result<(), FrameError> {
        if out.len() != 4 * SCREEN_PIXELS {
            return Err(FrameError::BadOutputLength {
                got: out.len(),
                want: 4 * SCREEN_PIXELS,
            });
        }
        let mut sp = 3;
        for &point in &self.points {
            out[sp] = point;
            sp += 4;
        }
        Ok(())
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FRAME
// =============================================================================

/// A full-screen frame under composition, before it is posted to the
/// screen buffer. What user programs draw into.
#[derive(Clone)]
pub struct Frame {
    pixels: Vec<u8>,
}

impl Frame {
    /// A black frame.
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_PIXELS],
        }
    }

    /// Fill every pixel with one intensity.
    pub fn fill(&mut self, value: u8) {
        self.pixels.fill(value);
    }

    /// Set one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            self.pixels[y * SCREEN_WIDTH + x] = value;
        }
    }

    /// Fill a rectangle, clipped to the screen. A rect starting past
    /// the screen edge fills nothing.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, value: u8) {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        let x_end = x.saturating_add(width).min(SCREEN_WIDTH);
        let y_end = y.saturating_add(height).min(SCREEN_HEIGHT);
        for row in y..y_end {
            let start = row * SCREEN_WIDTH;
            self.pixels[start + x..start + x_end].fill(value);
        }
    }

    /// The frame bytes, row-major, ready for [`ScreenBuffer::write`].
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
