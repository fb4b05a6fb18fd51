pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

pub type Grid = [[bool; WIDTH]; HEIGHT];

/// 64x32 monochrome pixel grid. Coordinates wrap modulo the screen size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Grid,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [[false; WIDTH]; HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.bit_buffer = [[false; WIDTH]; HEIGHT];
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.bit_buffer[y % HEIGHT][x % WIDTH]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        self.bit_buffer[y % HEIGHT][x % WIDTH] = value;
    }

    /// Toggles a pixel; true if it was lit and is now off.
    pub fn xor_pixel(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.bit_buffer[y % HEIGHT][x % WIDTH];
        let erased = *pixel;
        *pixel = !*pixel;
        erased
    }

    /// XORs `sprite` rows at (x, y), most significant bit leftmost.
    /// Returns whether any lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut collision = false;
        for (i, row) in sprite.iter().enumerate() {
            for j in 0..8 {
                if (row >> (7 - j)) & 1 == 1 {
                    collision |= self.xor_pixel(x + j, y + i);
                }
            }
        }
        collision
    }

    pub fn as_grid(&self) -> &Grid {
        &self.bit_buffer
    }

    pub fn lit_pixels(&self) -> usize {
        self.bit_buffer.iter().flatten().filter(|p| **p).count()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
