use std::time::Duration;

use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use crate::{
    display::{FrameBuffer, HEIGHT, WIDTH},
    error::EmuError,
};

const ON: (u16, u16, u16) = (0, 127, 255);
const OFF: (u16, u16, u16) = (0, 0, 0);

/// Host window showing a [`FrameBuffer`] and reporting held keys.
pub struct Screen {
    window: Window,
    pixel_buffer: Vec<u32>,
}

impl Screen {
    pub fn new(title: &str, scale: u8) -> Result<Self, EmuError> {
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale: to_scale(scale),
                ..WindowOptions::default()
            },
        )?;
        window.set_position(500, 300);
        // Limit to max ~60 fps update rate
        window.limit_update_rate(Some(Duration::from_micros(16600)));
        Ok(Self {
            window,
            pixel_buffer: vec![from_u16_rgb(OFF); WIDTH * HEIGHT],
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_pressed(Key::Escape, KeyRepeat::Yes)
    }

    pub fn keys(&self) -> Vec<Key> {
        self.window.get_keys()
    }

    /// Repaints from `fb` and presents the frame.
    pub fn render(&mut self, fb: &FrameBuffer) -> Result<(), EmuError> {
        fill_pixels(fb, &mut self.pixel_buffer);
        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)?;
        Ok(())
    }

    /// Pumps window events without a new frame, so keys stay fresh.
    pub fn update(&mut self) {
        self.window.update();
    }
}

fn to_scale(scale: u8) -> Scale {
    match scale {
        1 => Scale::X1,
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        32 => Scale::X32,
        _ => Scale::X16,
    }
}

fn from_u16_rgb((r, g, b): (u16, u16, u16)) -> u32 {
    let (r, g, b) = (r as u32, g as u32, b as u32);
    (r << 16) | (g << 8) | b
}

fn fill_pixels(fb: &FrameBuffer, pixels: &mut [u32]) {
    for (row, line) in fb.as_grid().iter().enumerate() {
        for (col, lit) in line.iter().enumerate() {
            pixels[row * WIDTH + col] = from_u16_rgb(if *lit { ON } else { OFF });
        }
    }
}
