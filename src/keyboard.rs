use minifb::Key;

pub const KEY_COUNT: usize = 16;

/// Key-input collaborator consulted by the interpreter for EX9E, EXA1 and
/// FX0A. Keys are the hex digits 0x0..=0xF.
pub trait Keypad {
    fn is_pressed(&self, key: u8) -> bool;

    /// Lowest-numbered key currently held, if any.
    fn pressed_key(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|k| self.is_pressed(*k))
    }
}

/// Pressed state for the 16-key hex pad.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    pub fn press(&mut self, key: u8) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = true;
        }
    }

    pub fn release(&mut self, key: u8) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = false;
        }
    }

    /// Replaces the pressed set with the mapped subset of `host_keys`.
    pub fn update_keys(&mut self, host_keys: &[Key]) {
        self.reset();
        for key in host_keys {
            if let Some(n) = key_to_num(*key) {
                self.press(n);
            }
        }
    }
}

impl Keypad for Keyboard {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }
}

/// Left-hand block of a QWERTY keyboard onto the COSMAC hex pad:
/// ```text
/// |1|2|3|4|      |1|2|3|C|
/// |Q|W|E|R|  ->  |4|5|6|D|
/// |A|S|D|F|  ->  |7|8|9|E|
/// |Z|X|C|V|      |A|0|B|F|
/// ```
pub fn key_to_num(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xC),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(key_to_num(Key::X), Some(0x0));
        assert_eq!(key_to_num(Key::Key4), Some(0xC));
        assert_eq!(key_to_num(Key::V), Some(0xF));
        assert_eq!(key_to_num(Key::Escape), None);
    }

    #[test]
    fn test_update_keys_replaces_state() {
        let mut kb = Keyboard::new();
        kb.update_keys(&[Key::W, Key::Space]);
        assert!(kb.is_pressed(0x5));
        assert_eq!(kb.pressed_key(), Some(0x5));
        kb.update_keys(&[Key::F]);
        assert!(!kb.is_pressed(0x5));
        assert!(kb.is_pressed(0xE));
    }

    #[test]
    fn test_pressed_key_lowest_first() {
        let mut kb = Keyboard::new();
        assert_eq!(kb.pressed_key(), None);
        kb.press(0xB);
        kb.press(0x3);
        assert_eq!(kb.pressed_key(), Some(0x3));
        kb.release(0x3);
        assert_eq!(kb.pressed_key(), Some(0xB));
    }

    #[test]
    fn test_out_of_range_keys_ignored() {
        let mut kb = Keyboard::new();
        kb.press(0x42);
        assert!(!kb.is_pressed(0x42));
        assert_eq!(kb.pressed_key(), None);
    }
}
