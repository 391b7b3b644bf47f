/// # Keypad
/// Latches the host's key-down state for the executor to poll.
///
/// Keys are the hex digits 0x0..0xF. The latch also remembers the most
/// recently pressed key; releasing any key forgets it, matching the host
/// latch of the machine being emulated.
///
/// Only the host input collaborator writes the latch; the executor reads it.
#[derive(Copy, Clone, Default)]
pub struct Keypad {
    keys: [bool; 16],
    last_pressed: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// Record a key press or release. Indices outside 0x0..0xF are ignored.
    pub fn set_key(&mut self, index: u8, pressed: bool) {
        if index as usize >= self.keys.len() {
            return;
        }
        self.keys[index as usize] = pressed;
        self.last_pressed = if pressed { Some(index) } else { None };
    }

    /// Whether the key is currently held. Out-of-range indices read as up.
    pub fn is_pressed(&self, index: u8) -> bool {
        self.keys.get(index as usize).copied().unwrap_or(false)
    }

    /// The most recently pressed key, if none has been released since.
    pub fn last_pressed(&self) -> Option<u8> {
        self.last_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut keypad = Keypad::new();
        keypad.set_key(0xE, true);
        assert!(keypad.is_pressed(0xE));
        keypad.set_key(0xE, false);
        assert!(!keypad.is_pressed(0xE));
    }

    #[test]
    fn test_tracks_last_pressed() {
        let mut keypad = Keypad::new();
        keypad.set_key(0x1, true);
        keypad.set_key(0x2, true);
        assert_eq!(keypad.last_pressed(), Some(0x2));
    }

    #[test]
    fn test_any_release_forgets_last_pressed() {
        let mut keypad = Keypad::new();
        keypad.set_key(0x1, true);
        keypad.set_key(0x2, true);
        keypad.set_key(0x1, false);
        assert_eq!(keypad.last_pressed(), None);
        assert!(keypad.is_pressed(0x2));
    }

    #[test]
    fn test_ignores_out_of_range_indices() {
        let mut keypad = Keypad::new();
        keypad.set_key(0x10, true);
        assert_eq!(keypad.last_pressed(), None);
        assert!(!keypad.is_pressed(0x10));
    }
}
