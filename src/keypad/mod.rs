/// Keypad as seen by the CPU (Ex9E, ExA1, Fx0A)
pub trait KeyInput {
    fn is_key_pressed(&self, cpu_index: u8) -> bool;

    /// Some pressed key, if any
    fn any_key(&self) -> Option<u8>;
}

/// Host keyboard layout: the 1234/QWER/ASDF/ZXCV block mapped onto the hex keypad
struct Keymap;

impl Keymap {
    pub fn cpu_index(key_index: usize) -> u8 {
        const CPU_INDICES: [u8; Keypad::NUM] = [
            0x1, 0x2, 0x3, 0xC,
            0x4, 0x5, 0x6, 0xD,
            0x7, 0x8, 0x9, 0xE,
            0xA, 0x0, 0xB, 0xF,
        ];

        CPU_INDICES[key_index]
    }

    pub fn key_index(cpu_index: usize) -> usize {
        const KEY_INDICES: [usize; Keypad::NUM] = [
            0xD, 0x0, 0x1, 0x2,
            0x4, 0x5, 0x6, 0x8,
            0x9, 0xA, 0xC, 0xE,
            0x3, 0x7, 0xB, 0xF,
        ];

        KEY_INDICES[cpu_index & 0xF]
    }

    pub fn from_char(key: char) -> Option<usize> {
        let key_index = match key.to_ascii_lowercase() {
            '1' => 0,
            '2' => 1,
            '3' => 2,
            '4' => 3,
            'q' => 4,
            'w' => 5,
            'e' => 6,
            'r' => 7,
            'a' => 8,
            's' => 9,
            'd' => 10,
            'f' => 11,
            'z' => 12,
            'x' => 13,
            'c' => 14,
            'v' => 15,
            _ => return None,
        };

        Some(key_index)
    }
}

type KeyState = [bool; Keypad::NUM];

pub struct Keypad {
    state: KeyState,
}

impl Keypad {
    const NUM: usize = 16;

    pub fn press(&mut self, cpu_index: u8) {
        self.state[Keymap::key_index(cpu_index as usize)] = true;
    }

    pub fn release(&mut self, cpu_index: u8) {
        self.state[Keymap::key_index(cpu_index as usize)] = false;
    }

    /// Fills key state from the host's currently held keys
    pub fn update_state<I: IntoIterator<Item = char>>(&mut self, held: I) {
        self.state.fill(false);

        held.into_iter().for_each(|key| {
            if let Some(key_index) = Keymap::from_char(key) {
                self.state[key_index] = true;
            }
        });
    }
}

impl KeyInput for Keypad {
    fn is_key_pressed(&self, cpu_index: u8) -> bool {
        self.state[Keymap::key_index(cpu_index as usize)]
    }

    /// Returns the pressed key that comes first in host layout order
    fn any_key(&self) -> Option<u8> {
        (0..Self::NUM).find(|&key_index| self.state[key_index]).map(Keymap::cpu_index)
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self { state: [false; Self::NUM] }
    }
}
