use winit::keyboard::{Key, NamedKey};

pub const BACKSPACE: u8 = 0x08;
pub const TAB: u8 = 0x09;
pub const ENTER: u8 = 0x0D;
pub const ESCAPE: u8 = 0x1B;
pub const SPACE: u8 = 0x20;
pub const LEFT: u8 = 0x25;
pub const UP: u8 = 0x26;
pub const RIGHT: u8 = 0x27;
pub const DOWN: u8 = 0x28;

/// Single-byte virtual key code for a logical key. Letters are reported
/// upper-case; keys without a code are not reported.
pub fn virtual_key_code(key: &Key) -> Option<u8> {
    match key {
        Key::Character(text) => {
            let mut chars = text.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            if c.is_ascii_alphabetic() {
                Some(c.to_ascii_uppercase() as u8)
            } else if c.is_ascii_digit() {
                Some(c as u8)
            } else {
                None
            }
        }
        Key::Named(named) => match named {
            NamedKey::Backspace => Some(BACKSPACE),
            NamedKey::Tab => Some(TAB),
            NamedKey::Enter => Some(ENTER),
            NamedKey::Escape => Some(ESCAPE),
            NamedKey::Space => Some(SPACE),
            NamedKey::ArrowLeft => Some(LEFT),
            NamedKey::ArrowUp => Some(UP),
            NamedKey::ArrowRight => Some(RIGHT),
            NamedKey::ArrowDown => Some(DOWN),
            _ => None,
        },
        _ => None,
    }
}
