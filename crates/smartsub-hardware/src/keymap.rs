//! US keyboard layout translation for keyboard-emulating readers.
//!
//! Readers type the tag as a burst of key presses followed by Enter. Only the
//! printable subset below is mapped; every other key code translates to
//! nothing and is ignored by the decoder.

/// `KEY_1`.
pub const KEY_1: u16 = 2;
/// `KEY_0`.
pub const KEY_0: u16 = 11;
/// `KEY_MINUS`.
pub const KEY_MINUS: u16 = 12;
/// `KEY_EQUAL`.
pub const KEY_EQUAL: u16 = 13;
/// `KEY_BACKSPACE`.
pub const KEY_BACKSPACE: u16 = 14;
/// `KEY_ENTER`, the tag terminator.
pub const KEY_ENTER: u16 = 28;
/// `KEY_LEFTSHIFT`.
pub const KEY_LEFTSHIFT: u16 = 42;
/// `KEY_RIGHTSHIFT`.
pub const KEY_RIGHTSHIFT: u16 = 54;
/// `KEY_SPACE`.
pub const KEY_SPACE: u16 = 57;

const DIGITS: [(u16, char, char); 10] = [
    (2, '1', '!'),
    (3, '2', '@'),
    (4, '3', '#'),
    (5, '4', '$'),
    (6, '5', '%'),
    (7, '6', '^'),
    (8, '7', '&'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
];

const LETTERS: [(u16, char); 26] = [
    (16, 'q'),
    (17, 'w'),
    (18, 'e'),
    (19, 'r'),
    (20, 't'),
    (21, 'y'),
    (22, 'u'),
    (23, 'i'),
    (24, 'o'),
    (25, 'p'),
    (30, 'a'),
    (31, 's'),
    (32, 'd'),
    (33, 'f'),
    (34, 'g'),
    (35, 'h'),
    (36, 'j'),
    (37, 'k'),
    (38, 'l'),
    (44, 'z'),
    (45, 'x'),
    (46, 'c'),
    (47, 'v'),
    (48, 'b'),
    (49, 'n'),
    (50, 'm'),
];

/// Returns `true` for either shift key.
#[inline]
pub fn is_shift(code: u16) -> bool {
    code == KEY_LEFTSHIFT || code == KEY_RIGHTSHIFT
}

/// Translate a key code to the character it types.
///
/// # Examples
///
/// ```
/// use smartsub_hardware::keymap::{key_to_char, KEY_ENTER};
///
/// assert_eq!(key_to_char(30, false), Some('a'));
/// assert_eq!(key_to_char(30, true), Some('A'));
/// assert_eq!(key_to_char(2, true), Some('!'));
/// assert_eq!(key_to_char(KEY_ENTER, false), None);
/// ```
pub fn key_to_char(code: u16, shift: bool) -> Option<char> {
    if let Some(&(_, plain, shifted)) = DIGITS.iter().find(|(c, _, _)| *c == code) {
        return Some(if shift { shifted } else { plain });
    }
    if let Some(&(_, letter)) = LETTERS.iter().find(|(c, _)| *c == code) {
        return Some(if shift {
            letter.to_ascii_uppercase()
        } else {
            letter
        });
    }
    match (code, shift) {
        (KEY_MINUS, false) => Some('-'),
        (KEY_MINUS, true) => Some('_'),
        (KEY_EQUAL, false) => Some('='),
        (KEY_EQUAL, true) => Some('+'),
        (KEY_SPACE, _) => Some(' '),
        _ => None,
    }
}

/// Find the key (and whether shift is needed) that types `c`.
///
/// Inverse of [`key_to_char`], used to simulate a reader typing text.
pub fn char_to_key(c: char) -> Option<(u16, bool)> {
    if let Some(&(code, plain, _)) = DIGITS.iter().find(|(_, p, s)| *p == c || *s == c) {
        return Some((code, c != plain));
    }
    let lower = c.to_ascii_lowercase();
    if let Some(&(code, _)) = LETTERS.iter().find(|(_, l)| *l == lower) {
        return Some((code, c.is_ascii_uppercase()));
    }
    match c {
        '-' => Some((KEY_MINUS, false)),
        '_' => Some((KEY_MINUS, true)),
        '=' => Some((KEY_EQUAL, false)),
        '+' => Some((KEY_EQUAL, true)),
        ' ' => Some((KEY_SPACE, false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(KEY_1, false, Some('1'))]
    #[case(KEY_0, false, Some('0'))]
    #[case(KEY_0, true, Some(')'))]
    #[case(4, true, Some('#'))]
    #[case(16, false, Some('q'))]
    #[case(50, true, Some('M'))]
    #[case(KEY_MINUS, false, Some('-'))]
    #[case(KEY_MINUS, true, Some('_'))]
    #[case(KEY_EQUAL, true, Some('+'))]
    #[case(KEY_SPACE, true, Some(' '))]
    #[case(KEY_ENTER, false, None)]
    #[case(KEY_BACKSPACE, false, None)]
    #[case(KEY_LEFTSHIFT, false, None)]
    #[case(1, false, None)]
    fn test_key_to_char(#[case] code: u16, #[case] shift: bool, #[case] expected: Option<char>) {
        assert_eq!(key_to_char(code, shift), expected);
    }

    #[test]
    fn test_is_shift() {
        assert!(is_shift(KEY_LEFTSHIFT));
        assert!(is_shift(KEY_RIGHTSHIFT));
        assert!(!is_shift(KEY_ENTER));
        assert!(!is_shift(29)); // left ctrl
    }

    #[test]
    fn test_char_to_key_inverts_key_to_char() {
        for c in "abcXYZ0123456789-_=+ !@#$%^&*()".chars() {
            let (code, shift) = char_to_key(c).unwrap();
            assert_eq!(key_to_char(code, shift), Some(c), "char {c:?}");
        }
    }

    #[test]
    fn test_char_to_key_unmapped() {
        assert_eq!(char_to_key('/'), None);
        assert_eq!(char_to_key('\n'), None);
        assert_eq!(char_to_key('ç'), None);
    }
}
