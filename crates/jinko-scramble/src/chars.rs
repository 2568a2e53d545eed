//! Character constants for the scramble animation.

/// Candidate noise glyphs shown before a slot resolves: uppercase letters,
/// digits, and common keyboard symbols.
pub const NOISE_CHARS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '!', '@',
    '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '=', '+', '{', '}', '|', '[', ']', '\\', ';',
    '\'', ':', '"', '<', '>', '?', ',', '.', '/', '`', '~',
];
