pub const DEFAULT_SPACES: usize = 4;

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest magnitude below which every integral `f32` is exactly representable.
pub(crate) const F32_EXACT_INT: f32 = 16_777_216.0;

#[inline]
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\r' | '\t')
}

#[inline]
pub fn is_control(ch: char) -> bool {
    matches!(ch, '\u{00}'..='\u{1f}' | '\u{7f}')
}
