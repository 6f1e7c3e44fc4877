pub const DEFAULT_NODE_CAPACITY: usize = 512;

pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 12;

pub const MAX_DEPTH: usize = 256;

/// JSON insignificant whitespace: space, tab, CR, LF.
#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}
