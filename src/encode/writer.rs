use crate::text::Charset;

/// Raised when a write would run past the end of the buffer. Nothing is
/// written in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overflow;

/// Writer over a fixed byte slice. Every write checks the remaining room
/// before touching the buffer.
pub(crate) struct Writer<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn reserve(&self, len: usize) -> Result<(), Overflow> {
        if self.buffer.len() - self.position < len {
            return Err(Overflow);
        }
        Ok(())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), Overflow> {
        self.reserve(1)?;
        self.buffer[self.position] = byte;
        self.position += 1;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        self.reserve(bytes.len())?;
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    pub fn write_encoded(&mut self, text: &str, charset: Charset) -> Result<(), Overflow> {
        let len = charset.encoded_len(text);
        self.reserve(len)?;
        let written = charset.encode_to_slice(text, &mut self.buffer[self.position..]);
        self.position += written;
        Ok(())
    }

    /// `"key":` with the key in the fixed key charset.
    pub fn write_key(&mut self, key: &str) -> Result<(), Overflow> {
        self.reserve(Charset::KEY.encoded_len(key) + 3)?;
        self.write_byte(b'"')?;
        self.write_encoded(key, Charset::KEY)?;
        self.write_bytes(b"\":")
    }

    pub fn write_quoted(&mut self, text: &str, charset: Charset) -> Result<(), Overflow> {
        self.reserve(charset.encoded_len(text) + 2)?;
        self.write_byte(b'"')?;
        self.write_encoded(text, charset)?;
        self.write_byte(b'"')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_writer_basic() {
        let mut buf = [0u8; 16];
        let mut writer = Writer::new(&mut buf);

        writer.write_bytes(b"hello").unwrap();
        writer.write_byte(b' ').unwrap();
        writer.write_bytes(b"world").unwrap();

        let len = writer.position();
        assert_eq!(&buf[..len], b"hello world");
    }

    #[rstest::rstest]
    fn test_write_key_and_quoted() {
        let mut buf = [0u8; 32];
        let mut writer = Writer::new(&mut buf);

        writer.write_key("name").unwrap();
        writer.write_quoted("Ada", Charset::Utf8).unwrap();

        let len = writer.position();
        assert_eq!(&buf[..len], br#""name":"Ada""#);
    }

    #[rstest::rstest]
    fn test_overflow_leaves_buffer_untouched() {
        let mut buf = [0u8; 4];
        let mut writer = Writer::new(&mut buf);

        writer.write_bytes(b"ab").unwrap();
        assert_eq!(writer.write_quoted("xyz", Charset::Utf8), Err(Overflow));
        assert_eq!(writer.position(), 2);
        assert_eq!(buf, [b'a', b'b', 0, 0]);
    }

    #[rstest::rstest]
    fn test_exact_fit() {
        let mut buf = [0u8; 3];
        let mut writer = Writer::new(&mut buf);
        writer.write_bytes(b"abc").unwrap();
        assert_eq!(writer.write_byte(b'd'), Err(Overflow));
    }

    #[rstest::rstest]
    fn test_write_encoded_latin1() {
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        writer.write_encoded("caf\u{e9}", Charset::Latin1).unwrap();
        let len = writer.position();
        assert_eq!(&buf[..len], b"caf\xe9");
    }
}
