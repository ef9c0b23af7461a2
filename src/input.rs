//! Source input streams.
//!
//! An [`InputStream`] decodes raw bytes into chars incrementally and tags
//! them with a virtual filename for diagnostics. REPL input and files go
//! through the same path.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{self, Diagnostic};

/// Filename tag used for REPL / in-memory sources.
pub const REPL_FILE: &str = "$repl";

/// A char stream decoded from UTF-8 bytes, carrying a filename tag.
pub struct InputStream {
    file: String,
    reader: Box<dyn Read>,
    enc_buffer: Vec<u8>,
    read_end: bool,
}

impl InputStream {
    /// Open a stream over a file on disk.
    pub fn from_file(path: &str) -> Result<Self, Diagnostic> {
        if !Path::new(path).exists() {
            return Err(error::file_not_found(path));
        }
        let file = File::open(path).map_err(|e| error::file_open_error(path, &e.to_string()))?;
        Ok(Self {
            file: path.to_string(),
            reader: Box::new(file),
            enc_buffer: Vec::new(),
            read_end: false,
        })
    }

    /// Wrap a text buffer, usually one REPL line.
    pub fn from_text(text: &str) -> Self {
        Self {
            file: REPL_FILE.to_string(),
            reader: Box::new(io::Cursor::new(text.as_bytes().to_vec())),
            enc_buffer: Vec::new(),
            read_end: false,
        }
    }

    /// Read up to `n` bytes and decode as many complete chars as possible.
    /// A trailing incomplete sequence is buffered for the next call; an
    /// invalid sequence, or leftover bytes at end of input, surface a
    /// decode-utf8 diagnostic naming the offending byte.
    pub fn read(&mut self, n: usize) -> Result<Vec<char>, Diagnostic> {
        let mut chunk = vec![0u8; n];
        let got = self
            .reader
            .read(&mut chunk)
            .map_err(|e| error::read_stream_error(&e.to_string()))?;

        if got == 0 {
            self.read_end = true;
            if !self.enc_buffer.is_empty() {
                return Err(error::decode_utf8_fail(self.enc_buffer[0]));
            }
            return Ok(Vec::new());
        }

        self.enc_buffer.extend_from_slice(&chunk[..got]);
        match std::str::from_utf8(&self.enc_buffer) {
            Ok(valid) => {
                let chars = valid.chars().collect();
                self.enc_buffer.clear();
                Ok(chars)
            }
            Err(e) => {
                let valid_len = e.valid_up_to();
                if e.error_len().is_some() {
                    // a truly malformed sequence, not just a split one
                    return Err(error::decode_utf8_fail(self.enc_buffer[valid_len]));
                }
                let chars = std::str::from_utf8(&self.enc_buffer[..valid_len])
                    .expect("validated prefix")
                    .chars()
                    .collect();
                self.enc_buffer.drain(..valid_len);
                Ok(chars)
            }
        }
    }

    /// Whether the underlying reader is exhausted.
    pub fn at_end(&self) -> bool {
        self.read_end
    }

    pub fn file(&self) -> &str {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_multibyte_chars_across_read_boundaries() {
        let mut stream = InputStream::from_text("令甲为1");
        let mut chars = Vec::new();
        // 2-byte reads split every CJK char (3 bytes each)
        loop {
            let batch = stream.read(2).expect("read should succeed");
            if batch.is_empty() && stream.at_end() {
                break;
            }
            chars.extend(batch);
        }
        assert_eq!(chars, vec!['令', '甲', '为', '1']);
    }

    #[test]
    fn reports_offending_byte_on_truncated_sequence() {
        let mut stream = InputStream {
            file: REPL_FILE.to_string(),
            reader: Box::new(io::Cursor::new(vec![0xE4, 0xBB])), // truncated 令
            enc_buffer: Vec::new(),
            read_end: false,
        };
        stream.read(16).expect("split sequence is buffered");
        let err = stream.read(16).expect_err("expected decode failure");
        assert_eq!(err.code(), 0x2020);
    }

    #[test]
    fn tags_repl_sources() {
        let stream = InputStream::from_text("1");
        assert_eq!(stream.file(), REPL_FILE);
    }
}
