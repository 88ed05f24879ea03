//! Log sanitization: redacts PII-looking text before it reaches a log sink.
//!
//! Patient names are never passed to logging calls. This writer is the
//! second line: any email address, phone number, report ID or long token
//! that slips into a formatted line is replaced before the line is written.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Default cap on bytes sanitized per line.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const RULES: [(&str, &str); 4] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-ID]",
    ),
    (
        r"(?i)\b[a-z0-9][a-z0-9._%+-]{0,63}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        "[REDACTED-PHONE]",
    ),
    (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-TOKEN]"),
];

struct Patterns {
    set: RegexSet,
    each: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        set: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        each: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
            .collect(),
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact PII-looking substrings, examining at most `max_bytes` of input.
#[must_use]
pub fn sanitize(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);
    let patterns = patterns();

    let mut out = prefix.to_string();
    for idx in patterns.set.matches(prefix).iter() {
        let (regex, replacement) = &patterns.each[idx];
        out = regex.replace_all(&out, *replacement).into_owned();
    }

    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// `MakeWriter` that sanitizes each formatted line before forwarding it.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M, max_bytes: usize) -> Self {
        Self { inner, max_bytes }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner
            .write_all(sanitize(&text, self.max_bytes).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line without a newline may not grow without bound.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
            max_bytes: self.max_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_report_ids() {
        let out = sanitize(
            "Saved report 550e8400-e29b-41d4-a716-446655440000 to storage",
            DEFAULT_SANITIZE_MAX_BYTES,
        );
        assert!(out.contains("[REDACTED-ID]"));
        assert!(!out.contains("550e8400"));
    }

    #[test]
    fn test_redacts_contact_details() {
        let out = sanitize(
            "contact mother@example.org or 555-123-4567",
            DEFAULT_SANITIZE_MAX_BYTES,
        );
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(out.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_redacts_long_hex_tokens() {
        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let out = sanitize(&format!("digest {digest}"), DEFAULT_SANITIZE_MAX_BYTES);
        assert!(out.contains("[REDACTED-TOKEN]"));
    }

    #[test]
    fn test_clinical_values_survive() {
        let line = "Inference complete: risk=High Risk, confidence=91.20%";
        assert_eq!(sanitize(line, DEFAULT_SANITIZE_MAX_BYTES), line);
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let out = sanitize("ééééé", 3);
        assert_eq!(out, "é [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                buffer: Vec::new(),
                max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
            };
            writer
                .write_all(b"email nurse@clinic.example\npartial")
                .expect("Should write");
            writer.flush().expect("Should flush");
        }

        let text = String::from_utf8(sink).expect("Valid UTF-8");
        assert_eq!(text, "email [REDACTED-EMAIL]\npartial");
    }
}
