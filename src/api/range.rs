//! Parsing for single-range `Range` request headers.
//!
//! Supports the `bytes=start-end`, `bytes=start-` and `bytes=-suffix` forms.
//! Multi-range and malformed headers yield `None`, which callers treat as
//! "serve the full body" per RFC 7233.

#[derive(Debug, PartialEq, Eq)]
pub enum ByteRange {
    /// Inclusive byte range, already clamped to the resource length.
    Slice { start: u64, end: u64 },
    /// Syntactically valid but outside the resource, warrants a 416.
    Unsatisfiable,
}

pub fn parse(header: &str, len: u64) -> Option<ByteRange> {
    let spec = header.strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }

    let (start_part, end_part) = spec.split_once('-')?;
    let start_part = start_part.trim();
    let end_part = end_part.trim();

    // Suffix form: the last N bytes
    if start_part.is_empty() {
        let suffix: u64 = end_part.parse().ok()?;
        if suffix == 0 || len == 0 {
            return Some(ByteRange::Unsatisfiable);
        }
        return Some(ByteRange::Slice {
            start: len.saturating_sub(suffix),
            end: len - 1,
        });
    }

    let start: u64 = start_part.parse().ok()?;
    if start >= len {
        return Some(ByteRange::Unsatisfiable);
    }

    let end = if end_part.is_empty() {
        len - 1
    } else {
        let end: u64 = end_part.parse().ok()?;
        if end < start {
            return None;
        }
        end.min(len - 1)
    };

    Some(ByteRange::Slice { start, end })
}
