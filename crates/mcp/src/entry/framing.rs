#![forbid(unsafe_code)]

use std::io::BufRead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransportMode {
    NewlineJson,
    ContentLength,
}

/// Sniffs the framing style from the first non-empty line a client sends:
/// a JSON value means newline-delimited JSON, a header line means
/// `Content-Length` framing per the MCP spec.
pub(crate) fn detect_mode_from_first_line(line: &str) -> Option<TransportMode> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(TransportMode::NewlineJson);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("content-length:") || lower.starts_with("content-type:") {
        return Some(TransportMode::ContentLength);
    }
    None
}

pub(crate) fn parse_content_length_header(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    let (key, value) = trimmed.split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

/// Reads one header-framed body. `first_header` carries a header line that
/// was already consumed while sniffing the mode. Returns `None` on EOF.
pub(crate) fn read_content_length_frame<R: BufRead>(
    reader: &mut R,
    mut first_header: Option<String>,
) -> std::io::Result<Option<Vec<u8>>> {
    const MAX_CONTENT_LENGTH_BYTES: usize = 16 * 1024 * 1024;

    let mut header = String::new();
    if let Some(seed) = first_header.take() {
        header = seed;
    } else {
        let read = reader.read_line(&mut header)?;
        if read == 0 {
            return Ok(None);
        }
    }

    let mut content_length: Option<usize> = parse_content_length_header(&header);

    loop {
        let trimmed = header.trim_end();
        if trimmed.is_empty() {
            break;
        }

        header.clear();
        let read = reader.read_line(&mut header)?;
        if read == 0 {
            // EOF mid-header: treat as connection close.
            return Ok(None);
        }

        if content_length.is_none() {
            content_length = parse_content_length_header(&header);
        }
    }

    let Some(len) = content_length else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        ));
    };
    if len > MAX_CONTENT_LENGTH_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Content-Length exceeds max allowed size",
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}
