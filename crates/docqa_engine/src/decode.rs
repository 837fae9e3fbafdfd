use encoding_rs::{Encoding, UTF_8};

/// Pick the decoder for a response from its Content-Type charset, defaulting to UTF-8.
///
/// Lines are split on the `\n` byte before decoding, so only ASCII-compatible
/// charsets are honoured. UTF-16 and similar labels fall back to UTF-8.
pub fn encoding_for_content_type(content_type: Option<&str>) -> &'static Encoding {
    let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    else {
        return UTF_8;
    };
    if !encoding.is_ascii_compatible() {
        engine_logging::engine_warn!(
            "charset {} is not line-splittable; decoding stream as UTF-8",
            encoding.name()
        );
        return UTF_8;
    }
    encoding
}

/// Decode one complete line. Invalid sequences become U+FFFD rather than failing
/// the stream; a leading BOM is honoured and stripped.
pub fn decode_line(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        engine_logging::engine_debug!(
            "replaced malformed {} sequences in stream line",
            used.name()
        );
    }
    text.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_utf8() {
        assert_eq!(encoding_for_content_type(None), UTF_8);
        assert_eq!(encoding_for_content_type(Some("text/event-stream")), UTF_8);
        assert_eq!(
            encoding_for_content_type(Some("text/plain; charset=no-such-thing")),
            UTF_8
        );
    }

    #[test]
    fn honours_charset_parameter() {
        let enc = encoding_for_content_type(Some("text/event-stream; Charset=\"ISO-8859-1\""));
        assert_eq!(enc.name(), "windows-1252");
        assert_eq!(decode_line(b"caf\xe9", enc), "café");
    }

    #[test]
    fn non_ascii_compatible_charset_falls_back_to_utf8() {
        for content_type in [
            "text/event-stream; charset=utf-16le",
            "text/event-stream; charset=UTF-16BE",
        ] {
            assert_eq!(encoding_for_content_type(Some(content_type)), UTF_8);
        }
        let enc = encoding_for_content_type(Some("text/plain; charset=utf-16"));
        assert_eq!(decode_line("data: café".as_bytes(), enc), "data: café");
    }

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode_line(b"\xEF\xBB\xBFdata: x", UTF_8), "data: x");
    }
}
