use http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::error::ParseError;

const DEFAULT_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Ordered raw header lines of one part, exactly as they appeared on the
/// wire (CRLF terminators stripped, no decoding applied).
///
/// The streaming core stops here; everything semantic — header names,
/// `Content-Disposition` parameters, charsets — is the concern of
/// [`RawHeaders::parse`] and friends, which the caller invokes when needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawHeaders {
    lines: Vec<Vec<u8>>,
}

impl RawHeaders {
    /// Wraps raw header lines produced by the parser.
    pub fn new(lines: Vec<Vec<u8>>) -> Self {
        Self { lines }
    }

    /// Number of header lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` for a part with no header lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates the raw header lines in wire order.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }

    /// Returns the value bytes of the first header line whose name matches
    /// `name` case-insensitively, with surrounding whitespace trimmed.
    pub fn value(&self, name: &str) -> Option<&[u8]> {
        self.lines.iter().find_map(|line| {
            let colon = line.iter().position(|&b| b == b':')?;
            let line_name = trim_ascii(&line[..colon]);
            if line_name.eq_ignore_ascii_case(name.as_bytes()) {
                Some(trim_ascii(&line[colon + 1..]))
            } else {
                None
            }
        })
    }

    /// Converts the raw lines into an [`http::HeaderMap`].
    pub fn to_header_map(&self) -> Result<HeaderMap, ParseError> {
        let mut map = HeaderMap::with_capacity(self.lines.len());
        for line in &self.lines {
            let colon = line
                .iter()
                .position(|&b| b == b':')
                .ok_or_else(|| ParseError::new("header line is missing a colon"))?;
            let name = HeaderName::from_bytes(trim_ascii(&line[..colon]))
                .map_err(|_| ParseError::new("invalid part header name"))?;
            let value = HeaderValue::from_bytes(trim_ascii(&line[colon + 1..]))
                .map_err(|_| ParseError::new("invalid part header value"))?;
            map.append(name, value);
        }
        Ok(map)
    }

    /// Decodes the headers a form-data part is expected to carry.
    pub fn parse(&self) -> Result<ParsedPartHeaders, ParseError> {
        let disposition_raw = self
            .value(header::CONTENT_DISPOSITION.as_str())
            .ok_or_else(|| ParseError::new("missing Content-Disposition header"))?;
        let disposition_raw = std::str::from_utf8(disposition_raw)
            .map_err(|_| ParseError::new("Content-Disposition header must be UTF-8"))?;
        let content_disposition = parse_content_disposition(disposition_raw)?;

        let field_name = content_disposition
            .name
            .clone()
            .ok_or_else(|| ParseError::new("missing part field name"))?;

        let content_type_raw = self
            .value(header::CONTENT_TYPE.as_str())
            .map(|raw| {
                std::str::from_utf8(raw)
                    .map_err(|_| ParseError::new("Content-Type header must be UTF-8"))
            })
            .transpose()?;
        let content_type = parse_part_content_type(content_type_raw)?;

        Ok(ParsedPartHeaders {
            file_name: content_disposition.filename.clone(),
            content_disposition,
            field_name,
            content_type,
        })
    }
}

/// Decoded `Content-Disposition` metadata for a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, typically `form-data`.
    pub disposition: String,
    /// `name` parameter.
    pub name: Option<String>,
    /// `filename` / `filename*` parameter, the RFC 5987 variant winning.
    pub filename: Option<String>,
}

/// Decoded header model for a form-data part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPartHeaders {
    /// Decoded content disposition metadata.
    pub content_disposition: ContentDisposition,
    /// Logical field name for this part.
    pub field_name: String,
    /// Optional file name, when this part carries a file.
    pub file_name: Option<String>,
    /// Part-level content type.
    pub content_type: mime::Mime,
}

/// Decodes a part `Content-Disposition` value.
pub fn parse_content_disposition(value: &str) -> Result<ContentDisposition, ParseError> {
    let mut segments = split_parameters(value).into_iter();
    let disposition = segments
        .next()
        .map(|segment| segment.trim().to_ascii_lowercase())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::new("invalid Content-Disposition header"))?;

    let mut name = None;
    let mut filename = None;
    let mut filename_ext = None;

    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
            return Err(ParseError::new("invalid Content-Disposition parameter"));
        };

        let key = raw_key.trim().to_ascii_lowercase();
        match key.as_str() {
            "name" => name = Some(unquote(raw_value.trim())?),
            "filename" => filename = Some(unquote(raw_value.trim())?),
            "filename*" => filename_ext = Some(decode_rfc5987(&unquote(raw_value.trim())?)?),
            _ => {}
        }
    }

    if disposition == "form-data" && matches!(name.as_deref(), None | Some("")) {
        return Err(ParseError::new(
            "form-data Content-Disposition must carry a non-empty `name`",
        ));
    }

    Ok(ContentDisposition {
        disposition,
        name,
        filename: filename_ext.or(filename),
    })
}

/// Decodes a part `Content-Type`, defaulting to `application/octet-stream`
/// when the part declares none.
pub fn parse_part_content_type(value: Option<&str>) -> Result<mime::Mime, ParseError> {
    value
        .unwrap_or(DEFAULT_PART_CONTENT_TYPE)
        .trim()
        .parse::<mime::Mime>()
        .map_err(|_| ParseError::new("invalid part Content-Type header"))
}

/// Strips one level of double quotes and resolves backslash escapes.
fn unquote(raw: &str) -> Result<String, ParseError> {
    let Some(inner) = raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        if raw.contains('"') {
            return Err(ParseError::new("unbalanced quotes in parameter value"));
        }
        return Ok(raw.to_owned());
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let escaped = chars
                .next()
                .ok_or_else(|| ParseError::new("dangling escape in quoted parameter"))?;
            out.push(escaped);
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// Decodes an RFC 5987 `charset'language'percent-encoded` value. Only the
/// UTF-8 charset is supported.
fn decode_rfc5987(value: &str) -> Result<String, ParseError> {
    let (charset, rest) = value
        .split_once('\'')
        .ok_or_else(|| ParseError::new("invalid filename* parameter encoding"))?;
    let (_language, encoded) = rest
        .split_once('\'')
        .ok_or_else(|| ParseError::new("invalid filename* parameter encoding"))?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return Err(ParseError::new("only UTF-8 filename* charset is supported"));
    }

    let raw = encoded.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut index = 0;
    while index < raw.len() {
        if raw[index] == b'%' {
            if index + 2 >= raw.len() {
                return Err(ParseError::new("invalid percent-encoding in filename*"));
            }
            let hi = hex_value(raw[index + 1])?;
            let lo = hex_value(raw[index + 2])?;
            bytes.push((hi << 4) | lo);
            index += 3;
        } else {
            bytes.push(raw[index]);
            index += 1;
        }
    }

    String::from_utf8(bytes).map_err(|_| ParseError::new("filename* is not valid UTF-8"))
}

fn hex_value(byte: u8) -> Result<u8, ParseError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ParseError::new("invalid percent-encoding in filename*")),
    }
}

/// Splits on semicolons that sit outside double-quoted parameter values.
fn split_parameters(value: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                current.push(ch);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |at| at + 1);
    &bytes[start..end]
}
