use crate::error::MultipartError;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// RFC 2046 cap on the boundary token length.
pub const MAX_BOUNDARY_LEN: usize = 70;

/// Extracts and validates the `boundary` parameter from a `Content-Type`
/// header value.
pub fn boundary_from_content_type(content_type: &str) -> Result<String, MultipartError> {
    let mime = content_type
        .parse::<mime::Mime>()
        .map_err(|_| MultipartError::IllegalBoundary {
            reason: "Content-Type header did not parse",
        })?;

    if mime.essence_str() != MULTIPART_FORM_DATA {
        return Err(MultipartError::IllegalBoundary {
            reason: "Content-Type must be multipart/form-data",
        });
    }

    let boundary = mime
        .get_param(mime::BOUNDARY)
        .map(|value| value.as_str().to_owned())
        .ok_or(MultipartError::IllegalBoundary {
            reason: "Content-Type is missing the boundary parameter",
        })?;

    validate_boundary(&boundary)?;
    Ok(boundary)
}

/// Validates a boundary token against RFC 2046, before any read occurs.
pub fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::IllegalBoundary {
            reason: "boundary cannot be empty",
        });
    }

    if boundary.len() > MAX_BOUNDARY_LEN {
        return Err(MultipartError::IllegalBoundary {
            reason: "boundary cannot exceed 70 characters",
        });
    }

    if boundary.ends_with(' ') {
        return Err(MultipartError::IllegalBoundary {
            reason: "boundary cannot end with a space",
        });
    }

    if !boundary.chars().all(is_boundary_char) {
        return Err(MultipartError::IllegalBoundary {
            reason: "boundary contains characters outside the RFC 2046 set",
        });
    }

    Ok(())
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}
