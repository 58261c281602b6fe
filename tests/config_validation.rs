#![allow(missing_docs)]

use std::io::Cursor;

use partwise::{ConfigError, Limits, Multipart, MultipartBuilder, MultipartConfig, MultipartError};

#[test]
fn default_configuration_validates() {
    MultipartConfig::default().validate().expect("defaults are valid");
    MultipartBuilder::new().validate().expect("builder defaults are valid");
}

#[test]
fn rejects_a_buffer_smaller_than_the_delimiter() {
    // Delimiter is "\r\n--BOUND" (9 bytes); anything up to 10 is refused.
    let config = MultipartConfig {
        buffer_size: 10,
        ..MultipartConfig::default()
    };
    let err = Multipart::with_config("BOUND", Cursor::new(&b""[..]), config)
        .expect_err("undersized buffer must be rejected");
    assert!(matches!(
        err,
        MultipartError::Config(ConfigError::BufferTooSmall {
            buffer_size: 10,
            required: 10,
        })
    ));

    let config = MultipartConfig {
        buffer_size: 11,
        ..MultipartConfig::default()
    };
    Multipart::with_config("BOUND", Cursor::new(&b""[..]), config)
        .expect("smallest legal buffer must be accepted");
}

#[test]
fn rejects_zero_valued_limits() {
    let config = MultipartConfig {
        limits: Limits {
            max_body_size: Some(0),
            ..Limits::default()
        },
        ..MultipartConfig::default()
    };
    assert!(matches!(
        config.validate().expect_err("zero body limit must fail"),
        ConfigError::InvalidLimitValue {
            limit: "max_body_size"
        }
    ));

    let config = MultipartConfig {
        limits: Limits {
            max_part_size: Some(0),
            ..Limits::default()
        },
        ..MultipartConfig::default()
    };
    assert!(matches!(
        config.validate().expect_err("zero part limit must fail"),
        ConfigError::InvalidLimitValue {
            limit: "max_part_size"
        }
    ));

    let config = MultipartConfig {
        max_header_block_size: 0,
        ..MultipartConfig::default()
    };
    assert!(matches!(
        config.validate().expect_err("zero header cap must fail"),
        ConfigError::InvalidLimitValue {
            limit: "max_header_block_size"
        }
    ));
}

#[test]
fn rejects_a_part_limit_above_the_body_limit() {
    let config = MultipartConfig {
        limits: Limits {
            max_body_size: Some(100),
            max_part_size: Some(200),
        },
        ..MultipartConfig::default()
    };
    assert!(matches!(
        config.validate().expect_err("inverted limits must fail"),
        ConfigError::PartLimitExceedsBodyLimit {
            max_part_size: 200,
            max_body_size: 100,
        }
    ));
}

#[test]
fn builder_setters_are_reflected_in_the_configuration() {
    let builder = MultipartBuilder::new()
        .buffer_size(8192)
        .content_length(12345)
        .max_header_block_size(2048)
        .limits(Limits::new().max_body_size(1 << 20).max_part_size(1 << 16));

    let config = builder.config();
    assert_eq!(config.buffer_size, 8192);
    assert_eq!(config.content_length, Some(12345));
    assert_eq!(config.max_header_block_size, 2048);
    assert_eq!(config.limits.max_body_size, Some(1 << 20));
    assert_eq!(config.limits.max_part_size, Some(1 << 16));
}

#[test]
fn invalid_configuration_fails_at_build_time() {
    let err = MultipartBuilder::new()
        .limits(Limits {
            max_body_size: Some(0),
            ..Limits::default()
        })
        .build("BOUND", Cursor::new(&b""[..]))
        .expect_err("invalid limits must fail the build");
    assert!(matches!(
        err,
        MultipartError::Config(ConfigError::InvalidLimitValue { .. })
    ));
}
