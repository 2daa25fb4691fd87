//! Decoder for the `!`-separated WLS response token.
//!
//! Only the field layout is handled here. The signature is carried through
//! untouched for the validator to check.

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use webauth_sdk::{ParseError, ResponseDescriptor, ResponseParser};

const ISSUE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second]Z");

/// Field count for versions 1 and 2; version 3 adds `ptags`.
const LEGACY_FIELD_COUNT: usize = 13;
const V3_FIELD_COUNT: usize = 14;

/// Reference [`ResponseParser`] for WLS protocol versions 1 to 3.
#[derive(Debug, Clone, Copy, Default)]
pub struct WlsResponseParser;

impl WlsResponseParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ResponseParser for WlsResponseParser {
    fn parse(&self, token: &str) -> Result<ResponseDescriptor, ParseError> {
        if token.is_empty() {
            return Err(ParseError::Empty);
        }

        let fields: Vec<String> = token.split('!').map(unescape).collect();
        let version = parse_version(&fields[0])?;
        let expected = if version >= 3 {
            V3_FIELD_COUNT
        } else {
            LEGACY_FIELD_COUNT
        };
        if fields.len() != expected {
            return Err(ParseError::FieldCount {
                version,
                expected,
                actual: fields.len(),
            });
        }

        let mut fields = fields.into_iter().skip(1);
        let mut next = || fields.next().unwrap_or_default();

        let status = parse_status(&next())?;
        let message = next();
        let issue = parse_issue(&next())?;
        let id = next();
        let url = next();
        let principal = next();
        let ptags = if version >= 3 { split_list(&next()) } else { Vec::new() };
        let auth = next();
        let sso = split_list(&next());
        let life = parse_life(&next())?;
        let params = next();
        let kid = next();
        let signature = next();

        let mut builder = ResponseDescriptor::builder()
            .version(version)
            .status(status)
            .issue(issue)
            .id(id)
            .url(url)
            .principal(principal)
            .ptags(ptags)
            .sso(sso)
            .raw_token(token.to_owned());
        if !message.is_empty() {
            builder = builder.message(message);
        }
        if !auth.is_empty() {
            builder = builder.auth(auth);
        }
        if let Some(life) = life {
            builder = builder.life(life);
        }
        if !params.is_empty() {
            builder = builder.params(params);
        }
        if !kid.is_empty() {
            builder = builder.kid(kid);
        }
        if !signature.is_empty() {
            builder = builder.signature(signature);
        }
        Ok(builder.build())
    }
}

/// Reverse the WLS escaping of `!` as `%21` and `%` as `%25`.
fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%21") {
            out.push('!');
            rest = &tail[3..];
        } else if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn parse_version(field: &str) -> Result<u32, ParseError> {
    match field.parse::<u32>() {
        Ok(v @ 1..=3) => Ok(v),
        _ => Err(ParseError::UnsupportedVersion(field.to_owned())),
    }
}

fn parse_status(field: &str) -> Result<u16, ParseError> {
    if field.len() != 3 {
        return Err(invalid("status", format!("expected three digits, got '{field}'")));
    }
    field
        .parse()
        .map_err(|_| invalid("status", format!("not a number: '{field}'")))
}

fn parse_issue(field: &str) -> Result<time::OffsetDateTime, ParseError> {
    PrimitiveDateTime::parse(field, ISSUE_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| invalid("issue", e.to_string()))
}

fn parse_life(field: &str) -> Result<Option<u64>, ParseError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| invalid("life", format!("not a number: '{field}'")))
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn invalid(field: &'static str, reason: String) -> ParseError {
    ParseError::InvalidField { field, reason }
}
