//! Redaction of credentials and personal data in log output.
//!
//! Formatted log lines pass through [`redact`] before they reach the output.
//! Values of sensitive fields are masked by field name, in both the
//! `key=value` form of the text formatter and the `"key":value` form of the
//! JSON formatter. Email addresses, bearer credentials and JWTs are masked
//! wherever they appear, and quoted values longer than [`TRUNCATE_LENGTH`]
//! characters are cut short.

use std::borrow::Cow;
use std::io;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;

/// Replacement text for masked values
pub const REDACTED: &str = "[REDACTED]";

/// Longest quoted value kept in full
pub const TRUNCATE_LENGTH: usize = 512;

const TRUNCATED_SUFFIX: &str = "... [truncated]";

// Field names whose values are never logged
const SENSITIVE_KEY: &str = r"[A-Za-z0-9_.]*(?:pass(?:word|wd)?|secret|token|api[_-]?key|credential|session|auth|cookie|jti|email|phone|address|street|postal|zip|first_?name|last_?name|full_?name|surname)[A-Za-z0-9_]*";

const QUOTED: &str = r#""(?:[^"\\]|\\.)*""#;

static TEXT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"\b(?P<key>{SENSITIVE_KEY}|name)=(?:{QUOTED}|[^\s,}}"]+)"#))
        .expect("invalid text field pattern")
});

static JSON_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#""(?P<key>{SENSITIVE_KEY})":(?:{QUOTED}|[^,}}\]]+)"#))
        .expect("invalid json field pattern")
});

static SECRET_VALUES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}",
        r"(?i)bearer\s+[-A-Za-z0-9._~+/]+=*",
        r"eyJ[\w-]{10,}\.[\w-]{10,}\.[\w-]{5,}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid secret value pattern"))
    .collect()
});

static QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QUOTED).expect("invalid quoted value pattern"));

/// Mask sensitive data in one formatted log record
pub fn redact(input: &str) -> Cow<'_, str> {
    let mut output = Cow::Borrowed(input);

    if TEXT_FIELD.is_match(&output) {
        output = Cow::Owned(TEXT_FIELD.replace_all(&output, format!("${{key}}={REDACTED}")).into_owned());
    }
    if JSON_FIELD.is_match(&output) {
        output = Cow::Owned(
            JSON_FIELD
                .replace_all(&output, format!(r#""${{key}}":"{REDACTED}""#))
                .into_owned(),
        );
    }
    for pattern in SECRET_VALUES.iter() {
        if pattern.is_match(&output) {
            output = Cow::Owned(pattern.replace_all(&output, REDACTED).into_owned());
        }
    }

    let has_long_value = QUOTED_VALUE
        .find_iter(&output)
        .any(|quoted| quoted.as_str().chars().count() > TRUNCATE_LENGTH + 2);
    if has_long_value {
        output = Cow::Owned(
            QUOTED_VALUE
                .replace_all(&output, |caps: &Captures<'_>| truncate_quoted(&caps[0]))
                .into_owned(),
        );
    }

    output
}

fn truncate_quoted(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    if inner.chars().count() <= TRUNCATE_LENGTH {
        return quoted.to_string();
    }

    let mut kept: String = inner.chars().take(TRUNCATE_LENGTH).collect();
    // An odd run of trailing backslashes would escape the closing quote
    let trailing = kept.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        kept.pop();
    }
    format!("\"{kept}{TRUNCATED_SUFFIX}\"")
}

/// [`MakeWriter`] whose writers redact every record before passing it on
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer_for(meta),
        }
    }
}

/// Writer produced by [`RedactingMakeWriter`].
///
/// The formatter hands over each record in a single write, so every call is
/// redacted as a whole.
#[derive(Debug)]
pub struct RedactingWriter<W> {
    inner: W,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(redact(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
