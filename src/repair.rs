use crate::draft::RecipeDraft;
use crate::options::Options;
use memchr::{memchr2, memchr3};

/// Result of one parse attempt over the accumulated generator text.
///
/// Attempts are independent: the caller discards each one after consuming
/// it, retaining only the latest successful draft for diffing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseAttempt {
    /// The text parsed as-is. Common once the stream finishes or whenever the
    /// accumulated prefix happens to be self-consistent.
    Parsed(RecipeDraft),
    /// The text only parsed after the textual repair pass.
    Repaired(RecipeDraft),
    /// No usable draft could be recovered; callers keep their last candidate.
    Failed,
}

impl ParseAttempt {
    /// The recovered draft, if any.
    pub fn into_draft(self) -> Option<RecipeDraft> {
        match self {
            Self::Parsed(draft) | Self::Repaired(draft) => Some(draft),
            Self::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Best-effort parse of a possibly truncated generator document.
///
/// The input is always the full accumulated text, not the latest chunk:
/// earlier incompleteness may have been resolved by later bytes, so repair is
/// re-attempted on the whole buffer every time. Total — never panics, never
/// does I/O.
pub fn attempt_parse(text: &str, opts: &Options) -> ParseAttempt {
    let body = fence_body(text, opts);
    if let Some(draft) = parse_exact(body) {
        return ParseAttempt::Parsed(draft);
    }
    let repaired = repair_text(body, opts);
    match parse_exact(&repaired) {
        Some(draft) => ParseAttempt::Repaired(draft),
        None => {
            log::debug!(
                "no usable draft in {} bytes of partial generator output",
                text.len()
            );
            ParseAttempt::Failed
        }
    }
}

/// Strict parse with no repair pass, used for the authoritative end-of-stream
/// attempt. Fence stripping still applies: a fenced document is complete even
/// though the fence itself is not JSON.
pub fn exact_parse(text: &str, opts: &Options) -> Option<RecipeDraft> {
    parse_exact(fence_body(text, opts))
}

fn parse_exact(text: &str) -> Option<RecipeDraft> {
    serde_json::from_str(text).ok()
}

/// Drop a surrounding Markdown code fence. The opening fence line may carry a
/// language tag (```json); everything up to its newline belongs to the fence.
/// While the fence line itself is still streaming in there is no body yet.
fn fence_body<'a>(text: &'a str, opts: &Options) -> &'a str {
    if !opts.strip_code_fences {
        return text;
    }
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(nl) = rest.find('\n') else {
        return "";
    };
    // Trailing backticks outside a string are never valid JSON, so stripping
    // a partially received closing fence is safe too.
    rest[nl + 1..].trim_end().trim_end_matches('`').trim_end()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Brace,
    Bracket,
}

#[derive(Debug, Default)]
struct ScanState {
    in_string: bool,
    stack: Vec<Delim>,
}

/// Textual repair pass: remove dangling list separators, close an unterminated
/// string, then close the still-open containers in reverse order of opening.
pub(crate) fn repair_text(text: &str, opts: &Options) -> String {
    let mut repaired = if opts.strip_dangling_commas {
        strip_dangling_commas(text)
    } else {
        text.to_string()
    };
    let scan = scan_open_state(&repaired);
    if scan.in_string {
        log::trace!("repair: closing unterminated string");
        repaired.push('"');
    }
    if !scan.stack.is_empty() {
        log::trace!("repair: closing {} open container(s)", scan.stack.len());
    }
    for delim in scan.stack.iter().rev() {
        repaired.push(match delim {
            Delim::Bracket => ']',
            Delim::Brace => '}',
        });
    }
    repaired
}

/// Remove commas that a cut-off generator left dangling: a comma whose next
/// significant character closes a container, or one at the very end of the
/// buffer. String-aware so commas inside values survive.
fn strip_dangling_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape = false;
    for (idx, ch) in text.char_indices() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let mut j = idx + 1;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j >= bytes.len() || bytes[j] == b'}' || bytes[j] == b']' {
                    log::trace!("repair: dropping dangling comma at byte {}", idx);
                    continue;
                }
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Left-to-right scan of the buffer tracking string state (with
/// backslash-escape handling) and the stack of open `{`/`[` delimiters,
/// updated only outside strings. All interesting characters are ASCII, so the
/// scan runs on bytes and skips uninteresting runs with memchr.
fn scan_open_state(text: &str) -> ScanState {
    let bytes = text.as_bytes();
    let mut state = ScanState::default();
    let mut i = 0usize;
    while i < bytes.len() {
        if state.in_string {
            match memchr2(b'"', b'\\', &bytes[i..]) {
                Some(p) => {
                    let j = i + p;
                    if bytes[j] == b'\\' {
                        // The escaped character cannot toggle string state.
                        i = j + 2;
                    } else {
                        state.in_string = false;
                        i = j + 1;
                    }
                }
                // Rest of the buffer is string content.
                None => break,
            }
            continue;
        }
        let rest = &bytes[i..];
        let mut next = memchr3(b'"', b'{', b'[', rest);
        if let Some(p) = memchr2(b'}', b']', rest) {
            next = Some(next.map_or(p, |b| b.min(p)));
        }
        let Some(p) = next else { break };
        let j = i + p;
        match bytes[j] {
            b'"' => state.in_string = true,
            b'{' => state.stack.push(Delim::Brace),
            b'[' => state.stack.push(Delim::Bracket),
            // A well-formed prefix always closes the innermost container;
            // mismatched or redundant closers are ignored.
            b'}' => {
                if state.stack.last() == Some(&Delim::Brace) {
                    state.stack.pop();
                }
            }
            b']' => {
                if state.stack.last() == Some(&Delim::Bracket) {
                    state.stack.pop();
                }
            }
            _ => {}
        }
        i = j + 1;
    }
    state
}
