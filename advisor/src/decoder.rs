//! Incremental decoder for chat-completion Server-Sent-Events.
//!
//! Only the subset of SSE that chat-completion endpoints emit is
//! understood: one JSON object per `data: ` line, `:` keepalive
//! comments, and a literal `[DONE]` sentinel. Event boundaries (blank
//! lines) carry no meaning here.

use crate::error::DecodeError;
use log::{debug, trace, warn};
use serde_json::Value;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Decode state for a single response body.
///
/// Feed it raw body chunks in arrival order; every content delta
/// extends [`DeltaDecoder::text`] and is reported through the
/// `on_update` hook with the full accumulated text. The text only ever
/// grows.
///
/// A data line whose JSON fails to parse is assumed to be truncated. It
/// stays at the head of the buffer and is retried when the next chunk
/// arrives, holding back the lines behind it. By default this repeats
/// until the stream ends; see [`DeltaDecoder::with_retry_limit`].
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    /// Text received but not yet terminated by a newline.
    pending: String,

    /// Tail of an incomplete UTF-8 sequence from the last chunk.
    carry: Vec<u8>,

    /// Accumulated content.
    text: String,

    /// No further content will be applied.
    complete: bool,

    /// Parse failures allowed for the line at the head of the buffer.
    retry_limit: Option<usize>,

    /// Consecutive parse failures of the line at the head of the buffer.
    attempts: usize,
}

/// How a single line is handled.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Skip,
    Done,
    Payload(&'a str),
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns a data line that keeps failing to parse into
    /// [`DecodeError::MalformedPayload`] after `limit` retries instead
    /// of waiting for the end of the stream.
    #[must_use]
    pub fn with_retry_limit(mut self, limit: usize) -> Self {
        self.retry_limit = Some(limit);
        self
    }

    /// Content accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns true once `[DONE]` was seen or the stream was finished.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Processes one chunk of the response body.
    pub fn feed<F>(&mut self, chunk: &[u8], mut on_update: F) -> Result<(), DecodeError>
    where
        F: FnMut(&str),
    {
        if self.complete {
            return Ok(());
        }

        decode_utf8(&mut self.carry, chunk, &mut self.pending);

        let mut consumed = 0;
        while let Some(newline) = self.pending[consumed..].find('\n') {
            let end = consumed + newline;
            let line = &self.pending[consumed..end];
            let line = line.strip_suffix('\r').unwrap_or(line);

            match classify(line) {
                Line::Skip => trace!("skip; {line:?}"),
                Line::Done => {
                    debug!("done; text_len: {}", self.text.len());
                    self.pending.clear();
                    self.complete = true;
                    return Ok(());
                }
                Line::Payload(payload) => match serde_json::from_str::<Value>(payload) {
                    Ok(value) => {
                        self.attempts = 0;
                        if let Some(content) = delta_content(&value) {
                            self.text.push_str(content);
                            on_update(&self.text);
                        }
                    }
                    Err(source) => {
                        // Leave the line in place and wait for more data.
                        self.attempts += 1;
                        trace!("deferred; attempt: {}, {line:?}", self.attempts);
                        if let Some(limit) = self.retry_limit {
                            if self.attempts > limit {
                                let line = line.to_owned();
                                let attempts = self.attempts;
                                self.pending.drain(..=end);
                                self.attempts = 0;
                                warn!("giving up on data line after {attempts} attempts");
                                return Err(DecodeError::MalformedPayload {
                                    line,
                                    attempts,
                                    source,
                                });
                            }
                        }
                        break;
                    }
                },
            }
            consumed = end + 1;
        }
        self.pending.drain(..consumed);
        Ok(())
    }

    /// Flushes whatever is still buffered once the transport reports
    /// the end of the body.
    ///
    /// Unterminated lines are processed like complete ones, except that
    /// parse failures are dropped since no more data is coming.
    pub fn finish<F>(&mut self, mut on_update: F)
    where
        F: FnMut(&str),
    {
        if self.complete {
            return;
        }
        self.complete = true;

        if !self.carry.is_empty() {
            debug!("dropping {} trailing bytes of partial utf-8", self.carry.len());
            self.carry.clear();
        }

        let pending = std::mem::take(&mut self.pending);
        if pending.trim().is_empty() {
            return;
        }

        for line in pending.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match classify(line) {
                Line::Skip => (),
                Line::Done => break,
                Line::Payload(payload) => match serde_json::from_str::<Value>(payload) {
                    Ok(value) => {
                        if let Some(content) = delta_content(&value) {
                            self.text.push_str(content);
                            on_update(&self.text);
                        }
                    }
                    Err(e) => warn!("dropping unparsable data line at end of stream: {e}"),
                },
            }
        }
    }
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(':') || line.trim().is_empty() {
        return Line::Skip;
    }
    match line.strip_prefix(DATA_PREFIX).map(str::trim) {
        Some(DONE_SENTINEL) => Line::Done,
        Some(payload) => Line::Payload(payload),
        None => Line::Skip,
    }
}

/// Returns `choices[0].delta.content` when it is a non-empty string.
fn delta_content(value: &Value) -> Option<&str> {
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
}

/// Appends `chunk` to `out` as UTF-8, carrying an incomplete trailing
/// sequence over to the next call. Invalid sequences become U+FFFD.
fn decode_utf8(carry: &mut Vec<u8>, chunk: &[u8], out: &mut String) {
    let joined: Vec<u8>;
    let mut bytes = if carry.is_empty() {
        chunk
    } else {
        carry.extend_from_slice(chunk);
        joined = std::mem::take(carry);
        &joined[..]
    };

    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(invalid) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        bytes = &rest[invalid..];
                    }
                    None => {
                        carry.extend_from_slice(rest);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, decode_utf8, DeltaDecoder, Line};
    use crate::error::DecodeError;

    fn delta(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    /// Feeds every chunk then finishes, returning each update.
    fn decode(chunks: &[&[u8]]) -> (String, Vec<String>) {
        let mut decoder = DeltaDecoder::new();
        let mut updates = Vec::new();
        for chunk in chunks {
            decoder
                .feed(chunk, |text| updates.push(text.to_owned()))
                .unwrap();
        }
        decoder.finish(|text| updates.push(text.to_owned()));
        (decoder.into_text(), updates)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(": keepalive"), Line::Skip);
        assert_eq!(classify("   "), Line::Skip);
        assert_eq!(classify("event: message"), Line::Skip);
        assert_eq!(classify("data:{}"), Line::Skip);
        assert_eq!(classify("data: [DONE]"), Line::Done);
        assert_eq!(classify("data:  [DONE]  "), Line::Done);
        assert_eq!(classify("data: {\"a\":1} "), Line::Payload("{\"a\":1}"));
    }

    #[test]
    fn test_line_split_across_chunks() {
        let (text, updates) = decode(&[
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel",
            b"lo\"}}]}\n",
        ]);
        assert_eq!(text, "Hello");
        assert_eq!(updates, vec!["Hello"]);
    }

    #[test]
    fn test_growing_snapshots() {
        let stream = [delta("Soil "), delta("looks "), delta("dry.")].concat();
        let (text, updates) = decode(&[stream.as_bytes()]);
        assert_eq!(text, "Soil looks dry.");
        assert_eq!(updates, vec!["Soil ", "Soil looks ", "Soil looks dry."]);
    }

    #[test]
    fn test_done_halts() {
        let first = [delta("a"), "data: [DONE]\n".to_string(), delta("b")].concat();
        let second = delta("c");
        let mut decoder = DeltaDecoder::new();
        let mut updates = 0;
        decoder.feed(first.as_bytes(), |_| updates += 1).unwrap();
        assert!(decoder.is_complete());
        decoder.feed(second.as_bytes(), |_| updates += 1).unwrap();
        decoder.finish(|_| updates += 1);
        assert_eq!(decoder.text(), "a");
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let (text, updates) = decode(&[b": keepalive\n", b"\n", b"\r\n", b": ping\n"]);
        assert_eq!(text, "");
        assert!(updates.is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let stream = delta("crlf").replace('\n', "\r\n");
        let (text, _) = decode(&[stream.as_bytes()]);
        assert_eq!(text, "crlf");
    }

    #[test]
    fn test_end_of_stream_flush() {
        let last = delta("end");
        let last = last.trim_end_matches('\n');
        let (text, updates) = decode(&[delta("the ").as_bytes(), last.as_bytes()]);
        assert_eq!(text, "the end");
        assert_eq!(updates, vec!["the ", "the end"]);
    }

    #[test]
    fn test_ignores_deltas_without_content() {
        let stream = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n",
            "data: {\"choices\":[]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":7}}]}\n",
            "data: 42\n",
        );
        let (text, updates) = decode(&[stream.as_bytes()]);
        assert_eq!(text, "");
        assert!(updates.is_empty());
    }

    #[test]
    fn test_malformed_line_blocks_until_end() {
        // A complete but malformed line holds back everything behind it
        // until the final flush, which drops it and applies the rest.
        let stream = ["data: {oops}\n".to_string(), delta("after")].concat();
        let mut decoder = DeltaDecoder::new();
        let mut updates = Vec::new();
        decoder
            .feed(stream.as_bytes(), |t| updates.push(t.to_owned()))
            .unwrap();
        assert_eq!(decoder.text(), "");
        decoder
            .feed(b": keepalive\n", |t| updates.push(t.to_owned()))
            .unwrap();
        assert_eq!(decoder.text(), "");
        decoder.finish(|t| updates.push(t.to_owned()));
        assert_eq!(decoder.text(), "after");
        assert_eq!(updates, vec!["after"]);
    }

    #[test]
    fn test_retry_limit() {
        let mut decoder = DeltaDecoder::new().with_retry_limit(1);
        decoder.feed(b"data: {oops}\n", |_| ()).unwrap();
        let err = decoder.feed(delta("next").as_bytes(), |_| ()).unwrap_err();
        let DecodeError::MalformedPayload { line, attempts, .. } = err;
        assert_eq!(line, "data: {oops}");
        assert_eq!(attempts, 2);
        // The offending line is gone; the next chunk resumes normally.
        decoder.feed(b"\n", |_| ()).unwrap();
        assert_eq!(decoder.text(), "next");
    }

    #[test]
    fn test_multibyte_split() {
        let stream = delta("café 🌾");
        let bytes = stream.as_bytes();
        let split = stream.find('🌾').unwrap() + 2;
        let (text, _) = decode(&[&bytes[..split], &bytes[split..]]);
        assert_eq!(text, "café 🌾");
    }

    #[test]
    fn test_decode_utf8_replaces_invalid() {
        let mut carry = Vec::new();
        let mut out = String::new();
        decode_utf8(&mut carry, b"ok\xffok\xe2\x82", &mut out);
        assert_eq!(out, "ok\u{FFFD}ok");
        assert_eq!(carry, b"\xe2\x82");
        decode_utf8(&mut carry, b"\xac", &mut out);
        assert_eq!(out, "ok\u{FFFD}ok€");
        assert!(carry.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let stream = [delta("same "), delta("output"), "data: [DONE]\n".into()].concat();
        let first = decode(&[stream.as_bytes()]);
        let second = decode(&[stream.as_bytes()]);
        assert_eq!(first, second);
        assert_eq!(first.0, "same output");
    }
}
