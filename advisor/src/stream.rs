use crate::{decoder::DeltaDecoder, error::AdvisorError};
use log::debug;
use std::{
    collections::VecDeque,
    io::{ErrorKind, Read},
};

/// Bytes requested from the body per read.
const CHUNK_SIZE: usize = 16 * 1024;

/// A pull-based view of a streamed advice body.
///
/// Each item is the full text accumulated so far, so the last `Ok`
/// item is the complete answer. Reading stops as soon as `[DONE]` is
/// seen. Dropping the stream abandons the underlying body.
///
/// Any error is terminal: the stream yields it once and then ends, and
/// callers should discard whatever text they had shown.
pub struct AdviceStream<R> {
    body: R,
    decoder: DeltaDecoder,
    buf: Box<[u8]>,

    /// Snapshots decoded but not yet handed out.
    ready: VecDeque<String>,

    /// Body exhausted, abandoned after `[DONE]`, or failed.
    finished: bool,

    /// Number of non-empty reads, for logging.
    chunks: usize,
}

impl<R: Read> AdviceStream<R> {
    pub fn new(body: R) -> Self {
        Self::with_decoder(body, DeltaDecoder::new())
    }

    pub fn with_decoder(body: R, decoder: DeltaDecoder) -> Self {
        Self {
            body,
            decoder,
            buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
            ready: VecDeque::new(),
            finished: false,
            chunks: 0,
        }
    }

    /// Drains the stream and returns the final text.
    pub fn into_text(self) -> Result<String, AdvisorError> {
        let mut text = String::new();
        for snapshot in self {
            text = snapshot?;
        }
        Ok(text)
    }

    fn fill(&mut self) -> Result<(), AdvisorError> {
        let ready = &mut self.ready;
        if self.decoder.is_complete() {
            self.finished = true;
            debug!("stream complete; chunks: {}", self.chunks);
            return Ok(());
        }
        match self.body.read(&mut self.buf) {
            Ok(0) => {
                self.finished = true;
                self.decoder.finish(|text| ready.push_back(text.to_owned()));
                debug!(
                    "stream closed; chunks: {}, text_len: {}",
                    self.chunks,
                    self.decoder.text().len()
                );
                Ok(())
            }
            Ok(n) => {
                self.chunks += 1;
                self.decoder
                    .feed(&self.buf[..n], |text| ready.push_back(text.to_owned()))?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read> Iterator for AdviceStream<R> {
    type Item = Result<String, AdvisorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(snapshot) = self.ready.pop_front() {
                return Some(Ok(snapshot));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.fill() {
                self.finished = true;
                self.ready.clear();
                return Some(Err(e));
            }
        }
    }
}
