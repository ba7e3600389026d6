//! # Field Advisor
//!
//! `advisor` requests agronomy advice for a field from a streaming
//! chat-completion endpoint and reassembles the streamed
//! Server-Sent-Events body into a steadily growing text.
//!
//! The decoding half ([`DeltaDecoder`], [`AdviceStream`]) is transport
//! agnostic and works over any byte source; [`AdvisorClient`] wires it
//! to a blocking HTTP client.

mod client;
mod decoder;
mod error;
pub mod prompt;
mod request;
mod stream;

pub use crate::{
    client::{AdvisorClient, AdvisorConfig, AdvisorConfigBuilder, Endpoint},
    decoder::DeltaDecoder,
    error::{AdvisorError, DecodeError},
    request::{AdviceRequest, FieldSummary, WeatherSnapshot},
    stream::AdviceStream,
};
