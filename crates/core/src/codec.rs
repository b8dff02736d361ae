//! Codec gateway: type code + bytes <-> typed event
//!
//! The engine never inspects payloads. It asks an [`EventCodec`] to decode a
//! stored record by its type code, and (for convenience appends) to encode an
//! event. [`TypeRegistry`] is the built-in implementation: a table from type
//! code to a pair of functions, one per registered event shape.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = TypeRegistry::new(PayloadFormat::MessagePack);
//! registry.register("Opened", AccountEvent::Opened, |e| match e {
//!     AccountEvent::Opened(body) => Some(body),
//!     _ => None,
//! });
//! let bytes = registry.encode(&event)?;
//! let back = registry.decode("Opened", &bytes)?;
//! ```

use crate::config::PayloadFormat;
use crate::error::CodecError;
use crate::types::LogEvent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Turns typed events into payload bytes and back
///
/// Implementations must fail with [`CodecError::UnknownType`] for type codes
/// they do not know rather than guessing a shape.
pub trait EventCodec<E>: Send + Sync {
    /// Encode an event body
    fn encode(&self, event: &E) -> Result<Vec<u8>, CodecError>;

    /// Decode a payload written under `type_code`
    fn decode(&self, type_code: &str, payload: &[u8]) -> Result<E, CodecError>;
}

type DecodeFn<E> = Box<dyn Fn(&[u8]) -> Result<E, CodecError> + Send + Sync>;
type EncodeFn<E> = Box<dyn Fn(&E) -> Option<Result<Vec<u8>, CodecError>> + Send + Sync>;

struct Entry<E> {
    decode: DecodeFn<E>,
    encode: EncodeFn<E>,
}

/// Registry from type code to event shape
///
/// `E` is the host's event type, usually an enum with one variant per shape.
/// Each registration names the code, how to wrap a decoded body into `E`, and
/// how to project `E` back onto the body for encoding.
pub struct TypeRegistry<E> {
    format: PayloadFormat,
    entries: HashMap<String, Entry<E>>,
}

impl<E: 'static> TypeRegistry<E> {
    /// Create an empty registry using `format` for every payload
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            entries: HashMap::new(),
        }
    }

    /// Payload format used by this registry
    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Register the body type `T` under `type_code`
    ///
    /// `wrap` turns a decoded body into an event; `project` returns the body
    /// of an event of this shape and `None` otherwise. Re-registering a code
    /// replaces the previous entry.
    pub fn register<T>(
        &mut self,
        type_code: impl Into<String>,
        wrap: fn(T) -> E,
        project: fn(&E) -> Option<&T>,
    ) -> &mut Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let code: String = type_code.into();
        let format = self.format;

        let decode_code = code.clone();
        let decode: DecodeFn<E> = Box::new(move |payload| {
            decode_body::<T>(format, &decode_code, payload).map(wrap)
        });

        let encode_code = code.clone();
        let encode: EncodeFn<E> = Box::new(move |event| {
            project(event).map(|body| encode_body(format, &encode_code, body))
        });

        self.entries.insert(code, Entry { decode, encode });
        self
    }

    /// Register `E` itself as the payload shape of `type_code`
    ///
    /// For hosts whose event type is a single serde type that carries its
    /// own tag.
    pub fn register_event(&mut self, type_code: impl Into<String>) -> &mut Self
    where
        E: Serialize + DeserializeOwned,
    {
        self.register::<E>(type_code, |event| event, |event| Some(event))
    }

    /// Whether `type_code` has a registered shape
    pub fn contains(&self, type_code: &str) -> bool {
        self.entries.contains_key(type_code)
    }

    /// Registered type codes, in no particular order
    pub fn type_codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered shapes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, type_code: &str) -> Result<&Entry<E>, CodecError> {
        self.entries
            .get(type_code)
            .ok_or_else(|| CodecError::UnknownType(type_code.to_string()))
    }
}

impl<E: LogEvent> EventCodec<E> for TypeRegistry<E> {
    fn encode(&self, event: &E) -> Result<Vec<u8>, CodecError> {
        let code = event.type_code();
        let entry = self.entry(code)?;
        (entry.encode)(event).unwrap_or_else(|| Err(CodecError::ShapeMismatch(code.to_string())))
    }

    fn decode(&self, type_code: &str, payload: &[u8]) -> Result<E, CodecError> {
        (self.entry(type_code)?.decode)(payload)
    }
}

impl<E> std::fmt::Debug for TypeRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<_> = self.entries.keys().collect();
        codes.sort();
        f.debug_struct("TypeRegistry")
            .field("format", &self.format)
            .field("type_codes", &codes)
            .finish()
    }
}

fn encode_body<T: Serialize>(
    format: PayloadFormat,
    type_code: &str,
    body: &T,
) -> Result<Vec<u8>, CodecError> {
    let encoded = match format {
        PayloadFormat::MessagePack => rmp_serde::to_vec_named(body).map_err(|e| e.to_string()),
        PayloadFormat::Json => serde_json::to_vec(body).map_err(|e| e.to_string()),
    };
    encoded.map_err(|message| CodecError::Encode {
        type_code: type_code.to_string(),
        message,
    })
}

fn decode_body<T: DeserializeOwned>(
    format: PayloadFormat,
    type_code: &str,
    payload: &[u8],
) -> Result<T, CodecError> {
    let decoded = match format {
        PayloadFormat::MessagePack => rmp_serde::from_slice(payload).map_err(|e| e.to_string()),
        PayloadFormat::Json => serde_json::from_slice(payload).map_err(|e| e.to_string()),
    };
    decoded.map_err(|message| CodecError::Decode {
        type_code: type_code.to_string(),
        message,
    })
}
