//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use frrmon_utils::sink::SinkError;
use tracing::warn;

// Fatal errors for one collection pass.
#[derive(Debug)]
pub enum Error {
    Decode(DecodeError),
    Sink(SinkError),
}

// Structural errors in the instance tree.
//
// Any of these means the payload as a whole is unusable; the pass is
// aborted before a single sample is produced.
#[derive(Debug)]
pub enum DecodeError {
    InvalidJson(serde_json::Error),
    RootNotObject,
    InstanceNotObject(String),
}

// A single interface record that could not be turned into a typed state.
//
// Field errors are recoverable: the offending interface contributes no
// samples and its siblings are unaffected.
#[derive(Debug)]
pub struct FieldError {
    pub instance: String,
    pub ifname: String,
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

#[derive(Debug, Eq, PartialEq)]
pub enum FieldErrorKind {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Decode(error) => error.log(),
            Error::Sink(error) => {
                warn!(%error, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Decode(error) => error.fmt(f),
            Error::Sink(..) => {
                write!(f, "failed to write to the metric sink")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(error) => Some(error),
            Error::Sink(error) => Some(error),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(error: DecodeError) -> Error {
        Error::Decode(error)
    }
}

impl From<SinkError> for Error {
    fn from(error: SinkError) -> Error {
        Error::Sink(error)
    }
}

// ===== impl DecodeError =====

impl DecodeError {
    pub fn log(&self) {
        match self {
            DecodeError::InvalidJson(error) => {
                warn!(%error, "{}", self);
            }
            DecodeError::RootNotObject => {
                warn!("{}", self);
            }
            DecodeError::InstanceNotObject(instance) => {
                warn!(%instance, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidJson(..) => {
                write!(f, "payload is not valid JSON")
            }
            DecodeError::RootNotObject => {
                write!(f, "payload root is not an object")
            }
            DecodeError::InstanceNotObject(..) => {
                write!(f, "instance value is not an object")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidJson(error) => Some(error),
            _ => None,
        }
    }
}

// ===== impl FieldError =====

impl FieldError {
    pub fn log(&self) {
        warn!(
            instance = %self.instance,
            interface = %self.ifname,
            field = %self.field,
            "{}", self
        );
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldErrorKind::Missing => {
                write!(f, "missing required field")
            }
            FieldErrorKind::WrongType { expected, found } => {
                write!(
                    f,
                    "wrong field type (expected {expected}, found {found})"
                )
            }
        }
    }
}

impl std::error::Error for FieldError {}
