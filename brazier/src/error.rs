// Copyright 2026 brazier Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    fmt::{Debug, Display},
    sync::Arc,
};

/// ErrorKind is all kinds of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An empty key was passed to a group operation.
    InvalidKey,
    /// The backing source reports that the key does not exist.
    NotFound,
    /// The backing source failed to produce a value.
    Load,
    /// A peer transport call failed.
    Peer,
    /// An in-flight load was abandoned before it completed.
    Interrupted,
}

impl ErrorKind {
    /// Convert self into static str.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<ErrorKind> for &'static str {
    fn from(v: ErrorKind) -> &'static str {
        match v {
            ErrorKind::InvalidKey => "Invalid key",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Load => "Load error",
            ErrorKind::Peer => "Peer error",
            ErrorKind::Interrupted => "Interrupted",
        }
    }
}

/// The error struct returned by all brazier functions.
///
/// Cloning is cheap: the source error, if any, is shared.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Arc<anyhow::Error>>,
}

impl Error {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Set source for error.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(Arc::new(source.into()));
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Downcast the reference of the source error to a specific error type reference.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    /// An empty key was passed to a group operation.
    pub fn invalid_key() -> Self {
        Self::new(ErrorKind::InvalidKey, "key is required")
    }

    /// The key does not exist at the source.
    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("key not found: {key}"))
    }

    /// The backing source failed.
    pub fn load(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorKind::Load, "load from source failed").with_source(source)
    }

    /// A peer transport call failed.
    pub fn peer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Peer, message)
    }

    /// The in-flight load was abandoned before it completed.
    pub fn interrupted() -> Self {
        Self::new(ErrorKind::Interrupted, "in-flight load abandoned")
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut de = f.debug_struct("Error");
        de.field("kind", &self.kind);
        de.field("message", &self.message);
        de.field("source", &self.source);
        de.finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref().as_ref())
    }
}

/// Result type for brazier.
pub type Result<T> = std::result::Result<T, Error>;
