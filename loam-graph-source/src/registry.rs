//! Pluggable registry mapping format ids and media types to deserializers.
//!
//! The registry is built mutably at startup and then shared frozen behind an
//! `Arc`; the read path takes no locks. Registration order is significant:
//! it decides Accept-header preference (§ [`crate::negotiate`]).
//!
//! ## Invariants
//!
//! - One media type maps to at most one format at any time.
//! - Re-registering a format id replaces its entry in place: the entry keeps
//!   its registration-order slot and its old media types are released.
//! - Format ids and media types are ASCII-lowercased; media-type parameters
//!   (`;charset=...`) are stripped on lookup.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SourceError};
use crate::loader::Deserializer;

// ---------------------------------------------------------------------------
// FormatId
// ---------------------------------------------------------------------------

/// Opaque, case-insensitive identifier for a registered format.
///
/// Normalized to ASCII lowercase at construction, so `FormatId::new("Turtle")`
/// and `FormatId::new("turtle")` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatId(Arc<str>);

impl FormatId {
    pub fn new(id: impl AsRef<str>) -> Self {
        FormatId(Arc::from(id.as_ref().trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FormatId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Strip parameters, trim, and lowercase a media type.
pub(crate) fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// FormatRegistry
// ---------------------------------------------------------------------------

/// One registered format: its id, media types, and deserializer.
pub struct RegistryEntry {
    pub format: FormatId,
    /// Normalized media types; the first is the canonical one used when the
    /// caller pinned this format explicitly.
    pub media_types: Vec<String>,
    pub deserializer: Arc<dyn Deserializer>,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("format", &self.format)
            .field("media_types", &self.media_types)
            .finish_non_exhaustive()
    }
}

/// Registry of deserializers keyed by format id and media type.
#[derive(Default)]
pub struct FormatRegistry {
    /// Entries in registration order.
    entries: Vec<RegistryEntry>,
    by_format: HashMap<FormatId, usize>,
    by_media_type: HashMap<String, usize>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("entries", &self.entries)
            .finish()
    }
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `format` under the given media types.
    ///
    /// The first media type becomes the canonical one. Fails with
    /// [`SourceError::DuplicateMediaType`] if any media type is already
    /// claimed by a *different* format; on failure the registry is left
    /// unchanged. Registering an id that already exists replaces that entry
    /// in place, keeping its registration-order slot and releasing the media
    /// types it no longer claims.
    pub fn register(
        &mut self,
        format: FormatId,
        media_types: &[&str],
        deserializer: Arc<dyn Deserializer>,
    ) -> Result<()> {
        let normalized: Vec<String> = media_types
            .iter()
            .map(|mt| normalize_media_type(mt))
            .collect();

        // All-or-nothing: check every media type before touching any map.
        for media_type in &normalized {
            if let Some(&slot) = self.by_media_type.get(media_type) {
                let claimed_by = &self.entries[slot].format;
                if *claimed_by != format {
                    return Err(SourceError::duplicate_media_type(
                        media_type,
                        claimed_by.clone(),
                        format,
                    ));
                }
            }
        }

        debug!(format = %format, media_types = ?normalized, "registering format");
        let entry = RegistryEntry {
            format: format.clone(),
            media_types: normalized,
            deserializer,
        };

        match self.by_format.get(&format).copied() {
            Some(slot) => {
                for old in &self.entries[slot].media_types {
                    self.by_media_type.remove(old);
                }
                for media_type in &entry.media_types {
                    self.by_media_type.insert(media_type.clone(), slot);
                }
                self.entries[slot] = entry;
            }
            None => {
                let slot = self.entries.len();
                for media_type in &entry.media_types {
                    self.by_media_type.insert(media_type.clone(), slot);
                }
                self.by_format.insert(format, slot);
                self.entries.push(entry);
            }
        }
        Ok(())
    }

    /// Look up an entry by format id.
    pub fn lookup_format(&self, format: &FormatId) -> Option<&RegistryEntry> {
        self.by_format.get(format).map(|&slot| &self.entries[slot])
    }

    /// Look up an entry by media type. Parameters are stripped, so
    /// `text/turtle; charset=UTF-8` matches a `text/turtle` registration.
    pub fn lookup_media_type(&self, media_type: &str) -> Option<&RegistryEntry> {
        self.by_media_type
            .get(&normalize_media_type(media_type))
            .map(|&slot| &self.entries[slot])
    }

    /// All registered media types, in registration order.
    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.media_types.iter().map(String::as_str))
    }

    /// All registered formats, in registration order.
    pub fn formats(&self) -> impl Iterator<Item = &FormatId> {
        self.entries.iter().map(|entry| &entry.format)
    }

    /// Number of registered formats.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
