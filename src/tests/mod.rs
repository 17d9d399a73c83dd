use super::*;

use async_trait::async_trait;
use bytes::Bytes;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

// Shared fixtures and helpers

pub(crate) const FULL_DOC: &str = r#"{
  "title": "Lentil Soup",
  "description": "A \"warming\" red lentil soup.",
  "ingredients": [
    { "name": "Red lentils", "quantity": "1", "unit": "cup" },
    { "name": "Water", "quantity": 4, "unit": "cups" }
  ],
  "instructions": ["Rinse the lentils.", "Simmer for 20 minutes."],
  "prepTime": "10 minutes",
  "cookTime": "20 minutes",
  "servings": 4,
  "category": "Soup",
  "cuisine": "Middle Eastern",
  "dietaryRestrictions": ["vegan"]
}"#;

pub(crate) fn parse_doc(text: &str) -> RecipeDraft {
    attempt_parse(text, &Options::default())
        .into_draft()
        .expect("usable draft")
}

/// Deterministic pseudo-random char-boundary chunking (LCG constants from
/// Numerical Recipes), for replaying documents with arbitrary chunk shapes.
pub(crate) fn lcg_chunks(text: &str, seed: u64) -> Vec<String> {
    let mut x = seed;
    let mut out = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        let mut n = (((x >> 24) as usize) % 13) + 1;
        while n < rest.len() && !rest.is_char_boundary(n) {
            n += 1;
        }
        if n >= rest.len() {
            out.push(rest.to_string());
            break;
        }
        out.push(rest[..n].to_string());
        rest = &rest[n..];
    }
    out
}

pub(crate) fn byte_stream(
    chunks: &[&str],
) -> impl futures::Stream<Item = Result<Bytes, Infallible>> + Unpin + use<> {
    let items: Vec<Result<Bytes, Infallible>> = chunks
        .iter()
        .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
        .collect();
    futures::stream::iter(items)
}

#[derive(Debug, Default)]
pub(crate) struct Recorded {
    pub drafts: Vec<RecipeDraft>,
    pub fields: Vec<Option<FieldPointer>>,
}

/// Sink that records every write so tests can assert on ordering and content.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink(pub Arc<Mutex<Recorded>>);

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Recorded>>) {
        let shared = Arc::new(Mutex::new(Recorded::default()));
        (Self(Arc::clone(&shared)), shared)
    }
}

#[async_trait]
impl DraftSink for RecordingSink {
    async fn set_draft(&mut self, draft: RecipeDraft) {
        self.0.lock().unwrap().drafts.push(draft);
    }

    async fn set_active_field(&mut self, field: Option<FieldPointer>) {
        self.0.lock().unwrap().fields.push(field);
    }
}

mod draft_model;
