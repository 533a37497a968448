//! Call transcript use-cases.
//!
//! Extraction itself happens outside the core; this service only stores the
//! resulting item list and marks the transcript processed.

use crate::model::time::{advance, Timestamp};
use crate::model::transcript::{Transcript, TranscriptId};
use crate::model::{normalize_list, required_body, required_line, EntityKind};
use crate::store::{DocumentStore, StoreResult};
use chrono::{NaiveDate, SubsecRound};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTranscript {
    pub title: String,
    pub text: String,
    /// When the call happened; defaults to creation time. Stored with
    /// microsecond precision.
    pub date: Option<Timestamp>,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptFilter {
    /// Case-insensitive participant name.
    pub participant: Option<String>,
    /// Only calls on or after this date.
    pub since: Option<NaiveDate>,
    pub processed: Option<bool>,
}

impl TranscriptFilter {
    fn matches(&self, transcript: &Transcript) -> bool {
        self.participant
            .as_deref()
            .map_or(true, |name| transcript.has_participant(name))
            && self
                .since
                .map_or(true, |since| transcript.date.date_naive() >= since)
            && self
                .processed
                .map_or(true, |processed| transcript.processed == processed)
    }
}

pub struct TranscriptService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> TranscriptService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn create_transcript(&mut self, input: NewTranscript) -> StoreResult<Transcript> {
        let kind = EntityKind::Transcript;
        let mut transcript = Transcript::new(
            required_line(kind, "title", &input.title)?,
            required_body(kind, "text", &input.text)?,
        );
        if let Some(date) = input.date {
            transcript.date = date.trunc_subsecs(6);
        }
        transcript.participants = normalize_list(kind, "participants", &input.participants)?;

        self.store.put_transcript(transcript.clone())?;
        Ok(transcript)
    }

    pub fn get_transcript(&self, id: TranscriptId) -> StoreResult<Transcript> {
        self.store.transcript(id).cloned()
    }

    /// Ordered by call date, then creation.
    pub fn list_transcripts(&self, filter: &TranscriptFilter) -> Vec<Transcript> {
        self.store
            .transcripts()
            .into_iter()
            .filter(|transcript| filter.matches(transcript))
            .cloned()
            .collect()
    }

    /// Replaces the extracted item list and marks the transcript processed.
    pub fn record_extracted_items(
        &mut self,
        id: TranscriptId,
        items: &[String],
    ) -> StoreResult<Transcript> {
        let items = items
            .iter()
            .map(|item| required_line(EntityKind::Transcript, "extracted_items", item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut transcript = self.store.transcript(id)?.clone();
        transcript.extracted_items = items;
        transcript.processed = true;
        transcript.updated_at = advance(transcript.updated_at);

        self.store.put_transcript(transcript.clone())?;
        Ok(transcript)
    }

    pub fn delete_transcript(&mut self, id: TranscriptId) -> StoreResult<()> {
        self.store.remove_transcript(id).map(|_| ())
    }
}
