/*!
 * Fetch-then-load flow for a song.
 *
 * Lyrics are required: if they cannot be fetched the session fails. The
 * dictionaries are fetched once the session is already playable and are
 * registered as they arrive.
 */

use std::sync::Arc;

use futures::future::join_all;
use log::{info, warn};

use crate::dictionary::DictionaryLoadReport;
use crate::errors::SessionError;

use super::collaborators::{DictionarySource, LyricsSource};
use super::manager::{LoadReport, PlaybackSession};

/// Outcome of a full song load
#[derive(Debug, Clone)]
pub struct SongLoadReport {
    pub session: LoadReport,
    pub dictionaries: Vec<DictionaryLoadReport>,
    /// Names of the dictionaries that could not be fetched or registered
    pub failed_dictionaries: Vec<String>,
}

/// Drives a session through fetching lyrics and dictionaries
pub struct SessionLoader {
    lyrics: Arc<dyn LyricsSource>,
    dictionaries: Arc<dyn DictionarySource>,
    dictionary_names: Vec<String>,
}

impl SessionLoader {
    pub fn new(lyrics: Arc<dyn LyricsSource>, dictionaries: Arc<dyn DictionarySource>) -> Self {
        Self {
            lyrics,
            dictionaries,
            dictionary_names: Vec::new(),
        }
    }

    /// Dictionaries to fetch after the lyrics, in search order
    pub fn with_dictionaries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dictionary_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub async fn load(
        &self,
        session: &PlaybackSession,
        song_id: &str,
        language_tag: &str,
    ) -> Result<SongLoadReport, SessionError> {
        session.begin_loading()?;

        let payload = match self.lyrics.fetch_lyrics(song_id, language_tag).await {
            Ok(payload) => payload,
            Err(e) => {
                let error = SessionError::Fetch(format!("lyrics for '{}': {}", song_id, e));
                return Err(session.abort_loading(error));
            }
        };

        let report = session.complete_loading(payload, language_tag).await?;

        let fetches = self.dictionary_names.iter().map(|name| {
            let source = Arc::clone(&self.dictionaries);
            let tag = report.language.clone();
            async move { (name, source.fetch_dictionary(&tag, name).await) }
        });

        let mut dictionaries = Vec::new();
        let mut failed_dictionaries = Vec::new();

        // results come back in request order, which keeps the search order stable
        for (name, fetched) in join_all(fetches).await {
            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Could not fetch dictionary '{}': {}", name, e);
                    failed_dictionaries.push(name.clone());
                    continue;
                }
            };

            match session.registry().register_dictionary(&report.language, name, &raw) {
                Ok(dictionary_report) => dictionaries.push(dictionary_report),
                Err(e) => {
                    warn!("Could not register dictionary '{}': {}", name, e);
                    failed_dictionaries.push(name.clone());
                }
            }
        }

        info!(
            "Loaded song '{}': {} cues, {} dictionaries, {} failed",
            song_id,
            report.cue_count,
            dictionaries.len(),
            failed_dictionaries.len()
        );

        Ok(SongLoadReport {
            session: report,
            dictionaries,
            failed_dictionaries,
        })
    }
}
