/*!
 * Integration tests for the playback session
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;

use lyrilex::dictionary::DictionaryRegistry;
use lyrilex::errors::SessionError;
use lyrilex::session::{
    spawn_position_feed, CuePresenter, CueUpdate, DictionarySource, LyricsSource, PlaybackSession,
    SessionLoader, SessionState,
};

use crate::common::{self, RecordingPresenter};

fn new_session() -> (Arc<PlaybackSession>, Arc<RecordingPresenter>, Arc<DictionaryRegistry>) {
    let registry = Arc::new(DictionaryRegistry::with_builtin_languages());
    let presenter = Arc::new(RecordingPresenter::default());
    let session = Arc::new(PlaybackSession::new(Arc::clone(&registry), presenter.clone()));
    (session, presenter, registry)
}

/// Test the worked example: publish on change, nothing before the first cue
#[tokio::test]
async fn test_on_position_withSampleVtt_shouldPublishChanges() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();

    assert!(!session.on_position(0));
    assert!(session.on_position(2000));
    assert!(session.on_position(4000));
    assert!(!session.on_position(4500));

    assert_eq!(
        presenter.texts(),
        vec![Some("Hello world".to_string()), Some("Second line".to_string())]
    );
    assert_eq!(session.current_cue().map(|c| c.text), Some("Second line".to_string()));
}

/// Test that every cue is published once during continuous playback
#[tokio::test]
async fn test_on_position_withContinuousPlayback_shouldPublishEachCueOnce() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_SRT.to_string(), "en").await.unwrap();

    for position in (0..20_000).step_by(100) {
        session.on_position(position);
    }

    let updates = presenter.updates();
    assert_eq!(updates.len(), 3);
    let indices: Vec<Option<usize>> = updates.iter().map(|u| u.index).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(updates[0].words.len(), 5);
}

/// Test that seeking before the first cue publishes an empty update
#[tokio::test]
async fn test_on_position_withSeekBeforeFirstCue_shouldPublishNoCue() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();

    session.on_position(4000);
    session.on_position(500);
    session.on_position(1200);

    let updates = presenter.updates();
    assert_eq!(updates.len(), 3);
    assert!(updates[1].cue.is_none());
    assert!(updates[1].words.is_empty());
    assert_eq!(updates[2].cue.as_ref().map(|c| c.start_time_ms), Some(1000));
    assert_eq!(session.state(), SessionState::Ready);
}

/// Test that payloads without time codes never publish
#[tokio::test]
async fn test_load_withPlainText_shouldBeReadyWithoutCues() {
    let (session, presenter, _) = new_session();

    let report = session.load("no timing here".to_string(), "en").await.unwrap();

    assert_eq!(report.cue_count, 0);
    assert!(!report.is_synchronized());
    assert_eq!(session.state(), SessionState::Ready);
    assert!(!session.on_position(1000));
    assert!(presenter.updates().is_empty());
}

/// Test load failure on an unknown language
#[tokio::test]
async fn test_load_withUnknownLanguage_shouldFailAndNotify() {
    let (session, presenter, _) = new_session();

    let result = session.load(common::SAMPLE_VTT.to_string(), "ko").await;

    assert!(matches!(result, Err(SessionError::Configuration(_))));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(presenter.failures().len(), 1);

    let again = session.load(common::SAMPLE_VTT.to_string(), "en").await;
    assert!(matches!(again, Err(SessionError::InvalidTransition { .. })));
}

/// Test the reset cycle between songs
#[tokio::test]
async fn test_reset_shouldAllowLoadingAnotherSong() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();
    session.on_position(2000);

    assert!(matches!(
        session.load(common::SAMPLE_SRT.to_string(), "en").await,
        Err(SessionError::InvalidTransition { .. })
    ));

    session.reset().unwrap();
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(session.current_cue().is_none());
    assert!(session.timeline().is_none());

    session.load(common::SAMPLE_SRT.to_string(), "en").await.unwrap();
    session.on_position(2000);

    assert_eq!(
        presenter.texts().last().cloned().flatten(),
        Some("This is a test lyric.".to_string())
    );
}

/// Test that the romanization preference applies to later cues
#[tokio::test]
async fn test_set_filter_romanizations_shouldApplyToNextCue() {
    let (session, presenter, registry) = new_session();
    registry
        .register_dictionary("ja", "kanji", common::SAMPLE_JA_DICTIONARY)
        .unwrap();
    let payload = "[00:01.00]夢 yume\n[00:02.00]夢 yume\n";
    session.load(payload.to_string(), "ja").await.unwrap();

    session.on_position(1000);
    session.set_filter_romanizations(false);
    session.on_position(2000);

    let updates = presenter.updates();
    assert_eq!(updates[0].words.len(), 1);
    assert_eq!(updates[1].words.len(), 2);
}

/// Test that a dictionary registered mid-session is used for the next cue
#[tokio::test]
async fn test_register_dictionary_duringPlayback_shouldAffectNextCue() {
    let (session, presenter, registry) = new_session();
    session.load(common::SAMPLE_LRC.to_string(), "ja").await.unwrap();

    session.on_position(1000);
    registry
        .register_dictionary("ja", "kanji", common::SAMPLE_JA_DICTIONARY)
        .unwrap();
    session.on_position(4500);

    let updates = presenter.updates();
    assert!(updates[0].words.iter().all(|w| !w.representable));
    let parents: Vec<&str> = updates[1].words.iter().map(|w| w.parent.as_str()).collect();
    assert_eq!(parents, vec!["夢", "を", "見る"]);
}

/// Presenter that reads the song back from the session it is attached to
#[derive(Default)]
struct InspectingPresenter {
    session: Mutex<Weak<PlaybackSession>>,
    seen: Mutex<Vec<(String, usize)>>,
}

impl CuePresenter for InspectingPresenter {
    fn on_cue_changed(&self, _update: &CueUpdate) {
        let Some(session) = self.session.lock().upgrade() else {
            return;
        };
        let language = session.language().map(|l| l.tag().to_string()).unwrap_or_default();
        let cues = session.timeline().map_or(0, |t| t.len());
        self.seen.lock().push((language, cues));
    }
}

/// Test that presenter callbacks can read the language and timeline
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_on_position_withPresenterReadingSong_shouldNotBlock() {
    let registry = Arc::new(DictionaryRegistry::with_builtin_languages());
    let presenter = Arc::new(InspectingPresenter::default());
    let session = Arc::new(PlaybackSession::new(registry, presenter.clone()));
    *presenter.session.lock() = Arc::downgrade(&session);
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();

    let ticking = Arc::clone(&session);
    let published = tokio::time::timeout(
        Duration::from_secs(5),
        tokio::task::spawn_blocking(move || ticking.on_position(1500)),
    )
    .await
    .expect("tick finished in time")
    .unwrap();

    assert!(published);
    assert_eq!(presenter.seen.lock().clone(), vec![("en".to_string(), 2)]);
}

/// Test that a load racing with a reset keeps its freshly loaded song
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_racingLoad_shouldKeepLoadedSong() {
    for _ in 0..50 {
        let (session, _, _) = new_session();
        session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();

        let resetting = Arc::clone(&session);
        let resetter = std::thread::spawn(move || resetting.reset());

        loop {
            match session.load(common::SAMPLE_SRT.to_string(), "en").await {
                Ok(_) => break,
                Err(SessionError::InvalidTransition { .. }) => tokio::task::yield_now().await,
                Err(e) => panic!("unexpected load error: {}", e),
            }
        }
        resetter.join().unwrap().unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.timeline().map(|t| t.len()), Some(3));
        assert!(session.on_position(2000));
    }
}

/// Test disposal
#[tokio::test]
async fn test_dispose_shouldIgnoreLaterTicks() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();
    session.on_position(2000);

    session.dispose();
    session.dispose();

    assert_eq!(session.state(), SessionState::Disposed);
    assert!(!session.on_position(4000));
    assert_eq!(presenter.updates().len(), 1);
    assert!(session.current_cue().is_none());
    assert!(matches!(
        session.load(common::SAMPLE_VTT.to_string(), "en").await,
        Err(SessionError::Disposed)
    ));
}

/// Test the channel-driven position feed
#[tokio::test]
async fn test_spawn_position_feed_shouldDriveSession() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();

    let (sender, receiver) = mpsc::channel(16);
    let feed = spawn_position_feed(Arc::clone(&session), receiver);

    for position in [0, 1000, 1500, 3600, 4000] {
        sender.send(position).await.unwrap();
    }
    drop(sender);

    assert_eq!(feed.await.unwrap(), 2);
    assert_eq!(presenter.updates().len(), 2);
}

/// Test that the position feed stops once the session is disposed
#[tokio::test]
async fn test_spawn_position_feed_afterDispose_shouldStop() {
    let (session, presenter, _) = new_session();
    session.load(common::SAMPLE_VTT.to_string(), "en").await.unwrap();
    session.dispose();

    let (sender, receiver) = mpsc::channel(4);
    let feed = spawn_position_feed(Arc::clone(&session), receiver);
    sender.send(2000).await.unwrap();

    assert_eq!(feed.await.unwrap(), 0);
    assert!(presenter.updates().is_empty());
}

struct StaticLyrics(Option<&'static str>);

#[async_trait]
impl LyricsSource for StaticLyrics {
    async fn fetch_lyrics(&self, song_id: &str, _language_tag: &str) -> Result<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no lyrics for {}", song_id))
    }
}

struct StaticDictionaries;

#[async_trait]
impl DictionarySource for StaticDictionaries {
    async fn fetch_dictionary(&self, _language_tag: &str, dictionary_name: &str) -> Result<String> {
        match dictionary_name {
            "kanji" => Ok(common::SAMPLE_JA_DICTIONARY.to_string()),
            other => Err(anyhow!("dictionary {} not found", other)),
        }
    }
}

/// Test the fetch-then-load flow
#[tokio::test]
async fn test_session_loader_shouldLoadLyricsAndDictionaries() {
    let (session, presenter, registry) = new_session();
    let loader = SessionLoader::new(Arc::new(StaticLyrics(Some(common::SAMPLE_LRC))), Arc::new(StaticDictionaries))
        .with_dictionaries(["kanji", "missing"]);

    let report = loader.load(&session, "song-1", "jpn").await.unwrap();

    assert_eq!(report.session.cue_count, 3);
    assert_eq!(report.session.language, "ja");
    assert_eq!(report.dictionaries.len(), 1);
    assert_eq!(report.failed_dictionaries, vec!["missing".to_string()]);
    assert!(registry.lookup("ja", "夢").unwrap().is_some());

    session.on_position(1000);
    assert_eq!(presenter.updates()[0].words.len(), 3);
}

/// Test that a lyrics fetch failure fails the session
#[tokio::test]
async fn test_session_loader_withoutLyrics_shouldFailSession() {
    let (session, presenter, _) = new_session();
    let loader = SessionLoader::new(Arc::new(StaticLyrics(None)), Arc::new(StaticDictionaries));

    let result = loader.load(&session, "song-2", "ja").await;

    assert!(matches!(result, Err(SessionError::Fetch(_))));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(presenter.failures().len(), 1);
}
