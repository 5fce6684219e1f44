/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::sync::Arc;

use lyrilex::app_config::{Config, DictionaryConfig};
use lyrilex::errors::{AppError, ConfigurationError};
use lyrilex::app_controller::{describe_word, Controller, PlaybackOptions, SimulatedTransport};
use lyrilex::session::{AudioTransport, PlayerControls, PlayerStatus};

use crate::common::{self, RecordingPresenter};

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().language, "ja");
    assert_eq!(controller.registry().languages(), vec!["en", "ja", "pt"]);
    Ok(())
}

/// Test that an invalid configuration is rejected
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.language = "zzzz".to_string();
    assert!(Controller::with_config(config).is_err());
}

fn config_with_dictionaries(dir: &std::path::Path) -> Result<Config> {
    let ja_path = common::create_test_file(dir, "kanji.json", common::SAMPLE_JA_DICTIONARY)?;
    let en_path = common::create_test_file(dir, "basic.tsv", common::SAMPLE_EN_DICTIONARY)?;

    let mut config = Config::default();
    config.dictionaries = vec![
        DictionaryConfig {
            language: "ja".to_string(),
            name: "kanji".to_string(),
            path: ja_path,
        },
        DictionaryConfig {
            language: "en".to_string(),
            name: "basic".to_string(),
            path: en_path,
        },
        DictionaryConfig {
            language: "en".to_string(),
            name: "absent".to_string(),
            path: dir.join("absent.tsv"),
        },
    ];
    Ok(config)
}

/// Test loading configured dictionary files
#[test]
fn test_load_dictionaries_shouldRegisterReadableFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(config_with_dictionaries(temp_dir.path())?)?;

    // Unreadable files are skipped, not fatal
    let reports = tokio_test::block_on(async { controller.load_dictionaries().await })?;

    assert_eq!(reports.len(), 2);
    let words = controller.tokenize_line("run running", Some("en"))?;
    assert!(words.iter().all(|w| w.parent == "run" && w.representable));
    Ok(())
}

/// Test tokenizing with the configured language
#[tokio::test]
async fn test_tokenize_line_withConfiguredLanguage_shouldUseDictionaries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(config_with_dictionaries(temp_dir.path())?)?;
    controller.load_dictionaries().await?;

    let words = controller.tokenize_line("夢を見た", None)?;

    let described: Vec<String> = words.iter().map(describe_word).collect();
    assert_eq!(described, vec!["夢 [noun] *", "を [particle]", "見た -> 見る [verb] (present) *"]);
    Ok(())
}

/// Test inspecting a lyric file
#[test]
fn test_inspect_shouldParseFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "song.srt", common::SAMPLE_SRT)?;
    let controller = Controller::new_for_test()?;

    let parsed = controller.inspect(&path)?;
    assert_eq!(parsed.timeline.len(), 3);

    let missing = controller.inspect(&temp_dir.path().join("missing.srt"));
    assert!(matches!(missing, Err(AppError::File(_))));
    Ok(())
}

/// Test that an unregistered language surfaces as a configuration error
#[test]
fn test_tokenize_line_withUnknownLanguage_shouldReturnConfigurationError() -> Result<()> {
    let controller = Controller::new_for_test()?;

    let result = controller.tokenize_line("안녕", Some("ko"));

    assert!(matches!(
        result,
        Err(AppError::Configuration(ConfigurationError::UnknownLanguage(_)))
    ));
    Ok(())
}

/// Test a full simulated playback
#[tokio::test]
async fn test_run_playback_shouldPublishEveryCue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "song.vtt", common::SAMPLE_VTT)?;
    let controller = Controller::new_for_test()?;
    let presenter = Arc::new(RecordingPresenter::default());

    let options = PlaybackOptions {
        language: Some("en".to_string()),
        ..Default::default()
    };
    let summary = controller.run_playback(path, options, presenter.clone()).await?;

    assert_eq!(summary.cue_count, 2);
    assert_eq!(summary.published, 2);
    assert_eq!(summary.duration_ms, 10_000);
    assert_eq!(
        presenter.texts(),
        vec![Some("Hello world".to_string()), Some("Second line".to_string())]
    );
    Ok(())
}

/// Test playback starting after the first cue
#[tokio::test]
async fn test_run_playback_withStartPosition_shouldSkipEarlierCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "song.srt", common::SAMPLE_SRT)?;
    let controller = Controller::new_for_test()?;
    let presenter = Arc::new(RecordingPresenter::default());

    let options = PlaybackOptions {
        language: Some("en".to_string()),
        start_ms: 6000,
        ..Default::default()
    };
    let summary = controller.run_playback(path, options, presenter.clone()).await?;

    assert_eq!(summary.published, 2);
    assert_eq!(presenter.updates()[0].index, Some(1));
    Ok(())
}

/// Test playback of a file that does not exist
#[tokio::test]
async fn test_run_playback_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;
    let presenter = Arc::new(RecordingPresenter::default());

    let result = controller
        .run_playback(temp_dir.path().join("nothing.vtt"), PlaybackOptions::default(), presenter)
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Test the player controls over the simulated transport
#[test]
fn test_player_controls_withSimulatedTransport_shouldClamp() {
    let controls = PlayerControls::new(SimulatedTransport::new(20_000), 5000);

    assert_eq!(controls.status(), PlayerStatus::Paused);
    assert_eq!(controls.toggle_play(), PlayerStatus::Playing);

    controls.transport().advance(3000);
    assert_eq!(controls.transport().position_ms(), 3000);
    assert_eq!(controls.skip_backward(), 0);
    assert_eq!(controls.seek_to(19_000), 19_000);
    assert_eq!(controls.skip_forward(), 20_000);

    // reaching the end stops playback
    controls.transport().advance(1000);
    assert_eq!(controls.transport().position_ms(), 20_000);
    assert_eq!(controls.status(), PlayerStatus::Paused);

    controls.seek_to(0);
    assert_eq!(controls.toggle_play(), PlayerStatus::Playing);
    assert_eq!(controls.toggle_play(), PlayerStatus::Paused);
    controls.transport().advance(1000);
    assert_eq!(controls.transport().position_ms(), 0);
}
