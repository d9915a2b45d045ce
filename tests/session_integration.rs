//! End-to-end monitoring session tests with mock collaborators.
//!
//! These drive the real capture loop, accumulator, scheduler and resolver;
//! only the OS-facing edges (audio device, speech classifier model, Whisper,
//! keystroke injection) are replaced by mocks.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use voicekey::audio::classifier::ThresholdClassifier;
use voicekey::audio::recorder::{FramePhase, MockAudioSource};
use voicekey::audio::wav::WavAudioSource;
use voicekey::clock::{Clock, MockClock};
use voicekey::command::{ActionId, CommandResolver, CommandTable};
use voicekey::error::Result;
use voicekey::inject::keystroke::RecordingExecutor;
use voicekey::monitor::{MonitorSession, SessionConfig};
use voicekey::stt::{MockTranscriber, Transcriber};

const LOUD: i16 = 10000;
const FRAME: usize = 320;

fn quiet_config() -> SessionConfig {
    SessionConfig {
        quiet: true,
        ..Default::default()
    }
}

/// One read per 20ms frame: `speech` loud reads followed by `silence` quiet
/// reads.
fn utterance(speech: u32, silence: u32) -> Vec<FramePhase> {
    vec![
        FramePhase {
            samples: vec![LOUD; FRAME],
            count: speech,
        },
        FramePhase {
            samples: vec![0i16; FRAME],
            count: silence,
        },
    ]
}

/// Transcriber that replays scripted responses, one per segment.
struct ScriptedTranscriber {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedTranscriber {
    fn new<const N: usize>(responses: [&str; N]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<String> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[test]
fn keyword_command_fires_end_to_end() {
    let executor = RecordingExecutor::new();
    let handle = MonitorSession::new(quiet_config())
        .start(
            Box::new(MockAudioSource::new().with_frame_sequence(utterance(6, 10))),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(MockTranscriber::new("mock").with_response("please send this")),
            CommandResolver::new(CommandTable::new([
                ("send", ActionId::Send),
                ("clear", ActionId::Clear),
            ])),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    let stats = handle.stats();
    handle.wait();

    assert_eq!(stats.dispatched(), 1);
    assert_eq!(stats.dropped(), 0);
    assert_eq!(executor.actions(), vec![ActionId::Send]);
}

#[test]
fn unmatched_text_falls_back_to_dictation() {
    let executor = RecordingExecutor::new();
    let handle = MonitorSession::new(quiet_config())
        .start(
            Box::new(MockAudioSource::new().with_frame_sequence(utterance(6, 10))),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(MockTranscriber::new("mock").with_response("hello there")),
            CommandResolver::new(CommandTable::empty()),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    handle.wait();

    assert_eq!(executor.actions(), vec![ActionId::Dictate]);
}

#[test]
fn slow_transcription_blocks_second_utterance() {
    // The first segment dispatches into a 3s transcription. The second
    // utterance completes while the dispatch is in flight, so it is never
    // emitted; its long silence eventually clears the (by then stale-looking)
    // lock and the stream ends.
    let executor = RecordingExecutor::new();
    let mut sequence = utterance(6, 6);
    sequence.extend(utterance(6, 16));

    let handle = MonitorSession::new(quiet_config())
        .start(
            Box::new(MockAudioSource::new().with_frame_sequence(sequence)),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(
                MockTranscriber::new("slow")
                    .with_response("send")
                    .with_delay(Duration::from_millis(3000)),
            ),
            CommandResolver::new(CommandTable::new([("send", ActionId::Send)])),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    let stats = handle.stats();
    handle.wait();

    assert_eq!(stats.dispatched(), 1, "second utterance must not dispatch");
    assert_eq!(executor.actions(), vec![ActionId::Send]);
}

#[test]
fn fallback_is_debounced_across_segments() {
    // Two fallback resolutions at the same (mock) instant: only the first
    // fires the dictation trigger.
    let clock = MockClock::new();
    let shared: Arc<dyn Clock> = Arc::new(clock);
    let executor = RecordingExecutor::new();
    let mut sequence = utterance(6, 10);
    sequence.extend(utterance(6, 16));

    let handle = MonitorSession::new(quiet_config())
        .with_clock(shared)
        .start(
            Box::new(MockAudioSource::new().with_frame_sequence(sequence)),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(MockTranscriber::new("mock").with_response("just dictation")),
            CommandResolver::new(CommandTable::empty()),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    let stats = handle.stats();
    handle.wait();

    assert_eq!(stats.dispatched(), 2);
    assert_eq!(
        executor.actions(),
        vec![ActionId::Dictate],
        "second fallback within the debounce window must be suppressed"
    );
}

#[test]
fn listening_toggles_gate_fallback_but_not_commands() {
    let executor = RecordingExecutor::new();
    let mut sequence = utterance(6, 10);
    sequence.extend(utterance(6, 10));
    sequence.extend(utterance(6, 10));
    sequence.extend(utterance(6, 16));

    let handle = MonitorSession::new(quiet_config())
        .start(
            Box::new(MockAudioSource::new().with_frame_sequence(sequence)),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(ScriptedTranscriber::new([
                "stop listening",
                "take a note of this",
                "start listening",
                "take another note",
            ])),
            CommandResolver::new(CommandTable::default_table()),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    let stats = handle.stats();
    handle.wait();

    assert_eq!(stats.dispatched(), 4);
    assert_eq!(
        executor.actions(),
        vec![
            ActionId::PauseListening,
            ActionId::ResumeListening,
            ActionId::Dictate
        ],
        "dictation while paused must be suppressed"
    );
}

#[test]
fn wav_file_drives_a_full_session() {
    // 300ms of loud samples then 500ms of silence, through the real framer
    // and accumulator.
    let mut wav = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    {
        let mut writer = hound::WavWriter::new(&mut wav, spec).unwrap();
        for _ in 0..4800 {
            writer.write_sample(LOUD).unwrap();
        }
        for _ in 0..8000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    let source = WavAudioSource::from_reader(Box::new(Cursor::new(wav.into_inner())))
        .expect("WAV parse failed");

    let executor = RecordingExecutor::new();
    let handle = MonitorSession::new(quiet_config())
        .start(
            Box::new(source),
            Box::new(ThresholdClassifier::new(500)),
            Arc::new(MockTranscriber::new("mock").with_response("scroll up")),
            CommandResolver::new(CommandTable::default_table()),
            Box::new(executor.clone()),
        )
        .expect("session start failed");

    let stats = handle.stats();
    handle.wait();

    assert_eq!(stats.dispatched(), 1);
    assert_eq!(executor.actions(), vec![ActionId::ScrollUp]);
}
