//! Scripted synthesizer for exercising tier logic without the network

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use polyvox_core::CancellationToken;

use crate::{
    error::{Result, TtsError},
    provider::{SpeechSynthesizer, SynthesisCall, SynthesisInput},
};

type Respond = Box<dyn Fn(&SynthesisCall<'_>, usize) -> Result<Vec<u8>> + Send + Sync>;
type RespondLong = Box<dyn Fn() -> Result<Vec<u8>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub text: String,
    pub voice: String,
    pub markup: bool,
}

pub struct FakeSynthesizer {
    respond: Respond,
    respond_long: RespondLong,
    calls: Mutex<Vec<RecordedCall>>,
    long_calls: AtomicUsize,
}

impl FakeSynthesizer {
    /// `respond` receives each call and its zero-based position
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&SynthesisCall<'_>, usize) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            respond_long: Box::new(|| Err(TtsError::ConfigMissing("no project".into()))),
            calls: Mutex::new(Vec::new()),
            long_calls: AtomicUsize::new(0),
        }
    }

    /// Every call succeeds with a one-sample WAV holding the call position
    pub fn wav_per_call() -> Self {
        Self::new(|_, n| Ok(crate::audio::tests::wav_bytes(&[i16::try_from(n).unwrap()])))
    }

    pub fn with_long<F>(mut self, respond: F) -> Self
    where
        F: Fn() -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.respond_long = Box::new(respond);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn long_calls(&self) -> usize {
        self.long_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, call: &SynthesisCall<'_>) -> Result<Vec<u8>> {
        let position = {
            let mut calls = self.calls.lock().unwrap();
            let (text, markup) = match call.input {
                SynthesisInput::Text(text) => (text, false),
                SynthesisInput::Markup(ssml) => (ssml, true),
            };
            calls.push(RecordedCall {
                text: text.to_string(),
                voice: call.voice_name.to_string(),
                markup,
            });
            calls.len() - 1
        };

        (self.respond)(call, position)
    }

    async fn synthesize_long(&self, _call: &SynthesisCall<'_>, cancel: &CancellationToken) -> Result<Vec<u8>> {
        self.long_calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }
        (self.respond_long)()
    }
}
