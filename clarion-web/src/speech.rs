use clarion_core::SpeechSynthesisCapability;
use web_sys::{SpeechSynthesis, SpeechSynthesisUtterance};

/// `window.speechSynthesis`, detected once.
#[derive(Debug, Clone, Default)]
pub struct BrowserSpeech {
    synth: Option<SpeechSynthesis>,
}

impl BrowserSpeech {
    #[must_use]
    pub fn detect() -> Self {
        let synth = crate::dom::window().and_then(|win| win.speech_synthesis().ok());
        if synth.is_none() {
            log::info!("speech synthesis unavailable");
        }
        Self { synth }
    }
}

impl SpeechSynthesisCapability for BrowserSpeech {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn speak(&self, text: &str) {
        let Some(synth) = &self.synth else {
            return;
        };
        match SpeechSynthesisUtterance::new_with_text(text) {
            Ok(utterance) => synth.speak(&utterance),
            Err(err) => log::warn!("utterance rejected: {}", crate::dom::js_error_message(&err)),
        }
    }

    fn cancel(&self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
