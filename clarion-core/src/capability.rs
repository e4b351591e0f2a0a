//! Optional host capabilities, resolved once at construction.

/// Speech synthesis as exposed by the browser. Hosts without it use [`NoSpeech`].
pub trait SpeechSynthesisCapability {
    fn is_available(&self) -> bool;
    fn speak(&self, text: &str);
    fn cancel(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechSynthesisCapability for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) {}

    fn cancel(&self) {}
}
