use crate::sound::SoundKind;

/// messages from the gui thread to the audio playback thread
#[derive(Debug, Clone, Copy)]
pub enum Message {
    Play {
        kind: SoundKind,
        /// 0 to 100
        volume: u8,
        duration_seconds: u32,
    },
    /// stop whatever is playing, if anything
    Stop,
}
