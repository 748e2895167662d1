//! Sound cues
//!
//! Controllers queue cues on their [`SoundModule`]; the launcher flushes the
//! queue into an [`Audio`] backend once per frame. Decoding and mixing are
//! the backend's business.

/// Built-in sound cues shared by every game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    StartTheme,
    Action1,
    Action2,
    Explosion,
    GameOver,
}

impl Sound {
    pub const ALL: [Sound; 5] = [
        Sound::StartTheme,
        Sound::Action1,
        Sound::Action2,
        Sound::Explosion,
        Sound::GameOver,
    ];

    /// Sound for a guest `play_sound(id)` call.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sound::StartTheme => "start-theme",
            Sound::Action1 => "action-1",
            Sound::Action2 => "action-2",
            Sound::Explosion => "explosion",
            Sound::GameOver => "game-over",
        }
    }
}

/// Audio backend trait
pub trait Audio {
    /// Play a cue at the given volume (0.0-1.0)
    fn play(&mut self, sound: Sound, volume: f32);
}

/// No-op audio backend
pub struct NullAudio;

impl Audio for NullAudio {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
}

/// Per-controller queue of pending cues plus volume settings.
#[derive(Debug, Clone)]
pub struct SoundModule {
    queued: Vec<Sound>,
    volume: f32,
    muted: bool,
}

impl Default for SoundModule {
    fn default() -> Self {
        Self {
            queued: Vec::new(),
            volume: 0.8,
            muted: false,
        }
    }
}

impl SoundModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cue. Cues are dropped while muted.
    pub fn play(&mut self, sound: Sound) {
        if !self.muted {
            self.queued.push(sound);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.queued.clear();
        }
    }

    /// Cues queued since the last flush.
    pub fn pending(&self) -> &[Sound] {
        &self.queued
    }

    /// Discard queued cues without playing them.
    pub fn clear(&mut self) {
        self.queued.clear();
    }

    /// Play and drain every queued cue.
    pub fn flush(&mut self, audio: &mut dyn Audio) {
        for sound in self.queued.drain(..) {
            audio.play(sound, self.volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<(Sound, f32)>);

    impl Audio for Recorder {
        fn play(&mut self, sound: Sound, volume: f32) {
            self.0.push((sound, volume));
        }
    }

    #[test]
    fn test_flush_plays_in_order_and_drains() {
        let mut sound = SoundModule::new();
        sound.set_volume(0.5);
        sound.play(Sound::StartTheme);
        sound.play(Sound::Action1);

        let mut audio = Recorder(Vec::new());
        sound.flush(&mut audio);
        assert_eq!(
            audio.0,
            vec![(Sound::StartTheme, 0.5), (Sound::Action1, 0.5)]
        );
        assert!(sound.pending().is_empty());
    }

    #[test]
    fn test_muted_drops_cues() {
        let mut sound = SoundModule::new();
        sound.play(Sound::Action1);
        sound.set_muted(true);
        assert!(sound.pending().is_empty());
        sound.play(Sound::Action2);
        assert!(sound.pending().is_empty());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut sound = SoundModule::new();
        sound.set_volume(3.0);
        assert!((sound.volume() - 1.0).abs() < f32::EPSILON);
        sound.set_volume(-1.0);
        assert!(sound.volume().abs() < f32::EPSILON);
    }

    #[test]
    fn test_sound_ids() {
        assert_eq!(Sound::from_id(0), Some(Sound::StartTheme));
        assert_eq!(Sound::from_id(4), Some(Sound::GameOver));
        assert_eq!(Sound::from_id(5), None);
    }
}
