//! Text front-end collaborators for the `brickbox` binary

use std::io::{self, Write};

use brickbox_core::{Audio, Display, Frame, ModulesSnapshot, Sound};

/// Prints each frame whose text differs from the previous one.
pub struct TextDisplay<W: Write> {
    out: W,
    last: Option<Vec<String>>,
}

impl TextDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, lines: &[String]) -> io::Result<()> {
        writeln!(self.out, "+------------------------------+")?;
        for line in lines {
            writeln!(self.out, "| {line:^28} |")?;
        }
        writeln!(self.out, "+------------------------------+")?;
        self.out.flush()
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn bind_controls(&mut self, game_id: &str) {
        tracing::debug!("Controls bound to '{game_id}'");
        // Force a redraw for the new controller
        self.last = None;
    }

    fn update_debugger_game_modules(&mut self, modules: &ModulesSnapshot) {
        tracing::debug!(
            game = %modules.game_id,
            state = %modules.state,
            subscriptions = modules.subscriptions,
            volume = modules.volume,
            session = modules.session_enabled,
            "Game modules published"
        );
    }

    fn present(&mut self, frame: &Frame) {
        let lines: Vec<String> = frame.texts().into_iter().map(str::to_string).collect();
        if self.last.as_ref() == Some(&lines) {
            return;
        }
        if let Err(e) = self.write_frame(&lines) {
            tracing::warn!("Failed to draw frame: {e}");
        }
        self.last = Some(lines);
    }
}

/// Logs sound cues instead of playing them.
pub struct LogAudio;

impl Audio for LogAudio {
    fn play(&mut self, sound: Sound, volume: f32) {
        tracing::info!("Sound cue {} (volume {:.2})", sound.as_str(), volume);
    }
}
