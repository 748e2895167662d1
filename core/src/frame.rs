//! Frame output
//!
//! A frame is an ordered list of draw commands in normalized display
//! coordinates (0.0-1.0 on both axes). How it is rasterized is up to the
//! [`Display`](crate::display::Display) implementation.

/// Text size classes of the host display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontSize {
    ExtraSmall,
    Small,
    #[default]
    Medium,
    Large,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A single draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: FontSize,
        align: FontAlign,
        /// Blinking text (title-screen prompts)
        pulsing: bool,
    },
}

/// Draw commands for one rendered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Draw a line of text.
    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: FontSize, align: FontAlign) {
        self.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            size,
            align,
            pulsing: false,
        });
    }

    /// Draw a line of blinking text.
    pub fn pulsing_text(&mut self, text: impl Into<String>, x: f32, y: f32, size: FontSize) {
        self.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            size,
            align: FontAlign::Center,
            pulsing: true,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text content of the frame, top to bottom.
    pub fn texts(&self) -> Vec<&str> {
        let mut texts: Vec<(f32, &str)> = self
            .commands
            .iter()
            .map(|cmd| match cmd {
                DrawCommand::Text { text, y, .. } => (*y, text.as_str()),
            })
            .collect();
        texts.sort_by(|a, b| a.0.total_cmp(&b.0));
        texts.into_iter().map(|(_, text)| text).collect()
    }

    /// Whether any text command contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }
}
