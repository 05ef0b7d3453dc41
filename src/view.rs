use crate::display::Segment;

/// What the controller needs from whatever shows the race to the player.
pub trait RaceView {
    fn display(&mut self, segments: &[Segment]);
    fn clear_input(&mut self);
    fn set_input_enabled(&mut self, enabled: bool);
    fn set_game_over(&mut self, over: bool);
}

/// The text area the player types into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypingInput {
    chars: String,
    enabled: bool,
}

impl TypingInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.chars
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Appends a char, returning false when the input is disabled.
    pub fn push(&mut self, c: char) -> bool {
        if !self.enabled {
            return false;
        }
        self.chars.push(c);
        true
    }

    pub fn pop(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.chars.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }
}

/// Keeps everything the controller shows, for the terminal UI to draw from.
#[derive(Clone, Debug, Default)]
pub struct TypingView {
    pub segments: Vec<Segment>,
    pub input: TypingInput,
    pub game_over: bool,
}

impl TypingView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RaceView for TypingView {
    fn display(&mut self, segments: &[Segment]) {
        self.segments = segments.to_vec();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled {
            self.input.enable();
        } else {
            self.input.disable();
        }
    }

    fn set_game_over(&mut self, over: bool) {
        self.game_over = over;
    }
}
