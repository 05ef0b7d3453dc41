use log::{debug, info};
use std::time::Instant;

use crate::display;
use crate::race::{OverReason, Race, RaceError, RaceEvent};
use crate::summary::RaceSummary;
use crate::view::RaceView;

/// Wires player input and the race timer to a race and keeps the view in sync.
#[derive(Debug)]
pub struct RaceController<V: RaceView> {
    race: Option<Race>,
    view: V,
}

impl<V: RaceView> RaceController<V> {
    pub fn new(view: V) -> Self {
        Self { race: None, view }
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn race_mut(&mut self) -> Result<&mut Race, RaceError> {
        self.race.as_mut().ok_or(RaceError::NoRace)
    }

    /// Installs a new race and shows its whole text.
    pub fn setup_race(&mut self, race: Race) {
        debug!("setting up race: {:?}", race.text());
        self.view.display(&display::segments(&race));
        self.view.clear_input();
        self.view.set_input_enabled(false);
        self.view.set_game_over(false);
        self.race = Some(race);
    }

    pub fn start_game(&mut self) -> Result<(), RaceError> {
        let event = self.race_mut()?.start()?;
        self.dispatch(Some(event));
        Ok(())
    }

    pub fn handle_game_start(&mut self) {
        self.view.set_game_over(false);
        self.view.set_input_enabled(true);
    }

    pub fn handle_game_over(&mut self, reason: OverReason) {
        info!("game over: {reason}");
        self.view.set_input_enabled(false);
        self.view.set_game_over(true);
    }

    fn dispatch(&mut self, event: Option<RaceEvent>) {
        match event {
            Some(RaceEvent::Started) => self.handle_game_start(),
            Some(RaceEvent::Over(reason)) => self.handle_game_over(reason),
            None => {}
        }
    }

    /// Feeds the player's current input to the race. Input is ignored unless the race is running.
    pub fn handle_typed_chars(&mut self, text: &str) -> Result<(), RaceError> {
        let Some(race) = self.race.as_mut().filter(|r| r.is_running()) else {
            return Ok(());
        };

        race.set_typing_text(text);
        let (matched, event) = race.match_word()?;
        let segments = display::segments(race);

        if matched {
            self.view.clear_input();
        }
        self.view.display(&segments);
        self.dispatch(event);

        Ok(())
    }

    /// Timer callback: checks the race time at `now` against the limit.
    pub fn handle_tick(&mut self, now: Instant) -> Result<(), RaceError> {
        let Some(race) = self.race.as_mut().filter(|r| r.is_running()) else {
            return Ok(());
        };
        let Some(clock) = race.clock().copied() else {
            return Ok(());
        };

        let elapsed = clock.elapsed_at(now).as_secs_f64();
        if elapsed <= 0.0 {
            return Ok(());
        }

        let event = race.set_time(elapsed)?;
        self.dispatch(event);
        Ok(())
    }

    /// When the running race runs out of time.
    pub fn deadline(&self) -> Option<Instant> {
        self.race
            .as_ref()
            .filter(|r| r.is_running())
            .and_then(Race::clock)
            .map(|c| c.deadline())
    }

    pub fn summary(&self) -> Option<RaceSummary> {
        self.race.as_ref().map(RaceSummary::from_race)
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        let race = self.race.as_ref()?;
        let clock = race.clock()?;
        let remaining = if race.is_over() {
            clock.limit().saturating_sub(race.elapsed()?)
        } else {
            clock.remaining()
        };
        Some(remaining.as_secs_f64())
    }
}
