use crate::shared::settings::DebounceConfig;

/// Debounces the landmark-presence flag across frames.
///
/// The reported state only flips after the raw signal has disagreed with
/// it for `on_frames` (absent → present) or `off_frames` (present → absent)
/// consecutive frames. With both thresholds at 1 it is a passthrough.
#[derive(Debug)]
pub struct PresenceDebouncer {
    config: DebounceConfig,
    state: bool,
    streak: u32,
}

impl PresenceDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            state: false,
            streak: 0,
        }
    }

    pub fn update(&mut self, raw: bool) -> bool {
        if raw == self.state {
            self.streak = 0;
            return self.state;
        }

        self.streak += 1;
        let needed = if raw {
            self.config.on_frames
        } else {
            self.config.off_frames
        };
        if self.streak >= needed {
            self.state = raw;
            self.streak = 0;
        }
        self.state
    }

    pub fn is_present(&self) -> bool {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = false;
        self.streak = 0;
    }
}
