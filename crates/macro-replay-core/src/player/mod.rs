mod cancel;
mod options;
mod outcome;
#[allow(clippy::module_inception)]
mod player;

pub use {
    cancel::CancelFlag,
    options::{
        MAX_LOOP_DELAY_SECS, MAX_REPEAT, MAX_SPEED, MIN_REPEAT, MIN_SPEED, PlaybackMode,
        PlaybackOptions,
    },
    outcome::{PlaybackEnd, PlaybackOutcome},
    player::{DEFAULT_POLL_INTERVAL, Player, PlayerConfig},
};
