#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that reverts temporary stat modifiers once their lifetime elapses.
//!
//! The stat table never expires modifiers on its own; this system is the
//! duration policy layered on top of it.

use std::time::Duration;

use arena_core::{Command, Event, ModifierId};

const DEFAULT_LIFETIME: Duration = Duration::from_secs(5);

/// Configuration parameters required to construct the expiry system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    lifetime: Duration,
}

impl Config {
    /// Creates a configuration granting every temporary modifier `lifetime`.
    #[must_use]
    pub const fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    /// Lifetime granted to each temporary modifier.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

#[derive(Clone, Copy, Debug)]
struct Countdown {
    modifier: ModifierId,
    remaining: Duration,
}

/// Tracks temporary modifiers and emits `Command::RevertModifier` on expiry.
#[derive(Debug, Default)]
pub struct ModifierExpiry {
    lifetime: Duration,
    countdowns: Vec<Countdown>,
}

impl ModifierExpiry {
    /// Creates an expiry system with no tracked modifiers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            lifetime: config.lifetime(),
            countdowns: Vec::new(),
        }
    }

    /// Number of modifiers still counting down.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.countdowns.len()
    }

    /// Consumes events in order and emits reverts for expired modifiers.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::StatModified {
                    modifier: Some(modifier),
                    ..
                } => self.countdowns.push(Countdown {
                    modifier: *modifier,
                    remaining: self.lifetime,
                }),
                Event::ModifierReverted { modifier, .. } => self
                    .countdowns
                    .retain(|countdown| countdown.modifier != *modifier),
                Event::TimeAdvanced { dt } => {
                    for countdown in &mut self.countdowns {
                        countdown.remaining = countdown.remaining.saturating_sub(*dt);
                    }
                }
                _ => {}
            }
        }

        self.countdowns.retain(|countdown| {
            if countdown.remaining.is_zero() {
                out.push(Command::RevertModifier {
                    modifier: countdown.modifier,
                });
                false
            } else {
                true
            }
        });
    }
}
