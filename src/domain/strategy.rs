//! Strategy modes: signal overlays applied before return computation.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::Rng;

use super::error::NewsalphaError;
use super::event::Signal;
use super::returns::AlignedEvent;

/// Closed set of supported strategy modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Pass the model-derived signal through unchanged.
    Default,
    /// Force every signal to long.
    AllLong,
    /// Force every signal to short.
    AllShort,
    /// Draw a fresh uniform signal per event from a caller-seeded generator.
    Random,
    /// Keep model signals but drop short-signed events.
    GptLong,
    /// Keep model signals but drop long-signed events.
    GptShort,
}

impl StrategyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyMode::Default => "default",
            StrategyMode::AllLong => "all_long",
            StrategyMode::AllShort => "all_short",
            StrategyMode::Random => "random",
            StrategyMode::GptLong => "gpt_long",
            StrategyMode::GptShort => "gpt_short",
        }
    }

    /// Signal-driven modes are scored as a self-financing long/short book;
    /// the naive baselines are a single directional leg.
    pub fn is_self_financing(self) -> bool {
        !matches!(self, StrategyMode::AllLong | StrategyMode::AllShort)
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyMode {
    type Err = NewsalphaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(StrategyMode::Default),
            "all_long" => Ok(StrategyMode::AllLong),
            "all_short" => Ok(StrategyMode::AllShort),
            "random" => Ok(StrategyMode::Random),
            "gpt_long" => Ok(StrategyMode::GptLong),
            "gpt_short" => Ok(StrategyMode::GptShort),
            other => Err(NewsalphaError::UnknownStrategyMode(other.to_string())),
        }
    }
}

/// Uniform draw over {short, long, neutral}.
pub fn random_signal(rng: &mut StdRng) -> Signal {
    match rng.gen_range(0..3) {
        0 => Signal::Short,
        1 => Signal::Long,
        _ => Signal::Neutral,
    }
}

/// Apply a mode to the aligned event set. Forcing modes rewrite signals,
/// filtering modes drop opposite-signed events, `Random` consumes one draw
/// per event from `rng`.
pub fn apply_mode(
    mode: StrategyMode,
    aligned: &[AlignedEvent],
    rng: &mut StdRng,
) -> Vec<AlignedEvent> {
    match mode {
        StrategyMode::Default => aligned.to_vec(),
        StrategyMode::AllLong => force_signal(aligned, Signal::Long),
        StrategyMode::AllShort => force_signal(aligned, Signal::Short),
        StrategyMode::Random => aligned
            .iter()
            .cloned()
            .map(|mut a| {
                a.event.signal = random_signal(rng);
                a
            })
            .collect(),
        StrategyMode::GptLong => aligned
            .iter()
            .filter(|a| a.event.signal != Signal::Short)
            .cloned()
            .collect(),
        StrategyMode::GptShort => aligned
            .iter()
            .filter(|a| a.event.signal != Signal::Long)
            .cloned()
            .collect(),
    }
}

fn force_signal(aligned: &[AlignedEvent], signal: Signal) -> Vec<AlignedEvent> {
    aligned
        .iter()
        .cloned()
        .map(|mut a| {
            a.event.signal = signal;
            a
        })
        .collect()
}
