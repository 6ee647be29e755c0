//! The hunter policy and its bridge to the training engine.
//!
//! - [`hunter`] - The parameter table and the [`HunterPilot`](hunter::HunterPilot) that flies a
//!   ship from a [`ParameterVector`](skirmish_training::params::ParameterVector)
//! - [`runner`] - [`ArenaEpisodeRunner`](runner::ArenaEpisodeRunner), which plays one arena
//!   episode per call and reports the hunter's outcome
//!
//! Parameters are injected into the pilot directly; nothing is read from disk while an
//! episode is running.

pub mod hunter;
pub mod runner;
