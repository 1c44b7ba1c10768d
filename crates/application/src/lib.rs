//! The translation loop: a pure state machine paced by an async runner.
//!
//! The machine ([`TranslatorMachine`]) consumes discrete events and
//! yields side-effect intents plus an updated [`ViewModel`]; the runner
//! ([`Translator`]) owns the timers, the frame source, and the
//! classifier calls, and executes the intents. Every behavioral
//! property of the loop is therefore expressible as a plain event
//! sequence against the machine.

mod machine;
mod runner;
mod view;

pub use machine::{Effect, LoopEvent, LoopState, TranslatorMachine};
pub use runner::{LoopConfig, Translator, TranslatorHandle};
pub use view::ViewModel;
