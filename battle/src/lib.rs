//! Belief-state tracking for Pokemon Showdown gen 4 singles.
//!
//! The opponent's team is only partly visible, so every unknown (item,
//! ability, moveset, Hidden Power type, stats) is tracked as a set of
//! remaining candidates that battle events narrow down.
//!
//! # Overview
//!
//! `sleuth-battle` sits between `sleuth-protocol` (wire format) and the
//! transport adapter:
//!
//! ```text
//! sleuth-protocol (lines -> BattleEvent)
//!        │
//!        ▼
//! sleuth-battle (belief state + inference + decisions) ← THIS CRATE
//!        │
//!        └─> sleuth-client (feeds events, sends choices)
//! ```
//!
//! # Main Types
//!
//! ## Belief state
//! - [`PossibilityClass`] - a narrowing candidate set
//! - [`BattleState`] - both teams, the field and the latest request
//! - [`Dex`] - static gen 4 data
//!
//! ## Inference
//! - [`SubReason`] - one checkable claim about the state
//! - [`SubInference`] - a conjunction of claims that explains an event
//! - [`EventInference`] - competing explanations and the parser that
//!   recognises the event confirming one
//!
//! ## Parsing and decisions
//! - [`EventFeeder`] / [`EventReader`] - the two ends of the event bridge
//! - [`BattleParserContext`] - what every parser runs against
//! - [`run_battle`] - the top-level parser
//! - [`BattleAgent`] / [`ChoiceSender`] - the capabilities a battle needs
//!
//! # Example Usage
//!
//! ```ignore
//! use sleuth_battle::{BattleParserContext, BattleState, Dex, event_channel, run_battle};
//!
//! let (feeder, reader) = event_channel();
//! let state = BattleState::new(Dex::gen4()?);
//! let mut ctx = BattleParserContext::new(state, Box::new(agent), Box::new(sender), reader);
//! let parser = tokio::spawn(async move { run_battle(&mut ctx).await });
//!
//! for event in events {
//!     if !feeder.next(event).await? {
//!         break;
//!     }
//! }
//! feeder.close();
//! parser.await??;
//! ```

pub mod decision;
pub mod dex;
pub mod error;
pub mod inference;
pub mod parser;
pub mod state;
pub mod types;

pub use decision::{BattleAgent, ChoiceSender, SenderResult, decide, get_choices};
pub use dex::Dex;
pub use error::{BattleError, BridgeError, Result};
pub use inference::{
    AbilityReason, Acceptor, EventInference, InferenceParser, ItemReason, MoveTypeReason,
    SubInference, SubReason, expect_events,
};
pub use parser::{
    BattleParser, BattleParserContext, EventFeeder, EventReader, ParserFuture, base_event_loop,
    dispatch, event_channel, event_loop, run_battle,
};
pub use state::{BattleState, PokemonKey, PossibilityClass};
pub use types::{MajorStatus, Type, Weather};

// Re-export commonly used protocol types
pub use sleuth_protocol::{BattleEvent, Choice, HaltReason, SideId};
