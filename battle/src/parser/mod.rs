//! Event-driven battle parsing.
//!
//! A parser is an async function over a [`BattleParserContext`]: it peeks
//! at the next event, decides whether it can handle it, and consumes it
//! once committed. [`dispatch`] routes one event to its handler and
//! [`event_loop`] keeps a parser running until it stops making progress.

mod bridge;
mod context;
mod dispatch;
mod handlers;
#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{EventFeeder, EventReader, event_channel};
pub use context::BattleParserContext;
pub(crate) use context::TurnPhase;
pub use dispatch::{base_event_loop, dispatch, event_loop, is_residual, run_battle};

use crate::error::Result;
use futures::future::BoxFuture;

/// Boxed future returned by parsers that take part in recursion
pub type ParserFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// A parser usable with [`event_loop`]
pub type BattleParser = for<'a> fn(&'a mut BattleParserContext) -> ParserFuture<'a, ()>;
