//! Wire format for Pokemon Showdown battle rooms.
//!
//! Parses battle-room lines into the closed [`BattleEvent`] schema, models
//! the `|request|` JSON, and renders outgoing [`Choice`]s.

use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{Choice, ClientCommand, ClientMessage};
pub use server::battle::{
    BoostStat, Effect, HpStatus, PokemonDetails, PokemonIdent, SideId, to_id,
};
pub use server::event::{BattleEvent, EventKind, HaltReason};
pub use server::request::{
    ActivePokemon, BattleRequest, MoveSlot, PokemonStats, SideInfo, SidePokemon,
};
pub use server::{ServerFrame, ServerLine, parse_server_frame, parse_server_line};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,

    #[error("Unknown message tag: {0}")]
    UnknownTag(String),
}
