//! Plays Pokemon Showdown battle rooms with a `sleuth-battle` parser.
//!
//! A [`BattleDriver`] owns one room. Hand it every frame the server sends
//! for that room; it feeds the battle log to the parser, answers the
//! parser's choices from `|error|` lines and battle progress, and queues
//! outgoing [`ClientMessage`]s for whatever transport the caller runs.
//!
//! ```no_run
//! use sleuth_client::{BattleDriver, DriverConfig, RandomAgent};
//! use tokio::sync::mpsc;
//!
//! # async fn run(frames: Vec<String>) -> anyhow::Result<()> {
//! let (outgoing, mut wire) = mpsc::channel(16);
//! let mut driver = BattleDriver::start(
//!     "battle-gen4randombattle-1",
//!     DriverConfig::default(),
//!     Box::new(RandomAgent::new()),
//!     outgoing,
//! )?;
//! tokio::spawn(async move {
//!     while let Some(message) = wire.recv().await {
//!         println!("{}", message.to_wire_format());
//!     }
//! });
//! for frame in &frames {
//!     driver.handle_frame(frame)?;
//! }
//! let state = driver.finish().await?;
//! println!("winner: {:?}", state.winner);
//! # Ok(())
//! # }
//! ```

mod agent;
mod config;
mod driver;
mod error;
mod sender;

pub use agent::RandomAgent;
pub use config::DriverConfig;
pub use driver::BattleDriver;
pub use error::DriverError;
pub use sender::ProtocolSender;

pub use sleuth_protocol::{ClientCommand, ClientMessage};
