//! The closed set of battle events consumed by the belief tracker

use super::battle::{BoostStat, Effect, HpStatus, PokemonDetails, PokemonIdent, SideId};
use super::request::BattleRequest;
use std::fmt;

/// Why the event stream paused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The battle is over, no further events follow
    GameOver,
    /// Waiting on the opponent, no choice needed
    Wait,
    /// A switch-only choice is required
    Switch,
    /// A full move-or-switch choice is required
    Decide,
}

/// A single battle event
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Setup and progress
    /// |player|SIDE|USERNAME|...
    Player { side: SideId, username: String },
    /// |teamsize|SIDE|SIZE
    TeamSize { side: SideId, size: usize },
    /// |gen|N
    Gen(u8),
    /// |start
    Start,
    /// |request|JSON
    Request(Box<BattleRequest>),
    /// |turn|N
    Turn(u32),
    /// |upkeep
    Upkeep,
    /// |win|USER
    Win(String),
    /// |tie
    Tie,
    /// Synthetic end-of-chunk marker
    Halt(HaltReason),

    // Major actions
    /// |move|POKEMON|MOVE|TARGET
    Move {
        user: PokemonIdent,
        move_name: String,
        target: Option<PokemonIdent>,
        from: Option<Effect>,
        miss: bool,
        still: bool,
    },
    /// |switch|POKEMON|DETAILS|HP STATUS
    Switch {
        ident: PokemonIdent,
        details: PokemonDetails,
        hp: HpStatus,
    },
    /// |drag|POKEMON|DETAILS|HP STATUS
    Drag {
        ident: PokemonIdent,
        details: PokemonDetails,
        hp: HpStatus,
    },
    /// |detailschange|POKEMON|DETAILS|HP STATUS
    DetailsChange {
        ident: PokemonIdent,
        details: PokemonDetails,
    },
    /// |-formechange|POKEMON|SPECIES|HP STATUS
    FormeChange {
        ident: PokemonIdent,
        species: String,
        from: Option<Effect>,
    },
    /// |cant|POKEMON|REASON|MOVE
    Cant {
        ident: PokemonIdent,
        reason: Effect,
        move_name: Option<String>,
    },
    /// |faint|POKEMON
    Faint(PokemonIdent),

    // Minor actions
    /// |-fail|POKEMON|ACTION
    Fail {
        ident: PokemonIdent,
        action: Option<String>,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-block|POKEMON|EFFECT|MOVE|ATTACKER
    Block {
        ident: PokemonIdent,
        effect: Effect,
        move_name: Option<String>,
        attacker: Option<PokemonIdent>,
    },
    /// |-notarget|POKEMON
    NoTarget(Option<PokemonIdent>),
    /// |-miss|SOURCE|TARGET
    Miss {
        source: PokemonIdent,
        target: Option<PokemonIdent>,
    },
    /// |-damage|POKEMON|HP STATUS
    Damage {
        ident: PokemonIdent,
        hp: HpStatus,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-heal|POKEMON|HP STATUS
    Heal {
        ident: PokemonIdent,
        hp: HpStatus,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-sethp|POKEMON|HP
    SetHp {
        ident: PokemonIdent,
        hp: HpStatus,
        from: Option<Effect>,
    },
    /// |-status|POKEMON|STATUS
    Status {
        ident: PokemonIdent,
        status: String,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-curestatus|POKEMON|STATUS
    CureStatus {
        ident: PokemonIdent,
        status: String,
        from: Option<Effect>,
    },
    /// |-cureteam|POKEMON
    CureTeam {
        ident: PokemonIdent,
        from: Option<Effect>,
    },
    /// |-boost|POKEMON|STAT|AMOUNT
    Boost {
        ident: PokemonIdent,
        stat: BoostStat,
        amount: i8,
        from: Option<Effect>,
    },
    /// |-unboost|POKEMON|STAT|AMOUNT
    Unboost {
        ident: PokemonIdent,
        stat: BoostStat,
        amount: i8,
        from: Option<Effect>,
    },
    /// |-setboost|POKEMON|STAT|AMOUNT
    SetBoost {
        ident: PokemonIdent,
        stat: BoostStat,
        amount: i8,
        from: Option<Effect>,
    },
    /// |-swapboost|SOURCE|TARGET|STATS
    SwapBoost {
        source: PokemonIdent,
        target: PokemonIdent,
        stats: Vec<BoostStat>,
    },
    /// |-invertboost|POKEMON
    InvertBoost(PokemonIdent),
    /// |-clearboost|POKEMON
    ClearBoost(PokemonIdent),
    /// |-clearallboost
    ClearAllBoost,
    /// |-clearpositiveboost|TARGET|POKEMON|EFFECT
    ClearPositiveBoost(PokemonIdent),
    /// |-clearnegativeboost|POKEMON
    ClearNegativeBoost(PokemonIdent),
    /// |-copyboost|SOURCE|TARGET
    CopyBoost {
        source: PokemonIdent,
        target: PokemonIdent,
    },
    /// |-weather|WEATHER
    Weather {
        /// None when the weather ended
        weather: Option<String>,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
        upkeep: bool,
    },
    /// |-fieldstart|CONDITION
    FieldStart {
        effect: Effect,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-fieldend|CONDITION
    FieldEnd { effect: Effect },
    /// |-sidestart|SIDE|CONDITION
    SideStart { side: SideId, condition: Effect },
    /// |-sideend|SIDE|CONDITION
    SideEnd {
        side: SideId,
        condition: Effect,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-start|POKEMON|EFFECT|DETAIL
    VolatileStart {
        ident: PokemonIdent,
        effect: Effect,
        detail: Option<String>,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
        silent: bool,
    },
    /// |-end|POKEMON|EFFECT
    VolatileEnd {
        ident: PokemonIdent,
        effect: Effect,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
        silent: bool,
    },
    /// |-crit|POKEMON
    Crit(PokemonIdent),
    /// |-supereffective|POKEMON
    SuperEffective(PokemonIdent),
    /// |-resisted|POKEMON
    Resisted(PokemonIdent),
    /// |-immune|POKEMON
    Immune {
        ident: PokemonIdent,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-item|POKEMON|ITEM
    Item {
        ident: PokemonIdent,
        item: String,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-enditem|POKEMON|ITEM
    EndItem {
        ident: PokemonIdent,
        item: String,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
        eat: bool,
    },
    /// |-ability|POKEMON|ABILITY
    Ability {
        ident: PokemonIdent,
        ability: String,
        from: Option<Effect>,
        of: Option<PokemonIdent>,
    },
    /// |-endability|POKEMON
    EndAbility {
        ident: PokemonIdent,
        from: Option<Effect>,
    },
    /// |-transform|POKEMON|TARGET
    Transform {
        source: PokemonIdent,
        target: PokemonIdent,
    },
    /// |-activate|POKEMON|EFFECT|ARGS...
    Activate {
        ident: Option<PokemonIdent>,
        effect: Effect,
        args: Vec<String>,
        of: Option<PokemonIdent>,
    },
    /// |-fieldactivate|EFFECT
    FieldActivate(Effect),
    /// |-hint|MESSAGE
    Hint(String),
    /// |-center
    Center,
    /// |-message|MESSAGE
    Message(String),
    /// |-prepare|ATTACKER|MOVE|DEFENDER
    Prepare {
        ident: PokemonIdent,
        move_name: String,
        target: Option<PokemonIdent>,
    },
    /// |-mustrecharge|POKEMON
    MustRecharge(PokemonIdent),
    /// |-nothing
    Nothing,
    /// |-hitcount|POKEMON|NUM
    HitCount { ident: PokemonIdent, count: u32 },
    /// |-singlemove|POKEMON|MOVE
    SingleMove {
        ident: PokemonIdent,
        move_name: String,
    },
    /// |-singleturn|POKEMON|MOVE
    SingleTurn {
        ident: PokemonIdent,
        move_name: String,
    },
    /// |-ohko
    Ohko,
}

/// Fieldless tag of a [`BattleEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Player,
    TeamSize,
    Gen,
    Start,
    Request,
    Turn,
    Upkeep,
    Win,
    Tie,
    Halt,
    Move,
    Switch,
    Drag,
    DetailsChange,
    FormeChange,
    Cant,
    Faint,
    Fail,
    Block,
    NoTarget,
    Miss,
    Damage,
    Heal,
    SetHp,
    Status,
    CureStatus,
    CureTeam,
    Boost,
    Unboost,
    SetBoost,
    SwapBoost,
    InvertBoost,
    ClearBoost,
    ClearAllBoost,
    ClearPositiveBoost,
    ClearNegativeBoost,
    CopyBoost,
    Weather,
    FieldStart,
    FieldEnd,
    SideStart,
    SideEnd,
    VolatileStart,
    VolatileEnd,
    Crit,
    SuperEffective,
    Resisted,
    Immune,
    Item,
    EndItem,
    Ability,
    EndAbility,
    Transform,
    Activate,
    FieldActivate,
    Hint,
    Center,
    Message,
    Prepare,
    MustRecharge,
    Nothing,
    HitCount,
    SingleMove,
    SingleTurn,
    Ohko,
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::Player { .. } => EventKind::Player,
            BattleEvent::TeamSize { .. } => EventKind::TeamSize,
            BattleEvent::Gen(_) => EventKind::Gen,
            BattleEvent::Start => EventKind::Start,
            BattleEvent::Request(_) => EventKind::Request,
            BattleEvent::Turn(_) => EventKind::Turn,
            BattleEvent::Upkeep => EventKind::Upkeep,
            BattleEvent::Win(_) => EventKind::Win,
            BattleEvent::Tie => EventKind::Tie,
            BattleEvent::Halt(_) => EventKind::Halt,
            BattleEvent::Move { .. } => EventKind::Move,
            BattleEvent::Switch { .. } => EventKind::Switch,
            BattleEvent::Drag { .. } => EventKind::Drag,
            BattleEvent::DetailsChange { .. } => EventKind::DetailsChange,
            BattleEvent::FormeChange { .. } => EventKind::FormeChange,
            BattleEvent::Cant { .. } => EventKind::Cant,
            BattleEvent::Faint(_) => EventKind::Faint,
            BattleEvent::Fail { .. } => EventKind::Fail,
            BattleEvent::Block { .. } => EventKind::Block,
            BattleEvent::NoTarget(_) => EventKind::NoTarget,
            BattleEvent::Miss { .. } => EventKind::Miss,
            BattleEvent::Damage { .. } => EventKind::Damage,
            BattleEvent::Heal { .. } => EventKind::Heal,
            BattleEvent::SetHp { .. } => EventKind::SetHp,
            BattleEvent::Status { .. } => EventKind::Status,
            BattleEvent::CureStatus { .. } => EventKind::CureStatus,
            BattleEvent::CureTeam { .. } => EventKind::CureTeam,
            BattleEvent::Boost { .. } => EventKind::Boost,
            BattleEvent::Unboost { .. } => EventKind::Unboost,
            BattleEvent::SetBoost { .. } => EventKind::SetBoost,
            BattleEvent::SwapBoost { .. } => EventKind::SwapBoost,
            BattleEvent::InvertBoost(_) => EventKind::InvertBoost,
            BattleEvent::ClearBoost(_) => EventKind::ClearBoost,
            BattleEvent::ClearAllBoost => EventKind::ClearAllBoost,
            BattleEvent::ClearPositiveBoost(_) => EventKind::ClearPositiveBoost,
            BattleEvent::ClearNegativeBoost(_) => EventKind::ClearNegativeBoost,
            BattleEvent::CopyBoost { .. } => EventKind::CopyBoost,
            BattleEvent::Weather { .. } => EventKind::Weather,
            BattleEvent::FieldStart { .. } => EventKind::FieldStart,
            BattleEvent::FieldEnd { .. } => EventKind::FieldEnd,
            BattleEvent::SideStart { .. } => EventKind::SideStart,
            BattleEvent::SideEnd { .. } => EventKind::SideEnd,
            BattleEvent::VolatileStart { .. } => EventKind::VolatileStart,
            BattleEvent::VolatileEnd { .. } => EventKind::VolatileEnd,
            BattleEvent::Crit(_) => EventKind::Crit,
            BattleEvent::SuperEffective(_) => EventKind::SuperEffective,
            BattleEvent::Resisted(_) => EventKind::Resisted,
            BattleEvent::Immune { .. } => EventKind::Immune,
            BattleEvent::Item { .. } => EventKind::Item,
            BattleEvent::EndItem { .. } => EventKind::EndItem,
            BattleEvent::Ability { .. } => EventKind::Ability,
            BattleEvent::EndAbility { .. } => EventKind::EndAbility,
            BattleEvent::Transform { .. } => EventKind::Transform,
            BattleEvent::Activate { .. } => EventKind::Activate,
            BattleEvent::FieldActivate(_) => EventKind::FieldActivate,
            BattleEvent::Hint(_) => EventKind::Hint,
            BattleEvent::Center => EventKind::Center,
            BattleEvent::Message(_) => EventKind::Message,
            BattleEvent::Prepare { .. } => EventKind::Prepare,
            BattleEvent::MustRecharge(_) => EventKind::MustRecharge,
            BattleEvent::Nothing => EventKind::Nothing,
            BattleEvent::HitCount { .. } => EventKind::HitCount,
            BattleEvent::SingleMove { .. } => EventKind::SingleMove,
            BattleEvent::SingleTurn { .. } => EventKind::SingleTurn,
            BattleEvent::Ohko => EventKind::Ohko,
        }
    }

    /// The `[from]` effect, for variants that carry one
    pub fn from_effect(&self) -> Option<&Effect> {
        match self {
            BattleEvent::Move { from, .. }
            | BattleEvent::FormeChange { from, .. }
            | BattleEvent::Fail { from, .. }
            | BattleEvent::Damage { from, .. }
            | BattleEvent::Heal { from, .. }
            | BattleEvent::SetHp { from, .. }
            | BattleEvent::Status { from, .. }
            | BattleEvent::CureStatus { from, .. }
            | BattleEvent::CureTeam { from, .. }
            | BattleEvent::Boost { from, .. }
            | BattleEvent::Unboost { from, .. }
            | BattleEvent::SetBoost { from, .. }
            | BattleEvent::Weather { from, .. }
            | BattleEvent::FieldStart { from, .. }
            | BattleEvent::SideEnd { from, .. }
            | BattleEvent::VolatileStart { from, .. }
            | BattleEvent::VolatileEnd { from, .. }
            | BattleEvent::Immune { from, .. }
            | BattleEvent::Item { from, .. }
            | BattleEvent::EndItem { from, .. }
            | BattleEvent::Ability { from, .. }
            | BattleEvent::EndAbility { from, .. } => from.as_ref(),
            _ => None,
        }
    }

    /// The pokemon this event is primarily about, if any
    pub fn subject(&self) -> Option<&PokemonIdent> {
        match self {
            BattleEvent::Move { user, .. } => Some(user),
            BattleEvent::Switch { ident, .. }
            | BattleEvent::Drag { ident, .. }
            | BattleEvent::DetailsChange { ident, .. }
            | BattleEvent::FormeChange { ident, .. }
            | BattleEvent::Cant { ident, .. }
            | BattleEvent::Fail { ident, .. }
            | BattleEvent::Block { ident, .. }
            | BattleEvent::Damage { ident, .. }
            | BattleEvent::Heal { ident, .. }
            | BattleEvent::SetHp { ident, .. }
            | BattleEvent::Status { ident, .. }
            | BattleEvent::CureStatus { ident, .. }
            | BattleEvent::CureTeam { ident, .. }
            | BattleEvent::Boost { ident, .. }
            | BattleEvent::Unboost { ident, .. }
            | BattleEvent::SetBoost { ident, .. }
            | BattleEvent::VolatileStart { ident, .. }
            | BattleEvent::VolatileEnd { ident, .. }
            | BattleEvent::Immune { ident, .. }
            | BattleEvent::Item { ident, .. }
            | BattleEvent::EndItem { ident, .. }
            | BattleEvent::Ability { ident, .. }
            | BattleEvent::EndAbility { ident, .. }
            | BattleEvent::Prepare { ident, .. }
            | BattleEvent::HitCount { ident, .. }
            | BattleEvent::SingleMove { ident, .. }
            | BattleEvent::SingleTurn { ident, .. } => Some(ident),
            BattleEvent::Faint(ident)
            | BattleEvent::InvertBoost(ident)
            | BattleEvent::ClearBoost(ident)
            | BattleEvent::ClearPositiveBoost(ident)
            | BattleEvent::ClearNegativeBoost(ident)
            | BattleEvent::Crit(ident)
            | BattleEvent::SuperEffective(ident)
            | BattleEvent::Resisted(ident)
            | BattleEvent::MustRecharge(ident) => Some(ident),
            BattleEvent::Miss { source, .. }
            | BattleEvent::SwapBoost { source, .. }
            | BattleEvent::CopyBoost { source, .. }
            | BattleEvent::Transform { source, .. } => Some(source),
            BattleEvent::NoTarget(ident) | BattleEvent::Activate { ident, .. } => ident.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
