//! Move slots, known and inferred.
//!
//! Revealed moves are tracked exactly. The remaining slots share one
//! candidate pool plus a list of hints, each saying "this pokemon knows at
//! least one of these moves". Counting how often each candidate is
//! mentioned across the open hints gives the slot constraint.

use crate::error::{BattleError, Result};
use std::collections::{HashMap, HashSet};

/// A revealed move slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    name: String,
    pp: u32,
    max_pp: u32,
}

impl Move {
    pub fn new(name: impl Into<String>, max_pp: u32) -> Self {
        Move {
            name: name.into(),
            pp: max_pp,
            max_pp,
        }
    }

    pub fn with_pp(name: impl Into<String>, pp: u32, max_pp: u32) -> Self {
        Move {
            name: name.into(),
            pp: pp.min(max_pp),
            max_pp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pp(&self) -> u32 {
        self.pp
    }

    pub fn max_pp(&self) -> u32 {
        self.max_pp
    }

    pub fn use_pp(&mut self, amount: u32) {
        self.pp = self.pp.saturating_sub(amount);
    }

    pub fn set_pp(&mut self, pp: u32) {
        self.pp = pp.min(self.max_pp);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moveset {
    moves: Vec<Move>,
    size: usize,
    /// Candidate moves for the unknown slots, with their max PP
    pool: HashMap<String, u32>,
    /// Open "knows one of" hints, each already intersected with `pool`
    hints: Vec<HashSet<String>>,
}

impl Moveset {
    pub const MAX_SIZE: usize = 4;

    /// A fully unknown moveset drawing from `pool`
    pub fn new(pool: impl IntoIterator<Item = (String, u32)>, size: usize) -> Self {
        let pool: HashMap<String, u32> = pool.into_iter().collect();
        Moveset {
            size: size.min(Self::MAX_SIZE).min(pool.len()),
            moves: Vec::new(),
            pool,
            hints: Vec::new(),
        }
    }

    /// A moveset with every slot known
    pub fn known(moves: Vec<Move>) -> Self {
        Moveset {
            size: moves.len(),
            moves,
            pool: HashMap::new(),
            hints: Vec::new(),
        }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn unknown_slots(&self) -> usize {
        self.size - self.moves.len()
    }

    pub fn pool(&self) -> impl Iterator<Item = &String> {
        self.pool.keys()
    }

    pub fn hints(&self) -> &[HashSet<String>] {
        &self.hints
    }

    pub fn get(&self, name: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Move> {
        self.moves.iter_mut().find(|m| m.name == name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether the move is known or could still fill an unknown slot
    pub fn could_have(&self, name: &str) -> bool {
        self.is_known(name) || (self.unknown_slots() > 0 && self.pool.contains_key(name))
    }

    /// Mention counts of each candidate across the open hints
    pub fn constraint(&self) -> HashMap<&str, u32> {
        let mut counts = HashMap::new();
        for hint in &self.hints {
            for name in hint {
                *counts.entry(name.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Fill an unknown slot with `name`
    pub fn reveal(&mut self, name: &str) -> Result<()> {
        if self.is_known(name) {
            return Ok(());
        }
        if self.unknown_slots() == 0 {
            return Err(BattleError::Contradiction(format!(
                "cannot reveal {name}: all {} move slots are known",
                self.size
            )));
        }
        let rest: Vec<&HashSet<String>> = self.hints.iter().filter(|h| !h.contains(name)).collect();
        if !coverable(&rest, self.unknown_slots() - 1) {
            return Err(BattleError::Contradiction(format!(
                "revealing {name} would leave {} move hints for {} slots",
                rest.len(),
                self.unknown_slots() - 1
            )));
        }
        let Some(max_pp) = self.pool.remove(name) else {
            return Err(BattleError::Contradiction(format!(
                "{name} is not a candidate move"
            )));
        };
        self.moves.push(Move::new(name, max_pp));
        self.hints.retain(|hint| !hint.contains(name));
        self.settle()
    }

    /// Record that at least one of `candidates` is in the moveset
    pub fn add_hint(&mut self, candidates: impl IntoIterator<Item = String>) -> Result<()> {
        let candidates: HashSet<String> = candidates.into_iter().collect();
        if candidates.iter().any(|c| self.is_known(c)) {
            return Ok(());
        }
        let open: HashSet<String> = candidates
            .into_iter()
            .filter(|c| self.pool.contains_key(c))
            .collect();
        let mut all: Vec<&HashSet<String>> = self.hints.iter().collect();
        all.push(&open);
        if !open.is_empty() && !coverable(&all, self.unknown_slots()) {
            return Err(BattleError::Contradiction(format!(
                "{} move hints cannot fit in {} unknown slots",
                all.len(),
                self.unknown_slots()
            )));
        }
        self.hints.push(open);
        self.settle()
    }

    /// Rule moves out of the unknown slots
    pub fn remove_candidates<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            self.pool.remove(name);
            for hint in &mut self.hints {
                hint.remove(name);
            }
        }
        self.size = self.size.min(self.moves.len() + self.pool.len());
        self.settle()
    }

    /// Reveal `name` if needed, then spend `cost` PP
    pub fn use_move(&mut self, name: &str, cost: u32) -> Result<()> {
        self.reveal(name)?;
        if let Some(slot) = self.get_mut(name) {
            slot.use_pp(cost);
        }
        Ok(())
    }

    /// Replace every slot with authoritative data
    pub fn set_known(&mut self, moves: Vec<Move>) {
        *self = Self::known(moves);
    }

    /// The copy a transforming pokemon receives: known moves at 5 PP
    pub fn transform_copy(&self) -> Self {
        Moveset {
            moves: self.moves.iter().map(|m| Move::new(&m.name, 5)).collect(),
            size: self.size,
            pool: self.pool.keys().map(|name| (name.clone(), 5)).collect(),
            hints: self.hints.clone(),
        }
    }

    fn settle(&mut self) -> Result<()> {
        if self.hints.iter().any(|h| h.is_empty()) {
            return Err(BattleError::Contradiction(
                "a move hint has no remaining candidates".to_string(),
            ));
        }
        let hints: Vec<&HashSet<String>> = self.hints.iter().collect();
        if !coverable(&hints, self.unknown_slots()) {
            return Err(BattleError::Contradiction(format!(
                "{} move hints cannot fit in {} unknown slots",
                self.hints.len(),
                self.unknown_slots()
            )));
        }
        let forced = self
            .hints
            .iter()
            .find(|h| h.len() == 1)
            .and_then(|h| h.iter().next().cloned());
        match forced {
            Some(name) => self.reveal(&name),
            None => Ok(()),
        }
    }
}

/// Whether `slots` moves can satisfy every hint, each move satisfying
/// the hints that mention it
fn coverable(hints: &[&HashSet<String>], slots: usize) -> bool {
    if hints.iter().any(|h| h.is_empty()) {
        return false;
    }
    if hints.len() <= slots {
        return true;
    }
    let Some(first) = hints.first() else {
        return true;
    };
    if slots == 0 {
        return false;
    }
    first.iter().any(|name| {
        let rest: Vec<&HashSet<String>> = hints[1..]
            .iter()
            .copied()
            .filter(|h| !h.contains(name))
            .collect();
        coverable(&rest, slots - 1)
    })
}
