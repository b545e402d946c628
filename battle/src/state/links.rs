//! Symmetric links between two pokemon

use super::PokemonKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Lock-On / Mind Reader: the source's next move cannot miss the target
    LockOn,
    /// Mean Look, Block, or a trapping ability confirmed by a rejected switch
    Trap,
}

/// Pairs of pokemon joined by an effect, indexed from both ends so that
/// dropping either end drops the pair.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    forward: HashMap<(LinkKind, PokemonKey), PokemonKey>,
    backward: HashMap<(LinkKind, PokemonKey), PokemonKey>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `source` to `target`, replacing any link either had of this kind
    pub fn link(&mut self, kind: LinkKind, source: PokemonKey, target: PokemonKey) {
        self.unlink_source(kind, source);
        self.unlink_target(kind, target);
        self.forward.insert((kind, source), target);
        self.backward.insert((kind, target), source);
    }

    /// Who `source` is linked to (e.g. who it is trapping)
    pub fn target_of(&self, kind: LinkKind, source: PokemonKey) -> Option<PokemonKey> {
        self.forward.get(&(kind, source)).copied()
    }

    /// Who is linked to `target` (e.g. who is trapping it)
    pub fn source_of(&self, kind: LinkKind, target: PokemonKey) -> Option<PokemonKey> {
        self.backward.get(&(kind, target)).copied()
    }

    /// Drop every link of this kind touching `key`
    pub fn unlink(&mut self, kind: LinkKind, key: PokemonKey) {
        self.unlink_source(kind, key);
        self.unlink_target(kind, key);
    }

    /// Drop every link touching `key`
    pub fn clear(&mut self, key: PokemonKey) {
        self.unlink(LinkKind::LockOn, key);
        self.unlink(LinkKind::Trap, key);
    }

    /// Move every link touching `from` over to `to`, as Baton Pass does
    pub fn transfer(&mut self, from: PokemonKey, to: PokemonKey) {
        for kind in [LinkKind::LockOn, LinkKind::Trap] {
            let target = self.forward.get(&(kind, from)).copied();
            let source = self.backward.get(&(kind, from)).copied();
            self.unlink(kind, from);
            if let Some(target) = target {
                self.link(kind, to, target);
            }
            if let Some(source) = source {
                self.link(kind, source, to);
            }
        }
    }

    fn unlink_source(&mut self, kind: LinkKind, source: PokemonKey) {
        if let Some(target) = self.forward.remove(&(kind, source)) {
            self.backward.remove(&(kind, target));
        }
    }

    fn unlink_target(&mut self, kind: LinkKind, target: PokemonKey) {
        if let Some(source) = self.backward.remove(&(kind, target)) {
            self.forward.remove(&(kind, source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_protocol::SideId;

    #[test]
    fn test_clearing_either_end_clears_pair() {
        let trapper = PokemonKey::new(SideId::P2, 0);
        let victim = PokemonKey::new(SideId::P1, 3);
        let mut links = LinkTable::new();

        links.link(LinkKind::Trap, trapper, victim);
        assert_eq!(links.source_of(LinkKind::Trap, victim), Some(trapper));
        links.clear(victim);
        assert_eq!(links.target_of(LinkKind::Trap, trapper), None);

        links.link(LinkKind::LockOn, victim, trapper);
        links.clear(victim);
        assert_eq!(links.source_of(LinkKind::LockOn, trapper), None);
    }

    #[test]
    fn test_relink_replaces_old_pair() {
        let a = PokemonKey::new(SideId::P1, 0);
        let b = PokemonKey::new(SideId::P2, 0);
        let c = PokemonKey::new(SideId::P2, 1);
        let mut links = LinkTable::new();

        links.link(LinkKind::Trap, a, b);
        links.link(LinkKind::Trap, a, c);
        assert_eq!(links.source_of(LinkKind::Trap, b), None);
        assert_eq!(links.target_of(LinkKind::Trap, a), Some(c));
    }

    #[test]
    fn test_transfer_moves_both_ends() {
        let passer = PokemonKey::new(SideId::P1, 0);
        let recipient = PokemonKey::new(SideId::P1, 1);
        let foe = PokemonKey::new(SideId::P2, 0);
        let mut links = LinkTable::new();

        links.link(LinkKind::Trap, foe, passer);
        links.link(LinkKind::LockOn, passer, foe);
        links.transfer(passer, recipient);

        assert_eq!(links.source_of(LinkKind::Trap, recipient), Some(foe));
        assert_eq!(links.target_of(LinkKind::Trap, foe), Some(recipient));
        assert_eq!(links.target_of(LinkKind::LockOn, recipient), Some(foe));
        assert_eq!(links.source_of(LinkKind::Trap, passer), None);
        assert_eq!(links.target_of(LinkKind::LockOn, passer), None);
    }
}
