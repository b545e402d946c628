use super::{
    DurationInference, LinkTable, Moveset, Pokemon, PokemonKey, PossibilityClass, RoomStatus,
    Team, VolatileStatus, normalize_move_id,
};
use crate::dex::{Dex, SelfSwitchKind};
use crate::error::{BattleError, Result};
use crate::inference::DeferredRejections;
use crate::types::{MajorStatus, Type};
use sleuth_protocol::{BattleRequest, HpStatus, PokemonDetails, PokemonIdent, SideId};
use std::sync::Arc;
use tracing::debug;

/// Root of the belief state: both teams, the field, and the links between
/// pokemon.
#[derive(Debug)]
pub struct BattleState {
    dex: Arc<Dex>,
    /// Our side, known from the first request or a matching `|player|`
    pub our_side: Option<SideId>,
    /// Our username, used to recognise our `|player|` line
    pub our_username: Option<String>,
    pub usernames: [Option<String>; 2],
    teams: [Team; 2],
    pub room: RoomStatus,
    pub links: LinkTable,
    pub turn: u32,
    /// Most recent request, consulted when a decision is due
    pub request: Option<BattleRequest>,
    pub(crate) deferred: DeferredRejections,
    pub game_over: bool,
    /// Winning username, None on a tie or while the battle runs
    pub winner: Option<String>,
}

impl BattleState {
    pub fn new(dex: Arc<Dex>) -> Self {
        BattleState {
            dex,
            our_side: None,
            our_username: None,
            usernames: [None, None],
            teams: [Team::new(SideId::P1, 6), Team::new(SideId::P2, 6)],
            room: RoomStatus::new(),
            links: LinkTable::new(),
            turn: 0,
            request: None,
            deferred: DeferredRejections::default(),
            game_over: false,
            winner: None,
        }
    }

    pub fn dex(&self) -> &Dex {
        &self.dex
    }

    pub fn team(&self, side: SideId) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: SideId) -> &mut Team {
        &mut self.teams[side.index()]
    }

    pub fn is_ours(&self, side: SideId) -> bool {
        self.our_side == Some(side)
    }

    /// The side whose hidden information we are inferring
    pub fn is_opponent(&self, side: SideId) -> bool {
        self.our_side.is_some_and(|ours| ours != side)
    }

    /// Find an already introduced pokemon
    pub fn resolve(&self, ident: &PokemonIdent) -> Result<PokemonKey> {
        self.team(ident.side)
            .find(&ident.name)
            .map(|index| PokemonKey::new(ident.side, index))
            .ok_or_else(|| BattleError::UnknownPokemon(ident.to_string()))
    }

    /// Find a pokemon, adding it to its team if this is its first appearance
    pub fn introduce(&mut self, ident: &PokemonIdent, details: &PokemonDetails) -> Result<PokemonKey> {
        if let Ok(key) = self.resolve(ident) {
            return Ok(key);
        }
        let pokemon = Pokemon::hidden(&self.dex, &ident.name, details)?;
        let index = self.team_mut(ident.side).add(pokemon);
        debug!(side = %ident.side, name = %ident.name, species = %details.species, "new pokemon");
        Ok(PokemonKey::new(ident.side, index))
    }

    pub fn pokemon(&self, key: PokemonKey) -> Result<&Pokemon> {
        self.team(key.side)
            .pokemon(key.index)
            .ok_or_else(|| BattleError::UnknownPokemon(key.to_string()))
    }

    pub fn pokemon_mut(&mut self, key: PokemonKey) -> Result<&mut Pokemon> {
        self.team_mut(key.side)
            .pokemon_mut(key.index)
            .ok_or_else(|| BattleError::UnknownPokemon(key.to_string()))
    }

    pub fn active_key(&self, side: SideId) -> Option<PokemonKey> {
        self.team(side)
            .active_index()
            .map(|index| PokemonKey::new(side, index))
    }

    pub fn is_active(&self, key: PokemonKey) -> bool {
        self.active_key(key.side) == Some(key)
    }

    /// The pokemon facing `key`
    pub fn opponent_of(&self, key: PokemonKey) -> Option<PokemonKey> {
        self.active_key(key.side.opponent())
    }

    /// Volatile status of `key`, if it is on the field
    pub fn volatile(&self, key: PokemonKey) -> Option<&VolatileStatus> {
        self.is_active(key).then(|| &self.team(key.side).volatile)
    }

    pub fn volatile_mut(&mut self, key: PokemonKey) -> Option<&mut VolatileStatus> {
        if !self.is_active(key) {
            return None;
        }
        Some(&mut self.team_mut(key.side).volatile)
    }

    /// Current ability candidates, honouring Transform
    pub fn ability(&self, key: PokemonKey) -> Result<&PossibilityClass<String>> {
        if let Some(traits) = self.volatile(key).and_then(|v| v.override_traits.as_ref()) {
            return Ok(&traits.ability);
        }
        Ok(&self.pokemon(key)?.base_traits.ability)
    }

    pub fn ability_mut(&mut self, key: PokemonKey) -> Result<&mut PossibilityClass<String>> {
        if self.volatile(key).is_some_and(VolatileStatus::is_transformed) {
            return self
                .team_mut(key.side)
                .volatile
                .override_traits
                .as_mut()
                .map(|traits| &mut traits.ability)
                .ok_or_else(|| BattleError::UnknownPokemon(key.to_string()));
        }
        Ok(&mut self.pokemon_mut(key)?.base_traits.ability)
    }

    /// The active pokemon now has `ability` until it leaves the field
    /// (Trace, Role Play, Worry Seed). The base ability is untouched.
    pub fn change_ability(&mut self, key: PokemonKey, ability: &str) -> Result<()> {
        let changed = PossibilityClass::definite("ability", ability.to_string());
        if !self.is_active(key) {
            return Err(BattleError::Contradiction(format!(
                "{key} changed ability to {ability} while off the field"
            )));
        }
        let traits = match self.team_mut(key.side).volatile.override_traits.take() {
            Some(mut traits) => {
                traits.ability = changed;
                traits
            }
            None => {
                let mut traits = self.pokemon(key)?.base_traits.snapshot();
                traits.ability = changed;
                traits
            }
        };
        self.team_mut(key.side).volatile.override_traits = Some(traits);
        Ok(())
    }

    /// Definite ability id, if known. Gastro Acid counts as no ability.
    pub fn known_ability(&self, key: PokemonKey) -> Option<&str> {
        if self.volatile(key).is_some_and(|v| v.gastro_acid) {
            return None;
        }
        self.ability(key)
            .ok()
            .and_then(PossibilityClass::definite_value)
            .map(String::as_str)
    }

    /// Moves the pokemon is currently using, honouring Transform
    pub fn moveset_mut(&mut self, key: PokemonKey) -> Result<&mut Moveset> {
        if self.volatile(key).is_some_and(|v| v.override_moveset.is_some()) {
            return self
                .team_mut(key.side)
                .volatile
                .override_moveset
                .as_mut()
                .ok_or_else(|| BattleError::UnknownPokemon(key.to_string()));
        }
        Ok(&mut self.pokemon_mut(key)?.moveset)
    }

    pub fn moveset(&self, key: PokemonKey) -> Result<&Moveset> {
        if let Some(moveset) = self.volatile(key).and_then(|v| v.override_moveset.as_ref()) {
            return Ok(moveset);
        }
        Ok(&self.pokemon(key)?.moveset)
    }

    /// Current types: Transform or Color Change overrides, and Roost
    /// removes Flying for the turn
    pub fn types(&self, key: PokemonKey) -> Result<Vec<Type>> {
        let volatile = self.volatile(key);
        let mut types = match volatile.and_then(|v| v.override_types.clone()) {
            Some(types) => types,
            None => self.pokemon(key)?.base_traits.types.clone(),
        };
        if volatile.is_some_and(|v| v.roost) {
            types.retain(|t| *t != Type::Flying);
            if types.is_empty() {
                types.push(Type::Normal);
            }
        }
        Ok(types)
    }

    pub fn is_grounded(&self, key: PokemonKey) -> Result<bool> {
        if self.room.gravity.is_active() {
            return Ok(true);
        }
        if self.types(key)?.contains(&Type::Flying) {
            return Ok(false);
        }
        if self.known_ability(key) == Some("levitate") {
            return Ok(false);
        }
        Ok(!self.volatile(key).is_some_and(|v| v.magnet_rise.is_active()))
    }

    /// Whether the held item is known to have no effect right now
    pub fn item_suppressed(&self, key: PokemonKey) -> bool {
        if self.volatile(key).is_some_and(|v| v.embargo.is_active()) {
            return true;
        }
        self.known_ability(key)
            .and_then(|id| self.dex.ability(id))
            .is_some_and(|data| data.suppresses_item)
    }

    /// A pokemon entered the field
    pub fn switch_in(
        &mut self,
        ident: &PokemonIdent,
        details: &PokemonDetails,
        hp: &HpStatus,
    ) -> Result<PokemonKey> {
        let key = self.introduce(ident, details)?;
        if let Some(previous) = self.active_key(key.side)
            && previous != key
        {
            // Trapping and lock-on are passed along with the other passable status
            let passing =
                self.team(key.side).status.self_switch == Some(SelfSwitchKind::CopyVolatile);
            if passing {
                self.links.transfer(previous, key);
            } else {
                self.links.clear(previous);
            }
        }

        let team = self.team_mut(key.side);
        team.switch_in(key.index);
        team.status.healing_wish = false;
        team.status.lunar_dance = false;

        let pokemon = self.pokemon_mut(key)?;
        pokemon.hp.apply(hp);
        match hp.status.as_deref().and_then(MajorStatus::from_protocol) {
            Some(status) if !pokemon.major_status.is(status) => pokemon.major_status.afflict(status),
            Some(_) => {}
            None => pokemon.major_status.cure(),
        }
        Ok(key)
    }

    /// End-of-turn bookkeeping for everything no message updates
    pub fn post_turn(&mut self) -> Result<()> {
        let mut inferences = Vec::new();
        for side in [SideId::P1, SideId::P2] {
            let ability = self
                .active_key(side)
                .and_then(|key| self.known_ability(key))
                .map(str::to_string);
            let team = self.team_mut(side);
            if team.active_index().is_some() {
                team.volatile.post_turn(ability.as_deref());
            }
            if let Some(active) = team.active_mut()
                && active.major_status.is(MajorStatus::Toxic)
            {
                active.major_status.tick();
            }
            team.status.self_switch = None;
            inferences.extend(team.status.post_turn());
        }
        self.room.post_turn();

        for inference in inferences {
            self.apply_duration_inference(inference)?;
        }
        Ok(())
    }

    /// Narrow the source's item by what a status duration revealed. Sources
    /// that already lost or swapped their item are left alone.
    pub fn apply_duration_inference(&mut self, inference: DurationInference) -> Result<()> {
        debug!(?inference, "duration inference");
        match inference {
            DurationInference::Extended { source, item } => {
                let pokemon = self.pokemon_mut(source)?;
                // A definite item may have replaced the extender since
                if pokemon.item.is_set(&item) || !pokemon.item.is_definite() {
                    pokemon.item.narrow([item])?;
                } else {
                    debug!(%source, %item, "extender no longer held");
                }
            }
            DurationInference::NotExtended { source, item } => {
                let pokemon = self.pokemon_mut(source)?;
                if pokemon.item.is_set(&item) && pokemon.item.len() > 1 {
                    pokemon.item.remove([item])?;
                }
            }
        }
        Ok(())
    }

    /// Refresh our team from an authoritative request
    pub fn reconcile_request(&mut self, request: &BattleRequest) -> Result<()> {
        if let Some(side_info) = &request.side
            && let Some(side) = side_info.side_id()
        {
            self.our_side = Some(side);
            let dex = Arc::clone(&self.dex);
            let team = self.team_mut(side);
            let mut nicknames = Vec::with_capacity(side_info.pokemon.len());
            for data in &side_info.pokemon {
                let ident = data
                    .ident()
                    .ok_or_else(|| BattleError::UnknownPokemon(data.ident.clone()))?;
                match team.find(&ident.name) {
                    Some(index) => {
                        if let Some(pokemon) = team.pokemon_mut(index) {
                            pokemon.update_from_request(&dex, data)?;
                        }
                    }
                    None => {
                        team.add(Pokemon::known(&dex, data)?);
                    }
                }
                nicknames.push(ident.name);
            }
            team.size = team.size.max(side_info.pokemon.len());
            team.sync_order(nicknames.iter().map(String::as_str));

            // PP of the active moves, including a transformed moveset
            if let Some(active) = request.active.as_ref().and_then(|a| a.first())
                && let Some(key) = self.active_key(side)
            {
                let moveset = self.moveset_mut(key)?;
                for slot in &active.moves {
                    let (id, _) = normalize_move_id(&slot.id);
                    if let Some(known) = moveset.get_mut(&id) {
                        known.set_pp(slot.pp);
                    }
                }
            }
        }
        self.request = Some(request.clone());
        Ok(())
    }

    /// Resolve any deferred rejections whose reasons have been decided
    pub fn settle_inferences(&mut self) -> Result<()> {
        crate::inference::settle_deferred(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LinkKind;

    fn state() -> BattleState {
        BattleState::new(Dex::gen4().unwrap())
    }

    fn ident(s: &str) -> PokemonIdent {
        PokemonIdent::parse(s).unwrap()
    }

    fn switch(state: &mut BattleState, who: &str, details: &str) -> PokemonKey {
        state
            .switch_in(
                &ident(who),
                &PokemonDetails::parse(details),
                &HpStatus::parse("100/100").unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_switch_in_introduces_and_activates() {
        let mut state = state();
        let key = switch(&mut state, "p2a: Skarmory", "Skarmory, L80, F");
        assert_eq!(state.active_key(SideId::P2), Some(key));
        assert_eq!(state.resolve(&ident("p2a: Skarmory")).unwrap(), key);
        assert!(!state.is_grounded(key).unwrap());
        assert!(state.resolve(&ident("p2a: Blissey")).is_err());
    }

    #[test]
    fn test_switch_out_clears_links() {
        let mut state = state();
        let trapper = switch(&mut state, "p2a: Dugtrio", "Dugtrio");
        let victim = switch(&mut state, "p1a: Heatran", "Heatran");
        state.links.link(LinkKind::Trap, trapper, victim);

        switch(&mut state, "p1a: Salamence", "Salamence, F");
        assert_eq!(state.links.target_of(LinkKind::Trap, trapper), None);
    }

    #[test]
    fn test_baton_pass_hands_over_links() {
        let mut state = state();
        let trapper = switch(&mut state, "p2a: Snorlax", "Snorlax");
        let passer = switch(&mut state, "p1a: Scizor", "Scizor, M");
        state.links.link(LinkKind::Trap, trapper, passer);
        state.links.link(LinkKind::LockOn, passer, trapper);

        state.team_mut(SideId::P1).status.self_switch = Some(SelfSwitchKind::CopyVolatile);
        let recipient = switch(&mut state, "p1a: Salamence", "Salamence, F");
        assert_eq!(state.links.source_of(LinkKind::Trap, recipient), Some(trapper));
        assert_eq!(state.links.target_of(LinkKind::LockOn, recipient), Some(trapper));
        assert_eq!(state.links.source_of(LinkKind::Trap, passer), None);

        state.team_mut(SideId::P1).status.self_switch = Some(SelfSwitchKind::Normal);
        switch(&mut state, "p1a: Starmie", "Starmie");
        assert_eq!(state.links.target_of(LinkKind::Trap, trapper), None);
    }

    #[test]
    fn test_roost_removes_flying() {
        let mut state = state();
        let key = switch(&mut state, "p2a: Skarmory", "Skarmory");
        state.volatile_mut(key).unwrap().roost = true;
        assert_eq!(state.types(key).unwrap(), vec![Type::Steel]);
        assert!(state.is_grounded(key).unwrap());
    }

    #[test]
    fn test_screen_expiry_removes_light_clay() {
        let mut state = state();
        let key = switch(&mut state, "p2a: Bronzong", "Bronzong");
        state
            .team_mut(SideId::P2)
            .status
            .reflect
            .start((), Some(key), Some("lightclay".to_string()), false);
        for _ in 0..4 {
            state.post_turn().unwrap();
        }
        assert!(state.pokemon(key).unwrap().item.is_set(&"lightclay".to_string()));
        state.post_turn().unwrap();
        assert!(!state.pokemon(key).unwrap().item.is_set(&"lightclay".to_string()));
    }

    #[test]
    fn test_extension_needs_a_possible_extender() {
        let mut state = state();
        let key = switch(&mut state, "p2a: Bronzong", "Bronzong");
        state.pokemon_mut(key).unwrap().item.remove(["lightclay".to_string()]).unwrap();
        let extended = || DurationInference::Extended {
            source: key,
            item: "lightclay".to_string(),
        };
        let err = state.apply_duration_inference(extended()).unwrap_err();
        assert!(matches!(err, BattleError::OverNarrowed { .. }));

        // An item received since then says nothing about the extender
        state.pokemon_mut(key).unwrap().receive_item("choicescarf");
        state.apply_duration_inference(extended()).unwrap();
        assert_eq!(state.pokemon(key).unwrap().known_item(), Some("choicescarf"));
    }

    #[test]
    fn test_first_request_creates_our_team() {
        let mut state = state();
        let request: BattleRequest = serde_json::from_str(
            r#"{"rqid":2,"active":[{"moves":[{"move":"Surf","id":"surf","pp":20,"maxpp":24}]}],
                "side":{"name":"me","id":"p1","pokemon":[
                  {"ident":"p1: Starmie","details":"Starmie, L80","condition":"211/211","active":true,
                   "stats":{"atk":180,"def":200,"spa":236,"spd":200,"spe":260},
                   "moves":["surf","thunderbolt","icebeam","recover"],"baseAbility":"naturalcure","item":"leftovers"},
                  {"ident":"p1: Scizor","details":"Scizor, L80, M","condition":"250/250","active":false,
                   "stats":{"atk":260,"def":200,"spa":120,"spd":180,"spe":150},
                   "moves":["bulletpunch","uturn","swordsdance","superpower"],"baseAbility":"technician","item":"choiceband"}]}}"#,
        )
        .unwrap();
        state.reconcile_request(&request).unwrap();
        assert_eq!(state.our_side, Some(SideId::P1));
        assert_eq!(state.team(SideId::P1).roster().len(), 2);

        let key = switch(&mut state, "p1a: Starmie", "Starmie, L80");
        state.reconcile_request(&request).unwrap();
        assert_eq!(state.moveset(key).unwrap().get("surf").unwrap().pp(), 20);
        assert!(state.is_opponent(SideId::P2));
    }
}
