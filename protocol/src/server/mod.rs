mod tests;

pub mod battle;
pub mod battle_init;
pub mod battle_major;
pub mod battle_minor;
pub mod battle_progress;
pub mod event;
pub mod request;

use crate::ParseError;
use anyhow::Result;
use event::BattleEvent;

/// Room lines that carry no battle information
const SKIPPED_TAGS: &[&str] = &[
    "init",
    "title",
    "j",
    "J",
    "l",
    "L",
    "n",
    "N",
    "c",
    "c:",
    "chat",
    "raw",
    "html",
    "uhtml",
    "uhtmlchange",
    "t:",
    "gametype",
    "tier",
    "rule",
    "rated",
    "seed",
    "timer",
    "inactive",
    "inactiveoff",
    "debug",
    "badge",
    "teampreview",
    "clearpoke",
    "poke",
    "split",
    "-anim",
];

/// A parsed line of a battle room
#[derive(Debug, Clone, PartialEq)]
pub enum ServerLine {
    Event(BattleEvent),
    /// |error|TEXT, usually a rejected choice
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub lines: Vec<ServerLine>,
}

impl ServerFrame {
    /// Battle events of this frame, in order
    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        self.lines.iter().filter_map(|line| match line {
            ServerLine::Event(event) => Some(event),
            ServerLine::Error(_) => None,
        })
    }
}

/// Parse a complete WebSocket frame into structured lines
pub fn parse_server_frame(frame: &str) -> Result<ServerFrame> {
    let mut lines = frame.lines();
    let mut room_id = None;

    // Check if first line is >ROOMID
    if let Some(first_line) = lines.clone().next()
        && let Some(room) = first_line.strip_prefix('>')
    {
        room_id = Some(room.trim().to_string());
        lines.next();
    }

    let mut parsed = Vec::new();
    for line in lines {
        if let Some(line) = parse_server_line(line)? {
            parsed.push(line);
        }
    }

    Ok(ServerFrame {
        room_id,
        lines: parsed,
    })
}

/// Parse a single battle-room line. Known non-battle lines yield `None`;
/// unknown tags are an error.
pub fn parse_server_line(line: &str) -> Result<Option<ServerLine>> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.is_empty() || line == "|" {
        return Ok(None);
    }

    let Some(body) = line.strip_prefix('|') else {
        // Plain text lines are room log output
        return Ok(None);
    };

    let parts: Vec<&str> = line.split('|').collect();
    let tag = parts.get(1).copied().unwrap_or_default();

    if SKIPPED_TAGS.contains(&tag) {
        return Ok(None);
    }
    if tag == "error" {
        let text = body.strip_prefix("error|").unwrap_or_default();
        return Ok(Some(ServerLine::Error(text.to_string())));
    }
    if tag == "request" {
        return Ok(battle_progress::parse_request(&parts)?.map(ServerLine::Event));
    }

    parse_battle_event(tag, &parts).map(|event| Some(ServerLine::Event(event)))
}

fn parse_battle_event(tag: &str, parts: &[&str]) -> Result<BattleEvent> {
    match tag {
        "player" => battle_init::parse_player(parts),
        "teamsize" => battle_init::parse_teamsize(parts),
        "gen" => battle_init::parse_gen(parts),
        "start" => Ok(BattleEvent::Start),
        "turn" => battle_progress::parse_turn(parts),
        "upkeep" => battle_progress::parse_upkeep(parts),
        "win" => battle_progress::parse_win(parts),
        "tie" => battle_progress::parse_tie(parts),
        "move" => battle_major::parse_move(parts),
        "switch" => battle_major::parse_switch(parts),
        "drag" => battle_major::parse_drag(parts),
        "detailschange" => battle_major::parse_detailschange(parts),
        "-formechange" => battle_major::parse_formechange(parts),
        "cant" => battle_major::parse_cant(parts),
        "faint" => battle_major::parse_faint(parts),
        "-fail" => battle_minor::parse_fail(parts),
        "-block" => battle_minor::parse_block(parts),
        "-notarget" => battle_minor::parse_notarget(parts),
        "-miss" => battle_minor::parse_miss(parts),
        "-damage" => battle_minor::parse_damage(parts),
        "-heal" => battle_minor::parse_heal(parts),
        "-sethp" => battle_minor::parse_sethp(parts),
        "-status" => battle_minor::parse_status(parts),
        "-curestatus" => battle_minor::parse_curestatus(parts),
        "-cureteam" => battle_minor::parse_cureteam(parts),
        "-boost" => battle_minor::parse_boost(parts),
        "-unboost" => battle_minor::parse_unboost(parts),
        "-setboost" => battle_minor::parse_setboost(parts),
        "-swapboost" => battle_minor::parse_swapboost(parts),
        "-invertboost" => battle_minor::parse_invertboost(parts),
        "-clearboost" => battle_minor::parse_clearboost(parts),
        "-clearallboost" => battle_minor::parse_clearallboost(parts),
        "-clearpositiveboost" => battle_minor::parse_clearpositiveboost(parts),
        "-clearnegativeboost" => battle_minor::parse_clearnegativeboost(parts),
        "-copyboost" => battle_minor::parse_copyboost(parts),
        "-weather" => battle_minor::parse_weather(parts),
        "-fieldstart" => battle_minor::parse_fieldstart(parts),
        "-fieldend" => battle_minor::parse_fieldend(parts),
        "-sidestart" => battle_minor::parse_sidestart(parts),
        "-sideend" => battle_minor::parse_sideend(parts),
        "-start" => battle_minor::parse_start(parts),
        "-end" => battle_minor::parse_end(parts),
        "-crit" => battle_minor::parse_crit(parts),
        "-supereffective" => battle_minor::parse_supereffective(parts),
        "-resisted" => battle_minor::parse_resisted(parts),
        "-immune" => battle_minor::parse_immune(parts),
        "-item" => battle_minor::parse_item(parts),
        "-enditem" => battle_minor::parse_enditem(parts),
        "-ability" => battle_minor::parse_ability(parts),
        "-endability" => battle_minor::parse_endability(parts),
        "-transform" => battle_minor::parse_transform(parts),
        "-activate" => battle_minor::parse_activate(parts),
        "-fieldactivate" => battle_minor::parse_fieldactivate(parts),
        "-hint" => battle_minor::parse_hint(parts),
        "-center" => battle_minor::parse_center(parts),
        "-message" => battle_minor::parse_message(parts),
        "-prepare" => battle_minor::parse_prepare(parts),
        "-mustrecharge" => battle_minor::parse_mustrecharge(parts),
        "-nothing" => battle_minor::parse_nothing(parts),
        "-hitcount" => battle_minor::parse_hitcount(parts),
        "-singlemove" => battle_minor::parse_singlemove(parts),
        "-singleturn" => battle_minor::parse_singleturn(parts),
        "-ohko" => battle_minor::parse_ohko(parts),
        "" => Err(ParseError::EmptyMessage.into()),
        other => Err(ParseError::UnknownTag(other.to_string()).into()),
    }
}
