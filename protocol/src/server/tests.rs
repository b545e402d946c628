#[cfg(test)]
mod tests {
    use crate::{
        BattleEvent, BoostStat, Choice, ClientMessage, Effect, ServerLine, SideId,
        parse_server_frame, parse_server_line,
    };

    fn event(line: &str) -> BattleEvent {
        match parse_server_line(line).unwrap() {
            Some(ServerLine::Event(event)) => event,
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_move_with_tags() {
        let parsed = event("|move|p1a: Garchomp|Earthquake|p2a: Bronzong|[miss]");
        match parsed {
            BattleEvent::Move {
                user,
                move_name,
                target,
                miss,
                ..
            } => {
                assert_eq!(user.name, "Garchomp");
                assert_eq!(move_name, "Earthquake");
                assert_eq!(target.unwrap().side, SideId::P2);
                assert!(miss);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_heal_from_item() {
        let parsed = event("|-heal|p2a: Snorlax|56/100|[from] item: Leftovers");
        match parsed {
            BattleEvent::Heal { hp, from, .. } => {
                assert_eq!(hp.current, 56);
                assert_eq!(from, Some(Effect::Item("Leftovers".to_string())));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_weather_end_and_upkeep() {
        assert!(matches!(
            event("|-weather|none"),
            BattleEvent::Weather { weather: None, .. }
        ));
        assert!(matches!(
            event("|-weather|RainDance|[upkeep]"),
            BattleEvent::Weather { upkeep: true, .. }
        ));
    }

    #[test]
    fn test_parse_boost() {
        let parsed = event("|-unboost|p1a: Scizor|atk|1");
        assert!(matches!(
            parsed,
            BattleEvent::Unboost {
                stat: BoostStat::Atk,
                amount: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_activate_without_pokemon() {
        match event("|-activate||move: Trick|[of] p2a: Starmie") {
            BattleEvent::Activate { ident, effect, of, .. } => {
                assert!(ident.is_none());
                assert_eq!(effect, Effect::Move("Trick".to_string()));
                assert_eq!(of.unwrap().name, "Starmie");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_skipped_and_error_lines() {
        assert_eq!(parse_server_line("|j|somebody").unwrap(), None);
        assert_eq!(parse_server_line("|").unwrap(), None);
        assert_eq!(
            parse_server_line("|error|[Invalid choice] Can't switch: trapped").unwrap(),
            Some(ServerLine::Error(
                "[Invalid choice] Can't switch: trapped".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_unknown_tag() {
        let result = parse_server_line("|someunknown|data");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_frame_with_request() {
        let frame = concat!(
            ">battle-gen4randombattle-1\n",
            "|request|{\"rqid\":3,\"wait\":true,\"side\":{\"name\":\"me\",\"id\":\"p1\",\"pokemon\":[]}}\n",
        );
        let parsed = parse_server_frame(frame).unwrap();
        assert_eq!(parsed.room_id.as_deref(), Some("battle-gen4randombattle-1"));
        match parsed.events().next() {
            Some(BattleEvent::Request(request)) => {
                assert_eq!(request.rqid, Some(3));
                assert!(request.wait);
                assert_eq!(request.side_id(), Some(SideId::P1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_choose_wire_format() {
        let message = ClientMessage::choose("battle-1", Choice::Move(2), Some(7));
        assert_eq!(message.to_wire_format(), "battle-1|/choose move 2|7");
    }
}
