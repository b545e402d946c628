mod choice;

pub use choice::Choice;

/// Commands that a battling client sends to the server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /choose CHOICE|RQID
    Choose { choice: Choice, rqid: Option<u64> },

    /// /forfeit
    Forfeit,

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Choose {
                choice,
                rqid: Some(rqid),
            } => format!("/choose {}|{}", choice, rqid),
            Self::Choose { choice, rqid: None } => format!("/choose {}", choice),
            Self::Forfeit => "/forfeit".to_string(),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    pub fn choose(room_id: &str, choice: Choice, rqid: Option<u64>) -> Self {
        ClientMessage {
            room_id: Some(room_id.to_string()),
            command: ClientCommand::Choose { choice, rqid },
        }
    }

    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}
