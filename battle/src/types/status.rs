//! Non-volatile status conditions

/// Major status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorStatus {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Toxic,
    Sleep,
}

impl MajorStatus {
    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(MajorStatus::Burn),
            "frz" => Some(MajorStatus::Freeze),
            "par" => Some(MajorStatus::Paralysis),
            "psn" => Some(MajorStatus::Poison),
            "tox" => Some(MajorStatus::Toxic),
            "slp" => Some(MajorStatus::Sleep),
            _ => None,
        }
    }

    /// Convert to protocol format
    pub fn to_protocol(&self) -> &'static str {
        match self {
            MajorStatus::Burn => "brn",
            MajorStatus::Freeze => "frz",
            MajorStatus::Paralysis => "par",
            MajorStatus::Poison => "psn",
            MajorStatus::Toxic => "tox",
            MajorStatus::Sleep => "slp",
        }
    }

    /// Maximum turns the status can last before it must end, if bounded
    pub fn max_duration(&self) -> Option<u32> {
        match self {
            // Gen 4 sleep lasts 1-4 turns
            MajorStatus::Sleep => Some(4),
            // Toxic damage counter caps at 15/16
            MajorStatus::Toxic => Some(15),
            _ => None,
        }
    }
}

impl std::fmt::Display for MajorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_protocol())
    }
}
