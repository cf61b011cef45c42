use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(PlayerId);

/// Live on/off status per player. Absent ids are inactive.
pub type ActiveStatusMap = BTreeMap<PlayerId, bool>;

/// Newest-first history of status changes.
pub type ActionLog = Vec<LogEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub number: i64,
    pub subject: String,
    pub team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl Action {
    pub fn from_status(active: bool) -> Self {
        if active {
            Self::On
        } else {
            Self::Off
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ON" => Some(Self::On),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier carried by a log row. Recorded rows point at a roster player;
/// imported rows carry whatever key the file supplied or a synthesized one,
/// which is never checked against the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Roster(PlayerId),
    Imported(String),
}

impl EntryId {
    /// `"{number}_{time}"`, with absent parts left empty.
    pub fn fallback(number: Option<&str>, time: Option<&str>) -> Self {
        Self::Imported(format!(
            "{}_{}",
            number.unwrap_or_default(),
            time.unwrap_or_default()
        ))
    }

}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roster(id) => write!(f, "{id}"),
            Self::Imported(key) => f.write_str(key),
        }
    }
}

/// Jersey number on a log row. Recorded rows keep the roster's integer so the
/// stored JSON carries a number; imported rows keep the file's text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum JerseyNumber {
    Int(i64),
    Text(String),
}

impl fmt::Display for JerseyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(number) => fmt::Display::fmt(number, f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for JerseyNumber {
    fn from(number: i64) -> Self {
        Self::Int(number)
    }
}

impl From<String> for JerseyNumber {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// Other scalars written by hand-edited state load as their text.
impl<'de> Deserialize<'de> for JerseyNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Int(i64),
            Text(String),
            Float(f64),
            Bool(bool),
        }

        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Int(number) => Self::Int(number),
            Scalar::Text(text) => Self::Text(text),
            Scalar::Float(value) => Self::Text(value.to_string()),
            Scalar::Bool(value) => Self::Text(value.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "playerId")]
    pub player_id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<JerseyNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl LogEntry {
    pub fn recorded(player: &Player, action: Action, time: impl Into<String>) -> Self {
        Self {
            player_id: EntryId::Roster(player.id),
            number: Some(JerseyNumber::Int(player.number)),
            subject: Some(player.subject.clone()),
            action: Some(action.as_str().to_string()),
            time: Some(time.into()),
        }
    }

    /// `None` when the action text is absent or not one of `ON`/`OFF`.
    pub fn parsed_action(&self) -> Option<Action> {
        self.action.as_deref().and_then(Action::parse)
    }
}

/// Sensor reading from an impact export. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactLogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "playerId")]
    pub player_id: EntryId,
}
