//! Wire-compatible response types for the vprikol API.
//!
//! The API uses camelCase (and a few abbreviated) field names; every type here
//! renames them to snake_case Rust fields. Optional fields default to `None`
//! when the server omits them.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

// ── Player lookup ───────────────────────────────────────────────────

/// Correlation ticket returned by `find/createTask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    pub request_id: String,
    pub request_time: i64,
    pub queue_position: i64,
}

/// Which game-server family a player payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerVariant {
    Arizona,
    Rodina,
}

impl ServerVariant {
    /// Infer the variant from a field only that family sends.
    ///
    /// Arizona payloads carry `accountId`; Rodina payloads carry `azCoins`.
    /// Returns `None` when the payload has neither (or both).
    pub fn detect(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        match (
            object.contains_key("accountId"),
            object.contains_key("azCoins"),
        ) {
            (true, false) => Some(Self::Arizona),
            (false, true) => Some(Self::Rodina),
            _ => None,
        }
    }
}

/// Player profile on an Arizona server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArizonaPlayer {
    pub account_id: i64,
    #[serde(default)]
    pub player_id: Option<i64>,
    pub lvl: i64,
    pub cash: i64,
    pub bank: i64,
    #[serde(default)]
    pub individual_account: Option<i64>,
    pub deposit: i64,
    pub total_money: i64,
    pub is_online: bool,
    pub job_label: String,
    pub job_id: i64,
    #[serde(default)]
    pub rank_number: Option<i64>,
    #[serde(default)]
    pub rank_label: Option<String>,
    pub is_leader: bool,
    pub org_label: String,
    pub org_id: i64,
    pub vip_lvl: i64,
    pub vip_label: String,
    #[serde(default)]
    pub phone_number: Option<i64>,
    /// Unix timestamp of the last profile refresh.
    pub updated_at: i64,
    pub player_nick: String,
    pub player_server: i64,
    pub server_name: String,
}

/// Player profile on a Rodina server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RodinaPlayer {
    pub hp: i64,
    pub hunger: i64,
    pub lvl: i64,
    pub vip: String,
    pub cash: i64,
    pub bank: i64,
    pub az_coins: i64,
    pub is_leader: bool,
    pub fraction: String,
    pub rank: i64,
    pub job: String,
    pub is_online: bool,
}

/// Result of a successful player lookup.
///
/// Deserializing infers the variant with [`ServerVariant::detect`]; there is
/// no try-one-then-the-other fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlayerInfo {
    /// Boxed to reduce enum size.
    Arizona(Box<ArizonaPlayer>),
    Rodina(RodinaPlayer),
}

impl PlayerInfo {
    /// Decode a payload as a specific server variant.
    pub fn from_value_as(
        value: serde_json::Value,
        variant: ServerVariant,
    ) -> Result<Self, serde_json::Error> {
        Ok(match variant {
            ServerVariant::Arizona => Self::Arizona(Box::new(serde_json::from_value(value)?)),
            ServerVariant::Rodina => Self::Rodina(serde_json::from_value(value)?),
        })
    }

    pub fn variant(&self) -> ServerVariant {
        match self {
            Self::Arizona(_) => ServerVariant::Arizona,
            Self::Rodina(_) => ServerVariant::Rodina,
        }
    }

    pub fn lvl(&self) -> i64 {
        match self {
            Self::Arizona(p) => p.lvl,
            Self::Rodina(p) => p.lvl,
        }
    }

    pub fn is_online(&self) -> bool {
        match self {
            Self::Arizona(p) => p.is_online,
            Self::Rodina(p) => p.is_online,
        }
    }

    pub fn is_leader(&self) -> bool {
        match self {
            Self::Arizona(p) => p.is_leader,
            Self::Rodina(p) => p.is_leader,
        }
    }
}

impl<'de> Deserialize<'de> for PlayerInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let variant = ServerVariant::detect(&value).ok_or_else(|| {
            de::Error::custom("player payload has neither `accountId` nor `azCoins`")
        })?;
        Self::from_value_as(value, variant).map_err(de::Error::custom)
    }
}

// ── Faction members ─────────────────────────────────────────────────

/// One faction member, after the `players` object has been reshaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPlayer {
    /// Key of the member in the wire object.
    pub username: String,
    #[serde(default)]
    pub id: Option<i64>,
    pub is_online: bool,
    pub is_leader: bool,
    pub rank: i64,
    #[serde(default)]
    pub rank_label: Option<String>,
    #[serde(default)]
    pub ingame_id: Option<i64>,
    #[serde(default)]
    pub ping: Option<i64>,
    #[serde(default)]
    pub lvl: Option<i64>,
    #[serde(default)]
    pub color: Option<i64>,
}

/// Peak-online record for a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersRecord {
    pub count: u32,
    pub date: String,
    pub leader: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersResponse {
    #[serde(rename = "serverName")]
    pub server_label: String,
    #[serde(rename = "fractionLabel")]
    pub fraction_label: String,
    pub players: Vec<MemberPlayer>,
    pub record: MembersRecord,
    #[serde(rename = "totalPlayers")]
    pub total_players: u32,
    #[serde(rename = "totalOnline")]
    pub total_online: u32,
    #[serde(rename = "leaderNick", default)]
    pub leader_nickname: Option<String>,
    #[serde(rename = "isLeaderOnline")]
    pub is_leader_online: bool,
}

// ── Server status ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(rename = "number")]
    pub server_number: u32,
    pub ip: String,
    pub port: u16,
    #[serde(rename = "onlinePlayers")]
    pub online_players: u32,
    #[serde(rename = "maxPlayers")]
    pub max_players: u32,
    #[serde(rename = "isClosed")]
    pub is_closed: bool,
    #[serde(rename = "serverLabel")]
    pub server_label: String,
}

// ── Rating boards ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPlayer {
    pub number: i64,
    pub name: String,
    #[serde(rename = "isOnline", default)]
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingFamily {
    pub number: i64,
    pub name: String,
    pub owner: String,
    pub lvl: i64,
}

/// A rating board. Player boards fill `players`, family boards fill `families`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResponse {
    pub server: String,
    #[serde(default)]
    pub players: Option<Vec<RatingPlayer>>,
    #[serde(default)]
    pub families: Option<Vec<RatingFamily>>,
}

// ── Estate ──────────────────────────────────────────────────────────

/// A house or business listed on a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateProperty {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    /// Whether the property is currently on the state auction.
    #[serde(default)]
    pub on_auction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstateResponse {
    #[serde(rename = "serverName")]
    pub server_label: String,
    #[serde(default)]
    pub houses: Vec<EstateProperty>,
    #[serde(default)]
    pub businesses: Vec<EstateProperty>,
}

// ── Online sessions ─────────────────────────────────────────────────

/// One play session; `logout_at` is `None` while the player is still online.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineSession {
    pub login_at: i64,
    #[serde(default)]
    pub logout_at: Option<i64>,
}

impl OnlineSession {
    /// Session length in seconds, if the session has ended.
    ///
    /// `None` when the timestamps are too far apart to represent.
    pub fn duration_secs(&self) -> Option<i64> {
        self.logout_at
            .and_then(|logout| logout.checked_sub(self.login_at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineSessions {
    #[serde(rename = "nick")]
    pub nickname: String,
    #[serde(default)]
    pub sessions: Vec<OnlineSession>,
}

// ── Misc ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip: String,
    pub country: String,
    pub city: String,
    pub timezone: String,
    pub isp: String,
}

/// Verdict for one half of a role-play nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpNamePart {
    /// `true` when the part is acceptable for role-play.
    pub rp: bool,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpNicknameCheck {
    pub name: RpNamePart,
    pub surname: RpNamePart,
    #[serde(rename = "nick")]
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRpNickname {
    pub name: String,
    pub surname: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Naming tradition used by the nickname generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nation {
    Russian,
    American,
    German,
    French,
    Italian,
    Japanese,
    Latinos,
    Swedish,
    Danish,
    Romanian,
}

impl Nation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Russian => "russian",
            Self::American => "american",
            Self::German => "german",
            Self::French => "french",
            Self::Italian => "italian",
            Self::Japanese => "japanese",
            Self::Latinos => "latinos",
            Self::Swedish => "swedish",
            Self::Danish => "danish",
            Self::Romanian => "romanian",
        }
    }
}
