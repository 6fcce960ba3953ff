// Network profile: public identity and links of a contributor network.

use serde::{Deserialize, Serialize};

pub const DOCUMENT_TYPE: &str = "docket/network-profile";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkCategory {
    Defi,
    Oss,
    Infrastructure,
    Research,
    Community,
    Engineering,
    Marketing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkProfileState {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub logo_big: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub category: Vec<NetworkCategory>,
    pub x: Option<String>,
    pub github: Option<String>,
    pub discord: Option<String>,
    pub youtube: Option<String>,
}

// ── Action schema ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetNameInput {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetIconInput {
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetLogoInput {
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetLogoBigInput {
    #[serde(default)]
    pub logo_big: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetWebsiteInput {
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetDescriptionInput {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetCategoryInput {
    #[serde(default)]
    pub category: Vec<NetworkCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetXInput {
    #[serde(default)]
    pub x: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetGithubInput {
    #[serde(default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetDiscordInput {
    #[serde(default)]
    pub discord: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetYoutubeInput {
    #[serde(default)]
    pub youtube: Option<String>,
}

/// Every operation a network profile document accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkProfileAction {
    SetProfileName(SetNameInput),
    SetIcon(SetIconInput),
    SetLogo(SetLogoInput),
    SetLogoBig(SetLogoBigInput),
    SetWebsite(SetWebsiteInput),
    SetDescription(SetDescriptionInput),
    SetCategory(SetCategoryInput),
    SetX(SetXInput),
    SetGithub(SetGithubInput),
    SetDiscord(SetDiscordInput),
    SetYoutube(SetYoutubeInput),
}

pub const OPERATIONS: &[&str] = &[
    "SET_PROFILE_NAME",
    "SET_ICON",
    "SET_LOGO",
    "SET_LOGO_BIG",
    "SET_WEBSITE",
    "SET_DESCRIPTION",
    "SET_CATEGORY",
    "SET_X",
    "SET_GITHUB",
    "SET_DISCORD",
    "SET_YOUTUBE",
];
