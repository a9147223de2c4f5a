//! Named top-level views.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed set of views the router can show.
///
/// Views are selected by state, not by URL; the current one is persisted by
/// name while a session is active.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum View {
    #[default]
    Home,
    Profile,
    EditProfile,
    Uploads,
    Schedule,
    Chat,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Profile => "Medical profile",
            Self::EditProfile => "Edit profile",
            Self::Uploads => "Uploads",
            Self::Schedule => "Medication schedule",
            Self::Chat => "Chat",
        }
    }

    pub fn names() -> Vec<String> {
        Self::iter().map(|view| view.to_string()).collect()
    }
}
