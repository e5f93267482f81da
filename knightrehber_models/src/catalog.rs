use std::collections::HashSet;

use thiserror::Error;

use crate::event::{Event, EventId, EventParseError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidEvent(#[from] EventParseError),

    #[error("Event id {0} is defined more than once")]
    DuplicateId(EventId),
}

pub struct EventDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub times: &'static [&'static str],
    pub days: Option<&'static [&'static str]>,
}

pub const KNIGHT_ONLINE_EVENTS: &[EventDefinition] = &[
    EventDefinition {
        id: "bdw",
        name: "BDW - Border Defense War",
        description: "Border Defense War",
        times: &["13:00", "19:00", "02:00"],
        days: None,
    },
    EventDefinition {
        id: "chaos",
        name: "Chaos",
        description: "Chaos War",
        times: &["00:00", "12:00"],
        days: None,
    },
    EventDefinition {
        id: "juraid",
        name: "Juraid Mountain (JR)",
        description: "Juraid Mountain event",
        times: &["07:40", "22:40"],
        days: None,
    },
    EventDefinition {
        id: "bifrost",
        name: "Bifrost",
        description: "Bifrost War",
        times: &["14:00", "21:00", "02:00"],
        days: None,
    },
    EventDefinition {
        id: "krowaz",
        name: "Krowaz",
        description: "Krowaz event",
        times: &["10:00", "21:00"],
        days: None,
    },
    EventDefinition {
        id: "lunar",
        name: "Lunar War",
        description: "Lunar War (Monday & Saturday)",
        times: &["14:00", "20:00"],
        days: Some(&["Pazartesi", "Cumartesi"]),
    },
    EventDefinition {
        id: "csw",
        name: "Castle Siege War (CSW)",
        description: "Castle Siege War (Sunday)",
        times: &["20:30"],
        days: Some(&["Pazar"]),
    },
    EventDefinition {
        id: "utc",
        name: "Under the Castle (UTC)",
        description: "Under the Castle (Friday only)",
        times: &["21:00"],
        days: Some(&["Cuma"]),
    },
    EventDefinition {
        id: "ultima",
        name: "Ultima",
        description: "Ultima event",
        times: &["10:00", "21:30"],
        days: None,
    },
    EventDefinition {
        id: "steam_bdw",
        name: "SteamKO BDW",
        description: "SteamKO Border Defense War",
        times: &["01:00", "07:00", "12:00", "16:00", "20:00"],
        days: None,
    },
    EventDefinition {
        id: "steam_chaos",
        name: "SteamKO Chaos",
        description: "SteamKO Chaos War",
        times: &["10:00", "14:00", "22:00"],
        days: None,
    },
    EventDefinition {
        id: "steam_jr",
        name: "SteamKO JR",
        description: "SteamKO Juraid Mountain",
        times: &["02:40", "13:40"],
        days: None,
    },
    EventDefinition {
        id: "steam_ft",
        name: "SteamKO Forgotten Temple (FT)",
        description: "SteamKO Forgotten Temple",
        times: &["08:00", "23:00"],
        days: None,
    },
];

/// Immutable list of the in-game events alarms can be set for.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    pub fn new(events: Vec<Event>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for event in &events {
            if !seen.insert(&event.id) {
                return Err(CatalogError::DuplicateId(event.id.clone()));
            }
        }

        Ok(Self { events })
    }

    pub fn from_definitions(definitions: &[EventDefinition]) -> Result<Self, CatalogError> {
        let events = definitions
            .iter()
            .map(|definition| {
                Event::parse(definition.id, definition.name, definition.times, definition.days)
                    .map(|event| event.with_description(definition.description))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(events)
    }

    pub fn knight_online() -> Self {
        Self::from_definitions(KNIGHT_ONLINE_EVENTS).expect("Built-in event catalog is always valid.")
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
