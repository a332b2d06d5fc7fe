// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Event values known for each event kind.

use crate::time::TimeState;
use crate::typing::Type;

use std::collections::HashMap;

use lazy_static::lazy_static;

pub mod events {
    pub const DAMAGE: &str = "damage";
    pub const DEATH: &str = "death";
    pub const JOIN: &str = "join";
    pub const SPAWN: &str = "spawn";
    pub const MOUNT: &str = "mount";
    pub const BREED: &str = "breed";
    pub const LEVEL_CHANGE: &str = "level change";
    pub const EXPERIENCE_SPAWN: &str = "experience spawn";
    pub const EXPERIENCE_CHANGE: &str = "experience change";
    pub const BLOCK_BREAK: &str = "block break";
    pub const FISH: &str = "fish";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventValueInfo {
    pub name: &'static str,
    pub ty: Type,
    /// Snapshots the event keeps for this value.
    pub times: &'static [TimeState],
    /// Whether this value is what a bare type reference means in the event.
    pub default: bool,
}

const PRESENT: &[TimeState] = &[TimeState::Present];
const ALL_TIMES: &[TimeState] = &[TimeState::Past, TimeState::Present, TimeState::Future];

const fn value(name: &'static str, ty: Type, default: bool) -> EventValueInfo {
    EventValueInfo {
        name,
        ty,
        times: PRESENT,
        default,
    }
}

fn register(
    m: &mut HashMap<&'static str, Vec<EventValueInfo>>,
    event: &'static str,
    values: &[EventValueInfo],
) {
    m.entry(event).or_default().extend_from_slice(values);
}

#[rustfmt::skip]
lazy_static! {
    pub static ref EVENT_VALUES: HashMap<&'static str, Vec<EventValueInfo>> = {
	let mut m: HashMap<&'static str, Vec<EventValueInfo>> = HashMap::new();

	register(&mut m, events::DAMAGE, &[
	    value("victim", Type::LivingEntity, true),
	    value("attacker", Type::Entity, false),
	    EventValueInfo { name: "damage", ty: Type::Number, times: &[TimeState::Past, TimeState::Present], default: false },
	]);
	register(&mut m, events::DEATH, &[
	    value("victim", Type::LivingEntity, true),
	    value("attacker", Type::Entity, false),
	]);
	register(&mut m, events::JOIN, &[value("player", Type::Player, true)]);
	register(&mut m, events::SPAWN, &[value("entity", Type::Entity, true)]);
	register(&mut m, events::MOUNT, &[
	    value("mount", Type::Entity, false),
	    value("rider", Type::Entity, false),
	]);
	register(&mut m, events::BREED, &[
	    value("mother", Type::LivingEntity, true),
	    value("father", Type::LivingEntity, false),
	    value("breeder", Type::Player, true),
	]);
	register(&mut m, events::LEVEL_CHANGE, &[
	    value("player", Type::Player, true),
	    EventValueInfo { name: "level", ty: Type::Integer, times: ALL_TIMES, default: false },
	]);
	register(&mut m, events::EXPERIENCE_SPAWN, &[]);
	register(&mut m, events::EXPERIENCE_CHANGE, &[value("player", Type::Player, true)]);
	register(&mut m, events::BLOCK_BREAK, &[value("player", Type::Player, true)]);
	register(&mut m, events::FISH, &[value("player", Type::Player, true)]);

	m
    };
}

pub fn event_values(event: &str) -> &'static [EventValueInfo] {
    EVENT_VALUES.get(event).map(|v| v.as_slice()).unwrap_or_default()
}

pub fn lookup(event: &str, name: &str) -> Option<&'static EventValueInfo> {
    event_values(event).iter().find(|v| v.name == name)
}
