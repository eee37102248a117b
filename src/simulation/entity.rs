//! Entities placed on the simulation map
//!
//! Base stations and users. Both are stored as graph payloads and are
//! addressed by their [`Key`].

use std::fmt::Write;

use super::key::Key;

/// A base station serving nearby users
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStation {
    pub key: Key,
}

impl BaseStation {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

/// A mobile user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub key: Key,
    /// Bandwidth the user asks of its station
    pub signal_demand: u32,
    /// The station currently serving this user, if any is in range
    pub assigned_station: Option<Key>,
}

impl User {
    pub fn new(key: Key, signal_demand: u32) -> Self {
        Self {
            key,
            signal_demand,
            assigned_station: None,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Attribute lines written after the user's position in a model file.
    /// Every line is indented by two spaces and newline terminated.
    pub fn attributes_to_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "  demand : {}", self.signal_demand);
        match self.assigned_station {
            Some(station) => {
                let _ = writeln!(out, "  station : {}", station);
            }
            None => out.push_str("  station : none\n"),
        }
        out
    }
}

/// Payload of a simulation graph vertex
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    BaseStation(BaseStation),
    User(User),
}

impl Entity {
    pub fn key(&self) -> Key {
        match self {
            Entity::BaseStation(station) => station.key,
            Entity::User(user) => user.key,
        }
    }

    pub fn as_base_station(&self) -> Option<&BaseStation> {
        match self {
            Entity::BaseStation(station) => Some(station),
            Entity::User(_) => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Entity::User(user) => Some(user),
            Entity::BaseStation(_) => None,
        }
    }

    pub fn as_user_mut(&mut self) -> Option<&mut User> {
        match self {
            Entity::User(user) => Some(user),
            Entity::BaseStation(_) => None,
        }
    }
}
