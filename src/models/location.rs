//! Sites and meeting rooms.

use serde::{Deserialize, Serialize};

use super::{LocationId, RoomId};

/// A site where meetings can take place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier.
    pub id: LocationId,
    /// Human-readable name.
    pub name: String,
    /// Rooms at this site, in input order.
    pub rooms: Vec<RoomId>,
}

impl Location {
    /// Creates a location with no rooms.
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rooms: Vec::new(),
        }
    }

    /// Whether any room belongs to this location.
    pub fn has_rooms(&self) -> bool {
        !self.rooms.is_empty()
    }
}

/// A meeting room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Human-readable name.
    pub name: String,
    /// Site the room belongs to.
    pub location: LocationId,
    /// Number of seats.
    pub capacity: i64,
    /// Whether the room has video-conferencing equipment.
    pub video: bool,
}

impl Room {
    /// Creates a room without video equipment.
    pub fn new(id: RoomId, location: LocationId, capacity: i64) -> Self {
        Self {
            id,
            name: String::new(),
            location,
            capacity,
            video: false,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the video-conferencing flag.
    pub fn with_video(mut self, video: bool) -> Self {
        self.video = video;
        self
    }
}
