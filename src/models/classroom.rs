//! Classroom model.

use serde::{Deserialize, Serialize};

use super::{ClassroomId, DepartmentId};

/// A room that classes can be held in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique room identifier.
    pub id: ClassroomId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Seats.
    #[serde(default)]
    pub capacity: u32,
    /// Room classification.
    #[serde(alias = "type")]
    pub room_type: RoomType,
    /// Owning department.
    pub department_id: DepartmentId,
}

/// Room classification.
///
/// Theory subjects go to `Classroom` rooms, lab subjects to `Lab` rooms.
/// Other room kinds are never picked by the scheduler.
///
/// Serialized as a plain string; anything other than `CLASSROOM` or `LAB`
/// loads as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomType {
    /// Lecture room.
    Classroom,
    /// Laboratory.
    Lab,
    /// Domain-specific room kind (seminar hall, auditorium, ...).
    Custom(String),
}

impl From<String> for RoomType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CLASSROOM" => RoomType::Classroom,
            "LAB" => RoomType::Lab,
            _ => RoomType::Custom(s),
        }
    }
}

impl From<RoomType> for String {
    fn from(t: RoomType) -> Self {
        match t {
            RoomType::Classroom => "CLASSROOM".to_string(),
            RoomType::Lab => "LAB".to_string(),
            RoomType::Custom(s) => s,
        }
    }
}

impl Classroom {
    /// Creates a new room.
    pub fn new(id: ClassroomId, department_id: DepartmentId, room_type: RoomType) -> Self {
        Self {
            id,
            name: String::new(),
            capacity: 0,
            room_type,
            department_id,
        }
    }

    /// Creates a lecture room.
    pub fn classroom(id: ClassroomId, department_id: DepartmentId) -> Self {
        Self::new(id, department_id, RoomType::Classroom)
    }

    /// Creates a lab.
    pub fn lab(id: ClassroomId, department_id: DepartmentId) -> Self {
        Self::new(id, department_id, RoomType::Lab)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seat count.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builders() {
        let c = Classroom::classroom(1, 5).with_name("A-101").with_capacity(60);
        assert_eq!(c.room_type, RoomType::Classroom);
        assert_eq!(c.capacity, 60);

        let l = Classroom::lab(2, 5);
        assert_eq!(l.room_type, RoomType::Lab);
    }

    #[test]
    fn test_room_type_alias() {
        let json = r#"{"id":4,"type":"LAB","department_id":1}"#;
        let c: Classroom = serde_json::from_str(json).unwrap();
        assert_eq!(c.room_type, RoomType::Lab);
    }

    #[test]
    fn test_custom_room_type_from_plain_string() {
        let json = r#"{"id":9,"department_id":1,"type":"SEMINAR"}"#;
        let c: Classroom = serde_json::from_str(json).unwrap();
        assert_eq!(c.room_type, RoomType::Custom("SEMINAR".into()));

        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["room_type"], "SEMINAR");
    }
}
