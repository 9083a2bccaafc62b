//! Lock entities: hood, all doors and the four side doors

use fcon_core::{DoorPosition, VehicleData};

use super::{unique_id, EntityReading, VehicleEntity};
use crate::setup::ConfigEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Hood,
    AllDoors,
    Door(DoorPosition),
}

impl LockKind {
    pub fn name(self) -> String {
        match self {
            LockKind::Hood => "Hood".to_string(),
            LockKind::AllDoors => "All Doors".to_string(),
            LockKind::Door(position) => format!("Door: {}", position.label()),
        }
    }
}

pub struct VehicleLock {
    kind: LockKind,
    name: String,
    unique_id: String,
    is_locked: Option<bool>,
    is_open: Option<bool>,
}

impl VehicleLock {
    pub fn new(entry: &ConfigEntry, kind: LockKind) -> Self {
        let name = kind.name();
        Self {
            kind,
            unique_id: unique_id(entry, &name),
            name,
            is_locked: None,
            is_open: None,
        }
    }

    pub fn is_locked(&self) -> Option<bool> {
        self.is_locked
    }

    pub fn is_open(&self) -> Option<bool> {
        self.is_open
    }
}

impl VehicleEntity for VehicleLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn handle_coordinator_update(&mut self, data: &VehicleData) {
        match self.kind {
            LockKind::Hood => self.is_open = Some(data.hood_status != "CLOSED"),
            LockKind::AllDoors => self.is_locked = Some(data.doors.all_doors_locked),
            LockKind::Door(position) => {
                self.is_locked = Some(data.doors.all_doors_locked);
                self.is_open = Some(!data.doors.get(position).closed);
            }
        }
    }

    fn reading(&self) -> EntityReading {
        EntityReading::Lock {
            is_locked: self.is_locked,
            is_open: self.is_open,
        }
    }
}

pub fn entities(entry: &ConfigEntry) -> Vec<VehicleLock> {
    let mut locks = vec![
        VehicleLock::new(entry, LockKind::Hood),
        VehicleLock::new(entry, LockKind::AllDoors),
    ];
    locks.extend(
        DoorPosition::SIDE_DOORS
            .iter()
            .map(|position| VehicleLock::new(entry, LockKind::Door(*position))),
    );
    locks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_data;

    fn lock(kind: LockKind) -> VehicleLock {
        VehicleLock::new(&ConfigEntry::new("e1", "VIN"), kind)
    }

    #[test]
    fn test_hood_open_unless_closed() {
        let mut hood = lock(LockKind::Hood);
        let mut data = sample_data();
        hood.handle_coordinator_update(&data);
        assert_eq!(hood.is_open(), Some(false));
        assert_eq!(hood.is_locked(), None);

        data.hood_status = "AJAR".to_string();
        hood.handle_coordinator_update(&data);
        assert_eq!(hood.is_open(), Some(true));
    }

    #[test]
    fn test_door_uses_all_doors_lock_state() {
        let mut door = lock(LockKind::Door(DoorPosition::RearLeft));
        let mut data = sample_data();
        door.handle_coordinator_update(&data);
        assert_eq!(door.is_locked(), Some(true));
        // Reference payload reports the rear left door ajar
        assert_eq!(door.is_open(), Some(true));

        data.doors.all_doors_locked = false;
        data.doors.rear_left.closed = true;
        door.handle_coordinator_update(&data);
        assert_eq!(door.is_locked(), Some(false));
        assert_eq!(door.is_open(), Some(false));
    }

    #[test]
    fn test_names() {
        let names: Vec<String> = entities(&ConfigEntry::new("e1", "VIN"))
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Hood",
                "All Doors",
                "Door: Front Left",
                "Door: Front Right",
                "Door: Rear Left",
                "Door: Rear Right"
            ]
        );
    }
}
