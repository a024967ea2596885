//! Building (floor) / unit / room selectors. Read-only after seeding.

use rand::{Rng, rngs::StdRng};

use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::{FloorRecord, RoomRecord, UnitRecord};

use super::{Collection, DEFAULT_COMMUNITY_ID, Record};

const FLOOR_COUNT: u32 = 3;
const UNITS_PER_FLOOR: u32 = 2;
const LAYERS_PER_UNIT: u32 = 3;
const ROOMS_PER_LAYER: u32 = 2;

impl Record for FloorRecord {
    const ENTITY: &'static str = "floor";

    fn id(&self) -> &str {
        &self.floor_id
    }
}

impl Record for UnitRecord {
    const ENTITY: &'static str = "unit";

    fn id(&self) -> &str {
        &self.unit_id
    }
}

impl Record for RoomRecord {
    const ENTITY: &'static str = "room";

    fn id(&self) -> &str {
        &self.room_id
    }
}

/// Minimal room reference handed to stores that point at rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRef {
    pub room_id: String,
    pub room_name: String,
    pub community_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct FloorFilter {
    pub community_id: Option<String>,
    pub floor_num: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub community_id: Option<String>,
    pub floor_id: Option<String>,
    pub unit_id: Option<String>,
    pub room_num: Option<String>,
    pub state: Option<String>,
}

pub struct LocationStore {
    floors: Collection<FloorRecord>,
    units: Collection<UnitRecord>,
    rooms: Collection<RoomRecord>,
}

impl LocationStore {
    pub fn seeded(rng: &mut StdRng) -> Self {
        let mut floors = Collection::new();
        let mut units = Collection::new();
        let mut rooms = Collection::new();

        for floor in 1..=FLOOR_COUNT {
            let floor_id = format!("FLOOR_{floor:03}");
            floors.seed(FloorRecord {
                floor_id: floor_id.clone(),
                floor_num: floor.to_string(),
                floor_name: format!("{floor}栋"),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
            });

            for unit in 1..=UNITS_PER_FLOOR {
                let unit_id = format!("UNIT_{floor}_{unit}");
                units.seed(UnitRecord {
                    unit_id: unit_id.clone(),
                    floor_id: floor_id.clone(),
                    unit_num: unit.to_string(),
                    layer_count: LAYERS_PER_UNIT,
                    community_id: DEFAULT_COMMUNITY_ID.to_string(),
                });

                for layer in 1..=LAYERS_PER_UNIT {
                    for seat in 1..=ROOMS_PER_LAYER {
                        let room_num = format!("{layer}{seat:02}");
                        let occupied = rng.gen_bool(0.8);
                        rooms.seed(RoomRecord {
                            room_id: format!("ROOM_{floor}_{unit}_{room_num}"),
                            unit_id: unit_id.clone(),
                            floor_id: floor_id.clone(),
                            room_name: format!("{floor}-{unit}-{room_num}"),
                            room_num,
                            layer,
                            built_up_area: f64::from(rng.gen_range(8_000..14_000u32)) / 100.0,
                            state: if occupied { "2001" } else { "2002" }.to_string(),
                            community_id: DEFAULT_COMMUNITY_ID.to_string(),
                        });
                    }
                }
            }
        }

        Self {
            floors,
            units,
            rooms,
        }
    }

    pub fn room_refs(&self) -> Vec<RoomRef> {
        self.rooms
            .iter()
            .map(|room| RoomRef {
                room_id: room.room_id.clone(),
                room_name: room.room_name.clone(),
                community_id: room.community_id.clone(),
            })
            .collect()
    }

    pub fn list_floors(&self, filter: &FloorFilter, page: PageRequest) -> PageSlice<FloorRecord> {
        self.floors
            .query()
            .eq(filter.community_id.as_deref(), |f| f.community_id.as_str())
            .eq(filter.floor_num.as_deref(), |f| f.floor_num.as_str())
            .paginate(page)
    }

    pub fn list_units(&self, floor_id: &str, community_id: Option<&str>) -> Vec<UnitRecord> {
        self.units
            .query()
            .eq(Some(floor_id), |u| u.floor_id.as_str())
            .eq(community_id, |u| u.community_id.as_str())
            .collect()
    }

    pub fn list_rooms(&self, filter: &RoomFilter, page: PageRequest) -> PageSlice<RoomRecord> {
        self.rooms
            .query()
            .eq(filter.community_id.as_deref(), |r| r.community_id.as_str())
            .eq(filter.floor_id.as_deref(), |r| r.floor_id.as_str())
            .eq(filter.unit_id.as_deref(), |r| r.unit_id.as_str())
            .eq(filter.state.as_deref(), |r| r.state.as_str())
            .keyword(filter.room_num.as_deref(), |r| [r.room_num.as_str()])
            .paginate(page)
    }

    pub fn get_room(&self, room_id: &str) -> Option<RoomRecord> {
        self.rooms.get(room_id).cloned()
    }

    pub fn floor_exists(&self, floor_id: &str) -> bool {
        self.floors.contains(floor_id)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn store() -> LocationStore {
        LocationStore::seeded(&mut StdRng::seed_from_u64(5))
    }

    #[test]
    fn hierarchy_sizes() {
        let store = store();
        let floors = store.list_floors(&FloorFilter::default(), PageRequest::new(1, 50));
        assert_eq!(floors.total, FLOOR_COUNT as usize);
        assert_eq!(store.list_units("FLOOR_001", None).len(), UNITS_PER_FLOOR as usize);
        assert_eq!(
            store.room_refs().len(),
            (FLOOR_COUNT * UNITS_PER_FLOOR * LAYERS_PER_UNIT * ROOMS_PER_LAYER) as usize
        );
    }

    #[test]
    fn rooms_filter_by_unit_and_number() {
        let store = store();
        let filter = RoomFilter {
            unit_id: Some("UNIT_2_1".to_string()),
            room_num: Some("30".to_string()),
            ..Default::default()
        };
        let rooms = store.list_rooms(&filter, PageRequest::new(1, 50));
        let names: Vec<&str> = rooms.list.iter().map(|r| r.room_name.as_str()).collect();
        assert_eq!(names, ["2-1-301", "2-1-302"]);
    }

    #[test]
    fn unknown_parent_yields_empty_list() {
        let store = store();
        assert!(store.list_units("FLOOR_404", None).is_empty());
        assert!(!store.floor_exists("FLOOR_404"));
        assert!(store.get_room("ROOM_1_1_101").is_some());
    }
}
