//! Per-room fee payment history. Read-only after seeding.

use rand::{Rng, rngs::StdRng};

use crate::application::generators::{
    format_timestamp, generate_time_range, now, pick, random_amount,
};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::FeeDetailRecord;
use crate::domain::types::FeeDetailState;

use super::locations::RoomRef;
use super::{Collection, DEFAULT_COMMUNITY_ID, Record};

const TARGET_COUNT: usize = 100;

const REMARKS: &[&str] = &["物业费", "停车费", "水费", "电费", "公摊费"];

impl Record for FeeDetailRecord {
    const ENTITY: &'static str = "fee_detail";

    fn id(&self) -> &str {
        &self.detail_id
    }
}

/// Fee id owning the detail rows of `room_id`.
pub fn fee_id_for_room(room_id: &str) -> String {
    format!("FEE_{}", room_id.trim_start_matches("ROOM_"))
}

/// Thirty-day months covered by a payment of `cycles`.
fn billing_span(cycles: u32) -> time::Duration {
    time::Duration::days(30 * i64::from(cycles))
}

#[derive(Debug, Clone, Default)]
pub struct FeeFilter {
    pub community_id: Option<String>,
    pub fee_id: Option<String>,
    pub room_id: Option<String>,
}

pub struct FeeStore {
    rows: Collection<FeeDetailRecord>,
}

impl FeeStore {
    pub fn seeded(rng: &mut StdRng, rooms: &[RoomRef]) -> Self {
        let mut rows = Collection::new();
        let anchor = rooms
            .first()
            .map(|room| room.room_id.clone())
            .unwrap_or_else(|| "ROOM_1_1_101".to_string());
        let paid_at = now() - time::Duration::days(1);

        for (index, (cycles, amount)) in [(12u32, 2_400.0), (6, 1_200.0), (1, 200.0)]
            .into_iter()
            .enumerate()
        {
            let record = FeeDetailRecord {
                detail_id: format!("DETAIL_{:03}", index + 1),
                fee_id: fee_id_for_room(&anchor),
                room_id: anchor.clone(),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
                cycles,
                receivable_amount: amount,
                received_amount: amount,
                prime_rate: "1".to_string(),
                start_time: format_timestamp(paid_at - billing_span(cycles)),
                end_time: format_timestamp(paid_at),
                state: FeeDetailState::Paid,
                state_name: FeeDetailState::Paid.label().to_string(),
                remark: "物业费".to_string(),
                create_time: paid_at - time::Duration::days(400 * index as i64),
            };
            rows.seed(record);
        }

        let mut index = rows.len();
        while rows.len() < TARGET_COUNT && !rooms.is_empty() {
            index += 1;
            let room = pick(rng, rooms);
            let cycles = *pick(rng, &[1u32, 3, 6, 12]);
            let receivable = random_amount(80.0, 300.0, rng) * f64::from(cycles);
            let receivable = (receivable * 100.0).round() / 100.0;
            let state = if rng.gen_bool(0.95) {
                FeeDetailState::Paid
            } else {
                FeeDetailState::Refunded
            };
            let create_time = generate_time_range(-720, -1, rng);
            let record = FeeDetailRecord {
                detail_id: format!("DETAIL_{index:03}"),
                fee_id: fee_id_for_room(&room.room_id),
                room_id: room.room_id.clone(),
                community_id: room.community_id.clone(),
                cycles,
                receivable_amount: receivable,
                received_amount: receivable,
                prime_rate: pick(rng, &["1", "2", "6"]).to_string(),
                start_time: format_timestamp(create_time - billing_span(cycles)),
                end_time: format_timestamp(create_time),
                state,
                state_name: state.label().to_string(),
                remark: pick(rng, REMARKS).to_string(),
                create_time,
            };
            if !rows.seed(record) {
                break;
            }
        }

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Newest payment first.
    pub fn list(&self, filter: &FeeFilter, page: PageRequest) -> PageSlice<FeeDetailRecord> {
        self.rows
            .query()
            .eq(filter.community_id.as_deref(), |f| f.community_id.as_str())
            .eq(filter.fee_id.as_deref(), |f| f.fee_id.as_str())
            .eq(filter.room_id.as_deref(), |f| f.room_id.as_str())
            .sort_desc_by(|f| f.create_time)
            .paginate(page)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::application::store::locations::LocationStore;

    fn store() -> FeeStore {
        let mut rng = StdRng::seed_from_u64(8);
        let rooms = LocationStore::seeded(&mut rng).room_refs();
        FeeStore::seeded(&mut rng, &rooms)
    }

    #[test]
    fn pads_to_target() {
        assert_eq!(store().len(), TARGET_COUNT);
    }

    #[test]
    fn fee_filter_selects_room_history_newest_first() {
        let store = store();
        let filter = FeeFilter {
            fee_id: Some(fee_id_for_room("ROOM_1_1_101")),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 50));
        assert!(page.total >= 3);
        assert!(page.list.iter().all(|f| f.room_id == "ROOM_1_1_101"));
        assert!(
            page.list
                .windows(2)
                .all(|pair| pair[0].create_time >= pair[1].create_time)
        );
    }

    #[test]
    fn unknown_fee_yields_empty_page() {
        let store = store();
        let filter = FeeFilter {
            fee_id: Some("FEE_NOPE".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 50));
        assert_eq!(page.total, 0);
        assert!(page.list.is_empty());
    }
}
