//! Property applications (room discount requests) with their tracking
//! records and the media attached to each record.
//!
//! The three collections share one lock so that a cascade is never
//! observable half-applied.

use rand::{Rng, rngs::StdRng};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::generators::{
    format_timestamp, generate_time_range, generate_unique_id, now, pick, random_name,
    random_phone,
};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::{ApplyRecordDetail, ApplyRecordEntry, ApplyRoomRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{ApplyState, MediaType};

use super::fees::fee_id_for_room;
use super::locations::RoomRef;
use super::{Collection, DEFAULT_COMMUNITY_ID, InsertAt, Record};

const TARGET_COUNT: usize = 20;
const APPLICATION_PREFIX: &str = "ARD";
const RECORD_PREFIX: &str = "ARDR";
const DETAIL_PREFIX: &str = "ARDRD";
const INSPECTION_UPLOADS: &str = "/static/uploads/inspection";

const APPLY_TYPES: &[(&str, &str)] = &[
    ("1001", "空置房减免"),
    ("1002", "装修期减免"),
    ("1003", "困难住户减免"),
];

/// Display name of an apply type code; unknown codes fall back to the code.
pub fn apply_type_name(code: &str) -> String {
    APPLY_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

impl Record for ApplyRoomRecord {
    const ENTITY: &'static str = "apply_room_discount";

    fn id(&self) -> &str {
        &self.ard_id
    }
}

impl Record for ApplyRecordEntry {
    const ENTITY: &'static str = "apply_room_discount_record";

    fn id(&self) -> &str {
        &self.ardr_id
    }
}

impl Record for ApplyRecordDetail {
    const ENTITY: &'static str = "apply_room_discount_record_detail";

    fn id(&self) -> &str {
        &self.ardrd_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplyRoomFilter {
    pub community_id: Option<String>,
    pub ard_id: Option<String>,
    pub room_id: Option<String>,
    pub state: Option<String>,
    pub apply_type: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplyRoom {
    pub room_id: String,
    pub room_name: String,
    pub apply_type: String,
    pub start_time: String,
    pub end_time: String,
    pub create_user_name: String,
    pub create_user_tel: String,
    pub discount_type: Option<String>,
    pub create_remark: Option<String>,
    pub fee_id: Option<String>,
    pub community_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyRoomPatch {
    pub state: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub discount_type: Option<String>,
    pub create_remark: Option<String>,
    pub check_remark: Option<String>,
    pub review_remark: Option<String>,
    pub fee_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplyRecord {
    pub ard_id: String,
    pub state: String,
    pub remark: Option<String>,
    pub create_user_name: Option<String>,
    pub photos: Vec<String>,
    pub videos: Vec<String>,
}

/// Rows removed by deleting an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeCount {
    pub records: usize,
    pub details: usize,
}

struct ApplyRoomTable {
    applications: Collection<ApplyRoomRecord>,
    records: Collection<ApplyRecordEntry>,
    details: Collection<ApplyRecordDetail>,
    rng: StdRng,
}

pub struct ApplyRoomStore {
    inner: Mutex<ApplyRoomTable>,
}

fn parse_state(state: &str) -> Result<ApplyState, DomainError> {
    ApplyState::try_from(state).map_err(|_| DomainError::state(format!("无效的申请状态: {state}")))
}

fn entry(
    ardr_id: &str,
    ard_id: &str,
    state: ApplyState,
    remark: &str,
    create_user_name: &str,
    create_time: time::OffsetDateTime,
) -> ApplyRecordEntry {
    ApplyRecordEntry {
        ardr_id: ardr_id.to_string(),
        ard_id: ard_id.to_string(),
        state,
        state_name: state.label().to_string(),
        remark: remark.to_string(),
        create_user_name: create_user_name.to_string(),
        create_time,
    }
}

fn detail(
    ardrd_id: &str,
    ardr_id: &str,
    rel_type_cd: MediaType,
    url: &str,
    create_time: time::OffsetDateTime,
) -> ApplyRecordDetail {
    ApplyRecordDetail {
        ardrd_id: ardrd_id.to_string(),
        ardr_id: ardr_id.to_string(),
        rel_type_cd,
        url: url.to_string(),
        create_time,
    }
}

fn approved_remark(state: ApplyState, remark: &str) -> Option<String> {
    (state == ApplyState::Approved).then(|| remark.to_string())
}

impl ApplyRoomStore {
    pub fn seeded(mut rng: StdRng, rooms: &[RoomRef]) -> Self {
        let mut applications = Collection::new();
        let mut records = Collection::new();
        let mut details = Collection::new();

        let fallback = RoomRef {
            room_id: "ROOM_1_1_101".to_string(),
            room_name: "1-1-101".to_string(),
            community_id: DEFAULT_COMMUNITY_ID.to_string(),
        };
        let first = rooms.first().unwrap_or(&fallback);
        let second = rooms.get(1).unwrap_or(first);
        let created = now() - time::Duration::days(5);
        let submitted = created - time::Duration::days(20);
        let inspected = created - time::Duration::days(15);
        let approved = created - time::Duration::days(12);

        let literals = [
            (first, "1001", ApplyState::InspectionRequested, "张伟", "13800138000", created),
            (second, "1002", ApplyState::Approved, "李娜", "13900139000", submitted),
        ];
        for (index, (room, apply_type, state, user, tel, create_time)) in
            literals.into_iter().enumerate()
        {
            let record = ApplyRoomRecord {
                ard_id: format!("ARD_{:03}", index + 1),
                room_id: room.room_id.clone(),
                room_name: room.room_name.clone(),
                community_id: room.community_id.clone(),
                discount_type: "3003".to_string(),
                apply_type: apply_type.to_string(),
                apply_type_name: apply_type_name(apply_type),
                create_user_name: user.to_string(),
                create_user_tel: tel.to_string(),
                start_time: format_timestamp(create_time + time::Duration::days(1)),
                end_time: format_timestamp(create_time + time::Duration::days(181)),
                create_remark: Some("房屋空置，申请物业费减免".to_string()),
                check_remark: approved_remark(state, "现场验房无人居住"),
                review_remark: approved_remark(state, "同意减免"),
                state,
                state_name: state.label().to_string(),
                fee_id: Some(fee_id_for_room(&room.room_id)),
                create_time,
                update_time: create_time,
            };
            applications.seed(record);
        }

        let literal_records = {
            use ApplyState::{Approved, InspectionPassed, InspectionRequested};
            [
                ("ARDR_001", "ARD_001", InspectionRequested, "已提交验房申请", "张伟", created),
                ("ARDR_002", "ARD_002", InspectionPassed, "验房通过", "物业管家", inspected),
                ("ARDR_003", "ARD_002", Approved, "审批通过", "物业经理", approved),
            ]
        };
        for (ardr_id, ard_id, state, remark, user, create_time) in literal_records {
            records.seed(entry(ardr_id, ard_id, state, remark, user, create_time));
        }
        let literal_details = [
            ("ARDRD_001", "ARDR_001", MediaType::Image, "1.jpg", created),
            ("ARDRD_002", "ARDR_001", MediaType::Image, "2.jpg", created),
            ("ARDRD_003", "ARDR_002", MediaType::Video, "1.mp4", inspected),
        ];
        for (ardrd_id, ardr_id, media, file, create_time) in literal_details {
            let url = format!("{INSPECTION_UPLOADS}/{file}");
            details.seed(detail(ardrd_id, ardr_id, media, &url, create_time));
        }

        let mut index = applications.len();
        while applications.len() < TARGET_COUNT && !rooms.is_empty() {
            index += 1;
            let room = pick(&mut rng, rooms);
            let (apply_type, _) = *pick(&mut rng, APPLY_TYPES);
            let state = *pick(&mut rng, &ApplyState::ALL);
            let create_time = generate_time_range(-120, -1, &mut rng);
            let user = random_name(&mut rng);
            let ard_id = format!("ARD_{index:03}");
            let record = ApplyRoomRecord {
                ard_id: ard_id.clone(),
                room_id: room.room_id.clone(),
                room_name: room.room_name.clone(),
                community_id: room.community_id.clone(),
                discount_type: "3003".to_string(),
                apply_type: apply_type.to_string(),
                apply_type_name: apply_type_name(apply_type),
                create_user_name: user.clone(),
                create_user_tel: random_phone(&mut rng),
                start_time: format_timestamp(create_time + time::Duration::days(1)),
                end_time: format_timestamp(
                    create_time + time::Duration::days(rng.gen_range(30..=365)),
                ),
                create_remark: None,
                check_remark: None,
                review_remark: None,
                state,
                state_name: state.label().to_string(),
                fee_id: Some(fee_id_for_room(&room.room_id)),
                create_time,
                update_time: create_time,
            };
            if !applications.seed(record) {
                break;
            }

            if state != ApplyState::Draft {
                let record = entry(
                    &format!("ARDR_{:03}", records.len() + 1),
                    &ard_id,
                    state,
                    state.label(),
                    &user,
                    create_time,
                );
                records.seed(record);
            }
        }

        Self {
            inner: Mutex::new(ApplyRoomTable {
                applications,
                records,
                details,
                rng,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.applications.len()
    }

    /// Newest first.
    pub async fn list(
        &self,
        filter: &ApplyRoomFilter,
        page: PageRequest,
    ) -> PageSlice<ApplyRoomRecord> {
        let table = self.inner.lock().await;
        table
            .applications
            .query()
            .eq(filter.community_id.as_deref(), |a| a.community_id.as_str())
            .eq(filter.ard_id.as_deref(), |a| a.ard_id.as_str())
            .eq(filter.room_id.as_deref(), |a| a.room_id.as_str())
            .eq(filter.state.as_deref(), |a| a.state.as_str())
            .eq(filter.apply_type.as_deref(), |a| a.apply_type.as_str())
            .keyword(filter.keyword.as_deref(), |a| {
                [a.room_name.as_str(), a.create_user_name.as_str()]
            })
            .sort_desc_by(|a| a.create_time)
            .paginate(page)
    }

    pub async fn get(&self, ard_id: &str) -> Option<ApplyRoomRecord> {
        self.inner.lock().await.applications.get(ard_id).cloned()
    }

    pub async fn create(&self, input: NewApplyRoom) -> Result<ApplyRoomRecord, DomainError> {
        let mut table = self.inner.lock().await;
        let ApplyRoomTable {
            applications, rng, ..
        } = &mut *table;

        let ard_id = generate_unique_id(APPLICATION_PREFIX, rng, |id| applications.contains(id))?;
        let timestamp = now();
        let state = ApplyState::Draft;
        let record = ApplyRoomRecord {
            ard_id,
            apply_type_name: apply_type_name(&input.apply_type),
            fee_id: Some(
                input
                    .fee_id
                    .unwrap_or_else(|| fee_id_for_room(&input.room_id)),
            ),
            room_id: input.room_id,
            room_name: input.room_name,
            community_id: input
                .community_id
                .unwrap_or_else(|| DEFAULT_COMMUNITY_ID.to_string()),
            discount_type: input.discount_type.unwrap_or_else(|| "3003".to_string()),
            apply_type: input.apply_type,
            create_user_name: input.create_user_name,
            create_user_tel: input.create_user_tel,
            start_time: input.start_time,
            end_time: input.end_time,
            create_remark: input.create_remark,
            check_remark: None,
            review_remark: None,
            state,
            state_name: state.label().to_string(),
            create_time: timestamp,
            update_time: timestamp,
        };

        applications.insert(record.clone(), InsertAt::Head)?;
        debug!(target = "property_mock::store", ard_id = %record.ard_id, "application created");
        Ok(record)
    }

    /// Merge `patch` into an application. A supplied state must be one of the
    /// known codes; `stateName` follows it.
    pub async fn update(
        &self,
        ard_id: &str,
        patch: ApplyRoomPatch,
    ) -> Result<ApplyRoomRecord, DomainError> {
        let state = patch.state.as_deref().map(parse_state).transpose()?;

        let mut table = self.inner.lock().await;
        let record = table
            .applications
            .get_mut(ard_id)
            .ok_or_else(|| DomainError::not_found(ApplyRoomRecord::ENTITY, ard_id))?;

        if let Some(state) = state {
            record.state = state;
            record.state_name = state.label().to_string();
        }
        if let Some(start_time) = patch.start_time {
            record.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            record.end_time = end_time;
        }
        if let Some(discount_type) = patch.discount_type {
            record.discount_type = discount_type;
        }
        if patch.create_remark.is_some() {
            record.create_remark = patch.create_remark;
        }
        if patch.check_remark.is_some() {
            record.check_remark = patch.check_remark;
        }
        if patch.review_remark.is_some() {
            record.review_remark = patch.review_remark;
        }
        if patch.fee_id.is_some() {
            record.fee_id = patch.fee_id;
        }
        record.update_time = now();
        debug!(target = "property_mock::store", ard_id, "application updated");
        Ok(record.clone())
    }

    /// Delete an application together with its records and their details.
    pub async fn delete(&self, ard_id: &str) -> Option<CascadeCount> {
        let mut table = self.inner.lock().await;
        table.applications.remove(ard_id)?;

        let owned: Vec<String> = table
            .records
            .iter()
            .filter(|record| record.ard_id == ard_id)
            .map(|record| record.ardr_id.clone())
            .collect();
        let details = table
            .details
            .remove_where(|detail| owned.contains(&detail.ardr_id));
        let records = table.records.remove_where(|record| record.ard_id == ard_id);

        debug!(
            target = "property_mock::store",
            ard_id, records, details, "application deleted"
        );
        Some(CascadeCount { records, details })
    }

    /// Tracking records of one application, newest first.
    pub async fn list_records(
        &self,
        ard_id: &str,
        page: PageRequest,
    ) -> PageSlice<ApplyRecordEntry> {
        let table = self.inner.lock().await;
        table
            .records
            .query()
            .eq(Some(ard_id), |r| r.ard_id.as_str())
            .sort_desc_by(|r| r.create_time)
            .paginate(page)
    }

    /// Append a tracking record, turning `photos`/`videos` into detail rows.
    pub async fn add_record(
        &self,
        input: NewApplyRecord,
    ) -> Result<(ApplyRecordEntry, Vec<ApplyRecordDetail>), DomainError> {
        let state = parse_state(&input.state)?;

        let mut table = self.inner.lock().await;
        let ApplyRoomTable {
            applications,
            records,
            details,
            rng,
        } = &mut *table;

        let parent = applications
            .get(&input.ard_id)
            .ok_or_else(|| DomainError::not_found(ApplyRoomRecord::ENTITY, input.ard_id.as_str()))?;

        let timestamp = now();
        let ardr_id = generate_unique_id(RECORD_PREFIX, rng, |id| records.contains(id))?;
        let record = ApplyRecordEntry {
            ardr_id: ardr_id.clone(),
            ard_id: input.ard_id.clone(),
            state,
            state_name: state.label().to_string(),
            remark: input.remark.unwrap_or_default(),
            create_user_name: input
                .create_user_name
                .unwrap_or_else(|| parent.create_user_name.clone()),
            create_time: timestamp,
        };

        let media = input
            .photos
            .into_iter()
            .map(|url| (MediaType::Image, url))
            .chain(input.videos.into_iter().map(|url| (MediaType::Video, url)));
        let mut attached = Vec::new();
        for (rel_type_cd, url) in media {
            let ardrd_id = generate_unique_id(DETAIL_PREFIX, rng, |id| {
                details.contains(id)
                    || attached.iter().any(|d: &ApplyRecordDetail| d.ardrd_id == id)
            })?;
            attached.push(ApplyRecordDetail {
                ardrd_id,
                ardr_id: ardr_id.clone(),
                rel_type_cd,
                url,
                create_time: timestamp,
            });
        }

        records.insert(record.clone(), InsertAt::Tail)?;
        for row in &attached {
            details.insert(row.clone(), InsertAt::Tail)?;
        }

        debug!(
            target = "property_mock::store",
            ard_id = %record.ard_id,
            ardr_id = %record.ardr_id,
            details = attached.len(),
            "application record added"
        );
        Ok((record, attached))
    }

    /// Remove a tracking record and its details, returning the detail count.
    pub async fn cut_record(&self, ardr_id: &str) -> Option<usize> {
        let mut table = self.inner.lock().await;
        table.records.remove(ardr_id)?;
        let details = table.details.remove_where(|detail| detail.ardr_id == ardr_id);
        debug!(target = "property_mock::store", ardr_id, details, "application record cut");
        Some(details)
    }

    pub async fn list_details(&self, ardr_id: &str) -> Vec<ApplyRecordDetail> {
        let table = self.inner.lock().await;
        table
            .details
            .query()
            .eq(Some(ardr_id), |d| d.ardr_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn store() -> ApplyRoomStore {
        let rooms = vec![
            RoomRef {
                room_id: "ROOM_1_1_101".to_string(),
                room_name: "1-1-101".to_string(),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
            },
            RoomRef {
                room_id: "ROOM_1_1_102".to_string(),
                room_name: "1-1-102".to_string(),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
            },
        ];
        ApplyRoomStore::seeded(StdRng::seed_from_u64(23), &rooms)
    }

    fn new_record(ard_id: &str, photos: &[&str], videos: &[&str]) -> NewApplyRecord {
        NewApplyRecord {
            ard_id: ard_id.to_string(),
            state: "2".to_string(),
            remark: Some("验房通过".to_string()),
            create_user_name: None,
            photos: photos.iter().map(|s| s.to_string()).collect(),
            videos: videos.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn seeds_pad_to_target() {
        assert_eq!(store().len().await, TARGET_COUNT);
    }

    #[tokio::test]
    async fn create_starts_as_draft() {
        let store = store();
        let created = store
            .create(NewApplyRoom {
                room_id: "ROOM_1_1_102".to_string(),
                room_name: "1-1-102".to_string(),
                apply_type: "1002".to_string(),
                start_time: "2026-11-01".to_string(),
                end_time: "2027-01-31".to_string(),
                create_user_name: "王芳".to_string(),
                create_user_tel: "13611112222".to_string(),
                discount_type: None,
                create_remark: None,
                fee_id: None,
                community_id: None,
            })
            .await
            .expect("create");
        assert_eq!(created.state, ApplyState::Draft);
        assert_eq!(created.state_name, "待提交");
        assert_eq!(created.apply_type_name, "装修期减免");
        assert_eq!(created.fee_id.as_deref(), Some("FEE_1_1_102"));
        assert_eq!(store.get(&created.ard_id).await, Some(created));
    }

    #[tokio::test]
    async fn update_validates_state_and_renames() {
        let store = store();
        let err = store
            .update(
                "ARD_001",
                ApplyRoomPatch {
                    state: Some("9".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("unknown state");
        assert!(matches!(err, DomainError::State { .. }));
        assert_eq!(
            store.get("ARD_001").await.map(|a| a.state),
            Some(ApplyState::InspectionRequested)
        );

        let updated = store
            .update(
                "ARD_001",
                ApplyRoomPatch {
                    state: Some("2".to_string()),
                    check_remark: Some("无人居住".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.state_name, "验房通过");
        assert_eq!(updated.check_remark.as_deref(), Some("无人居住"));

        let missing = store
            .update("ARD_NOPE", ApplyRoomPatch::default())
            .await
            .expect_err("missing");
        assert!(matches!(missing, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn add_record_requires_parent() {
        let store = store();
        let err = store
            .add_record(new_record("ARD_NOPE", &[], &[]))
            .await
            .expect_err("orphan");
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn add_record_attaches_media_details() {
        let store = store();
        let (record, details) = store
            .add_record(new_record("ARD_001", &["/a.jpg", "/b.jpg"], &["/c.mp4"]))
            .await
            .expect("add");
        assert_eq!(record.create_user_name, "张伟");
        assert_eq!(details.len(), 3);
        assert_eq!(
            details.iter().filter(|d| d.rel_type_cd == MediaType::Video).count(),
            1
        );
        assert_eq!(store.list_details(&record.ardr_id).await, details);

        let page = store.list_records("ARD_001", PageRequest::new(1, 10)).await;
        assert_eq!(page.total, 2);
        assert_eq!(page.list[0].ardr_id, record.ardr_id);
    }

    #[tokio::test]
    async fn cut_record_cascades_only_its_details() {
        let store = store();
        let (record, _) = store
            .add_record(new_record("ARD_002", &["/x.jpg", "/y.jpg"], &[]))
            .await
            .expect("add");
        let unrelated = store.list_details("ARDR_001").await;
        assert_eq!(unrelated.len(), 2);

        assert_eq!(store.cut_record(&record.ardr_id).await, Some(2));
        assert!(store.list_details(&record.ardr_id).await.is_empty());
        assert_eq!(store.list_details("ARDR_001").await, unrelated);
        assert_eq!(store.cut_record(&record.ardr_id).await, None);
    }

    #[tokio::test]
    async fn delete_application_cascades_records_and_details() {
        let store = store();
        let counts = store.delete("ARD_002").await.expect("delete");
        assert_eq!(counts, CascadeCount { records: 2, details: 1 });
        assert!(store.get("ARD_002").await.is_none());
        assert!(store.list_details("ARDR_002").await.is_empty());
        assert_eq!(store.list_details("ARDR_001").await.len(), 2);
        assert_eq!(store.delete("ARD_002").await, None);
    }
}
