use rand::{Rng, rngs::StdRng};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::generators::{
    generate_time_range, generate_unique_id, now, pick, random_phone,
};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::ComplaintRecord;
use crate::domain::error::DomainError;
use crate::domain::types::{ComplaintState, ComplaintType};

use super::locations::RoomRef;
use super::{Collection, DEFAULT_COMMUNITY_ID, InsertAt, Record};

const TARGET_COUNT: usize = 30;
const ID_PREFIX: &str = "CMP";

const SUBJECTS: &[(&str, &str)] = &[
    ("夜间装修噪音", "楼上住户晚上十点后仍在装修，严重影响休息"),
    ("车位被占用", "本人固定车位长期被外来车辆占用"),
    ("垃圾清运不及时", "单元门口垃圾桶已满两天无人清理"),
    ("建议增加健身器材", "小区健身区器材较少，建议增加几组"),
    ("宠物粪便未清理", "草坪上经常有宠物粪便，希望加强管理"),
    ("建议延长门岗服务时间", "晚归业主较多，建议门岗延长服务时间"),
];

impl Record for ComplaintRecord {
    const ENTITY: &'static str = "complaint";

    fn id(&self) -> &str {
        &self.complaint_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub community_id: Option<String>,
    pub complaint_id: Option<String>,
    pub state: Option<String>,
    pub type_cd: Option<String>,
    pub tel: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub type_cd: ComplaintType,
    pub complaint_name: String,
    pub context: String,
    pub tel: String,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub community_id: Option<String>,
}

struct ComplaintTable {
    rows: Collection<ComplaintRecord>,
    rng: StdRng,
}

pub struct ComplaintStore {
    inner: Mutex<ComplaintTable>,
}

impl ComplaintStore {
    pub fn seeded(mut rng: StdRng, rooms: &[RoomRef]) -> Self {
        let mut rows = Collection::new();
        let created = now() - time::Duration::hours(3);
        let literals = [
            ComplaintRecord {
                complaint_id: "CMP_001".to_string(),
                type_cd: ComplaintType::Complaint,
                type_name: ComplaintType::Complaint.label().to_string(),
                complaint_name: "电梯频繁故障".to_string(),
                context: "2栋电梯本周已停运三次，老人上下楼非常不便".to_string(),
                tel: "13800138000".to_string(),
                room_id: rooms.first().map(|room| room.room_id.clone()),
                room_name: rooms.first().map(|room| room.room_name.clone()),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
                state: ComplaintState::Waiting,
                state_name: ComplaintState::Waiting.label().to_string(),
                reply: None,
                create_time: created,
                update_time: created,
            },
            ComplaintRecord {
                complaint_id: "CMP_002".to_string(),
                type_cd: ComplaintType::Suggestion,
                type_name: ComplaintType::Suggestion.label().to_string(),
                complaint_name: "建议增设快递柜".to_string(),
                context: "快递经常堆放在门岗，建议在北门增设智能快递柜".to_string(),
                tel: "13900139000".to_string(),
                room_id: None,
                room_name: None,
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
                state: ComplaintState::Closed,
                state_name: ComplaintState::Closed.label().to_string(),
                reply: Some("感谢建议，快递柜已于本月安装完成".to_string()),
                create_time: created - time::Duration::days(10),
                update_time: created - time::Duration::days(2),
            },
        ];
        for record in literals {
            rows.seed(record);
        }

        let mut index = rows.len();
        while rows.len() < TARGET_COUNT {
            index += 1;
            let (name, context) = *pick(&mut rng, SUBJECTS);
            let type_cd = if name.starts_with("建议") {
                ComplaintType::Suggestion
            } else {
                ComplaintType::Complaint
            };
            let state = *pick(&mut rng, &ComplaintState::ALL);
            let room = (!rooms.is_empty()).then(|| pick(&mut rng, rooms).clone());
            let create_time = generate_time_range(-60, -1, &mut rng);
            let record = ComplaintRecord {
                complaint_id: format!("CMP_{index:03}"),
                type_cd,
                type_name: type_cd.label().to_string(),
                complaint_name: name.to_string(),
                context: context.to_string(),
                tel: random_phone(&mut rng),
                room_id: room.as_ref().map(|room| room.room_id.clone()),
                room_name: room.map(|room| room.room_name),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
                state,
                state_name: state.label().to_string(),
                reply: (state == ComplaintState::Closed && rng.gen_bool(0.8))
                    .then(|| "已安排专人处理，感谢您的反馈".to_string()),
                create_time,
                update_time: create_time,
            };
            if !rows.seed(record) {
                break;
            }
        }

        Self {
            inner: Mutex::new(ComplaintTable { rows, rng }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn list(
        &self,
        filter: &ComplaintFilter,
        page: PageRequest,
    ) -> PageSlice<ComplaintRecord> {
        let table = self.inner.lock().await;
        table
            .rows
            .query()
            .eq(filter.community_id.as_deref(), |c| c.community_id.as_str())
            .eq(filter.complaint_id.as_deref(), |c| c.complaint_id.as_str())
            .eq(filter.state.as_deref(), |c| c.state.as_str())
            .eq(filter.type_cd.as_deref(), |c| c.type_cd.as_str())
            .eq(filter.tel.as_deref(), |c| c.tel.as_str())
            .keyword(filter.keyword.as_deref(), |c| {
                [c.complaint_name.as_str(), c.context.as_str()]
            })
            .sort_desc_by(|c| c.create_time)
            .paginate(page)
    }

    pub async fn get(&self, id: &str) -> Option<ComplaintRecord> {
        self.inner.lock().await.rows.get(id).cloned()
    }

    pub async fn create(&self, input: NewComplaint) -> Result<ComplaintRecord, DomainError> {
        let mut table = self.inner.lock().await;
        let ComplaintTable { rows, rng } = &mut *table;

        let complaint_id = generate_unique_id(ID_PREFIX, rng, |id| rows.contains(id))?;
        let timestamp = now();
        let record = ComplaintRecord {
            complaint_id,
            type_cd: input.type_cd,
            type_name: input.type_cd.label().to_string(),
            complaint_name: input.complaint_name,
            context: input.context,
            tel: input.tel,
            room_id: input.room_id,
            room_name: input.room_name,
            community_id: input
                .community_id
                .unwrap_or_else(|| DEFAULT_COMMUNITY_ID.to_string()),
            state: ComplaintState::Waiting,
            state_name: ComplaintState::Waiting.label().to_string(),
            reply: None,
            create_time: timestamp,
            update_time: timestamp,
        };

        rows.insert(record.clone(), InsertAt::Head)?;
        debug!(
            target = "property_mock::store",
            complaint_id = %record.complaint_id,
            "complaint created"
        );
        Ok(record)
    }

    /// Move a complaint to `state`, optionally recording the property's reply.
    pub async fn update_state(
        &self,
        id: &str,
        state: &str,
        reply: Option<String>,
    ) -> Result<ComplaintRecord, DomainError> {
        let target = ComplaintState::try_from(state)
            .map_err(|_| DomainError::state(format!("无效的投诉状态: {state}")))?;

        let mut table = self.inner.lock().await;
        let record = table
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(ComplaintRecord::ENTITY, id))?;

        record.state = target;
        record.state_name = target.label().to_string();
        if reply.is_some() {
            record.reply = reply;
        }
        record.update_time = now();
        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.inner.lock().await.rows.remove(id).is_some();
        if removed {
            debug!(target = "property_mock::store", complaint_id = id, "complaint deleted");
        }
        removed
    }
}
