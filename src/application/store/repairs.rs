use rand::{Rng, rngs::StdRng};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::generators::{
    format_timestamp, generate_time_range, generate_unique_id, now, pick, random_address,
    random_name, random_phone,
};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::{RepairEvaluation, RepairRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{RepairPriority, RepairStatus};

use super::{Collection, DEFAULT_COMMUNITY_ID, InsertAt, Record};

const TARGET_COUNT: usize = 50;
const ID_PREFIX: &str = "REPAIR";

pub const REPAIR_TYPES: &[(&str, &str)] = &[
    ("1001", "水电维修"),
    ("1002", "门窗维修"),
    ("1003", "公共设施"),
    ("1004", "电梯故障"),
    ("1005", "其他"),
];

const ISSUES: &[(&str, &str)] = &[
    ("卫生间漏水", "卫生间地面持续渗水，楼下天花板已有水渍"),
    ("入户门锁损坏", "门锁无法正常反锁，钥匙插入困难"),
    ("楼道灯不亮", "3楼楼道声控灯失灵，夜间出行不便"),
    ("电梯异响", "电梯运行时有明显异响，偶尔停顿"),
    ("窗户关不严", "卧室推拉窗无法完全关闭，漏风严重"),
    ("插座没电", "客厅两个插座同时断电，空开正常"),
    ("下水道堵塞", "厨房水槽下水缓慢，疑似管道堵塞"),
];

impl Record for RepairRecord {
    const ENTITY: &'static str = "repair";

    fn id(&self) -> &str {
        &self.repair_id
    }
}

pub fn repair_type_name(code: &str) -> &'static str {
    REPAIR_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
        .unwrap_or("其他")
}

#[derive(Debug, Clone, Default)]
pub struct RepairFilter {
    pub community_id: Option<String>,
    pub repair_id: Option<String>,
    pub status: Option<String>,
    pub repair_type: Option<String>,
    pub owner_phone: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRepair {
    pub title: String,
    pub description: String,
    pub owner_name: String,
    pub owner_phone: String,
    pub address: String,
    pub repair_type: Option<String>,
    pub community_id: Option<String>,
    pub priority: Option<RepairPriority>,
    pub appointment_time: Option<String>,
    pub images: Vec<String>,
}

/// Worker assigned when an order moves to `ASSIGNED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    pub name: String,
    pub phone: Option<String>,
}

struct RepairTable {
    rows: Collection<RepairRecord>,
    rng: StdRng,
}

pub struct RepairStore {
    inner: Mutex<RepairTable>,
}

impl RepairStore {
    pub fn seeded(mut rng: StdRng) -> Self {
        let mut rows = Collection::new();
        for record in literal_fixtures() {
            rows.seed(record);
        }

        let mut index = rows.len();
        while rows.len() < TARGET_COUNT {
            index += 1;
            let record = filler(index, &mut rng);
            if !rows.seed(record) {
                break;
            }
        }

        Self {
            inner: Mutex::new(RepairTable { rows, rng }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn list(&self, filter: &RepairFilter, page: PageRequest) -> PageSlice<RepairRecord> {
        let table = self.inner.lock().await;
        table
            .rows
            .query()
            .eq(filter.community_id.as_deref(), |r| r.community_id.as_str())
            .eq(filter.repair_id.as_deref(), |r| r.repair_id.as_str())
            .eq(filter.status.as_deref(), |r| r.status.as_str())
            .eq(filter.repair_type.as_deref(), |r| r.repair_type.as_str())
            .eq(filter.owner_phone.as_deref(), |r| r.owner_phone.as_str())
            .keyword(filter.keyword.as_deref(), |r| {
                [r.title.as_str(), r.description.as_str()]
            })
            .sort_desc_by(|r| r.create_time)
            .paginate(page)
    }

    pub async fn get(&self, id: &str) -> Option<RepairRecord> {
        self.inner.lock().await.rows.get(id).cloned()
    }

    pub async fn create(&self, input: NewRepair) -> Result<RepairRecord, DomainError> {
        let mut table = self.inner.lock().await;
        let RepairTable { rows, rng } = &mut *table;

        let repair_id = generate_unique_id(ID_PREFIX, rng, |id| rows.contains(id))?;
        let repair_type = input.repair_type.unwrap_or_else(|| "1005".to_string());
        let timestamp = now();
        let record = RepairRecord {
            repair_id,
            title: input.title,
            description: input.description,
            repair_type_name: repair_type_name(&repair_type).to_string(),
            repair_type,
            owner_name: input.owner_name,
            owner_phone: input.owner_phone,
            address: input.address,
            community_id: input
                .community_id
                .unwrap_or_else(|| DEFAULT_COMMUNITY_ID.to_string()),
            status: RepairStatus::Pending,
            status_name: RepairStatus::Pending.label().to_string(),
            priority: input.priority.unwrap_or(RepairPriority::Normal),
            appointment_time: input.appointment_time,
            images: input.images,
            assignee_name: None,
            assignee_phone: None,
            evaluation: None,
            create_time: timestamp,
            update_time: timestamp,
        };

        rows.insert(record.clone(), InsertAt::Head)?;
        debug!(target = "property_mock::store", repair_id = %record.repair_id, "repair created");
        Ok(record)
    }

    /// Move an order to `status`.
    ///
    /// The target must be a known status; re-applying the current status only
    /// refreshes `updateTime`. Skipped steps such as `PENDING → COMPLETED` are
    /// accepted.
    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
        assignee: Option<Assignee>,
    ) -> Result<RepairRecord, DomainError> {
        let target = RepairStatus::try_from(status)
            .map_err(|_| DomainError::state(format!("无效的报修状态: {status}")))?;

        let mut table = self.inner.lock().await;
        let record = table
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(RepairRecord::ENTITY, id))?;

        if target != record.status {
            record.status = target;
            record.status_name = target.label().to_string();
            if let (RepairStatus::Assigned, Some(assignee)) = (target, assignee) {
                record.assignee_name = Some(assignee.name);
                record.assignee_phone = assignee.phone;
            }
        }
        record.update_time = now();

        debug!(
            target = "property_mock::store",
            repair_id = id,
            status = target.as_str(),
            "repair status updated"
        );
        Ok(record.clone())
    }

    /// Attach the owner's evaluation to a completed order.
    pub async fn evaluate(
        &self,
        id: &str,
        score: u8,
        content: String,
    ) -> Result<RepairRecord, DomainError> {
        if !(1..=5).contains(&score) {
            return Err(DomainError::validation("评分必须在1到5之间"));
        }

        let mut table = self.inner.lock().await;
        let record = table
            .rows
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(RepairRecord::ENTITY, id))?;

        if record.status != RepairStatus::Completed {
            return Err(DomainError::state("只有已完成的报修单可以评价"));
        }

        let timestamp = now();
        record.evaluation = Some(RepairEvaluation {
            score,
            content,
            evaluate_time: timestamp,
        });
        record.update_time = timestamp;
        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.inner.lock().await.rows.remove(id).is_some();
        if removed {
            debug!(target = "property_mock::store", repair_id = id, "repair deleted");
        }
        removed
    }
}

fn literal_fixtures() -> Vec<RepairRecord> {
    let created = now() - time::Duration::hours(6);
    let completed = now() - time::Duration::days(5);
    vec![
        RepairRecord {
            repair_id: "REPAIR_001".to_string(),
            title: "厨房水管漏水".to_string(),
            description: "厨房水槽下方水管接口处漏水，需要尽快处理".to_string(),
            repair_type: "1001".to_string(),
            repair_type_name: repair_type_name("1001").to_string(),
            owner_name: "张伟".to_string(),
            owner_phone: "13800138000".to_string(),
            address: "阳光花园1栋1单元101室".to_string(),
            community_id: DEFAULT_COMMUNITY_ID.to_string(),
            status: RepairStatus::Pending,
            status_name: RepairStatus::Pending.label().to_string(),
            priority: RepairPriority::High,
            appointment_time: Some(format_timestamp(created + time::Duration::days(1))),
            images: vec!["/static/images/repairs/leak.jpg".to_string()],
            assignee_name: None,
            assignee_phone: None,
            evaluation: None,
            create_time: created,
            update_time: created,
        },
        RepairRecord {
            repair_id: "REPAIR_002".to_string(),
            title: "客厅灯具损坏".to_string(),
            description: "客厅吸顶灯闪烁后不亮，已更换灯泡无效".to_string(),
            repair_type: "1001".to_string(),
            repair_type_name: repair_type_name("1001").to_string(),
            owner_name: "李娜".to_string(),
            owner_phone: "13900139000".to_string(),
            address: "阳光花园2栋1单元302室".to_string(),
            community_id: DEFAULT_COMMUNITY_ID.to_string(),
            status: RepairStatus::Completed,
            status_name: RepairStatus::Completed.label().to_string(),
            priority: RepairPriority::Normal,
            appointment_time: None,
            images: Vec::new(),
            assignee_name: Some("王师傅".to_string()),
            assignee_phone: Some("13700137000".to_string()),
            evaluation: Some(RepairEvaluation {
                score: 5,
                content: "师傅很专业，处理及时".to_string(),
                evaluate_time: completed + time::Duration::hours(2),
            }),
            create_time: completed - time::Duration::days(1),
            update_time: completed + time::Duration::hours(2),
        },
    ]
}

fn filler(index: usize, rng: &mut StdRng) -> RepairRecord {
    let (title, description) = *pick(rng, ISSUES);
    let (repair_type, type_name) = *pick(rng, REPAIR_TYPES);
    let status = *pick(rng, &RepairStatus::ALL);
    let create_time = generate_time_range(-90, -1, rng);
    let assigned = !matches!(status, RepairStatus::Pending | RepairStatus::Cancelled);

    RepairRecord {
        repair_id: format!("REPAIR_{index:03}"),
        title: title.to_string(),
        description: description.to_string(),
        repair_type: repair_type.to_string(),
        repair_type_name: type_name.to_string(),
        owner_name: random_name(rng),
        owner_phone: random_phone(rng),
        address: random_address(rng),
        community_id: DEFAULT_COMMUNITY_ID.to_string(),
        status,
        status_name: status.label().to_string(),
        priority: *pick(rng, &RepairPriority::ALL),
        appointment_time: rng
            .gen_bool(0.5)
            .then(|| format_timestamp(create_time + time::Duration::days(1))),
        images: Vec::new(),
        assignee_name: assigned.then(|| format!("{}师傅", pick(rng, &["王", "李", "赵", "陈"]))),
        assignee_phone: assigned.then(|| random_phone(rng)),
        evaluation: None,
        create_time,
        update_time: create_time,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn store() -> RepairStore {
        RepairStore::seeded(StdRng::seed_from_u64(23))
    }

    fn new_repair() -> NewRepair {
        NewRepair {
            title: "阳台漏水".to_string(),
            description: "下雨时阳台渗水".to_string(),
            owner_name: "赵敏".to_string(),
            owner_phone: "13600136000".to_string(),
            address: "阳光花园3栋2单元501室".to_string(),
            repair_type: Some("1002".to_string()),
            community_id: None,
            priority: None,
            appointment_time: None,
            images: vec!["a.jpg".to_string()],
        }
    }

    #[tokio::test]
    async fn seeds_pad_to_target() {
        assert_eq!(store().len().await, TARGET_COUNT);
    }

    #[tokio::test]
    async fn create_starts_pending_and_round_trips() {
        let store = store();
        let created = store.create(new_repair()).await.expect("create");
        assert_eq!(created.status, RepairStatus::Pending);
        assert_eq!(created.repair_type_name, "门窗维修");
        assert_eq!(store.get(&created.repair_id).await, Some(created));
    }

    #[tokio::test]
    async fn same_status_only_refreshes_update_time() {
        let store = store();
        let before = store.get("REPAIR_001").await.expect("fixture");
        let after = store
            .update_status("REPAIR_001", "PENDING", None)
            .await
            .expect("idempotent");
        let normalized = RepairRecord {
            update_time: before.update_time,
            ..after.clone()
        };
        assert_eq!(normalized, before);
        assert!(after.update_time >= before.update_time);
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_without_change() {
        let store = store();
        let err = store
            .update_status("REPAIR_001", "NOT_A_REAL_STATUS", None)
            .await
            .expect_err("illegal");
        assert!(matches!(err, DomainError::State { .. }));
        let record = store.get("REPAIR_001").await.expect("fixture");
        assert_eq!(record.status, RepairStatus::Pending);
    }

    #[tokio::test]
    async fn skipped_transitions_are_accepted() {
        let store = store();
        let record = store
            .update_status("REPAIR_001", "COMPLETED", None)
            .await
            .expect("skip allowed");
        assert_eq!(record.status, RepairStatus::Completed);
        assert_eq!(record.status_name, "已完成");
    }

    #[tokio::test]
    async fn assignment_records_worker() {
        let store = store();
        let assignee = Assignee {
            name: "刘师傅".to_string(),
            phone: Some("13500135000".to_string()),
        };
        let record = store
            .update_status("REPAIR_001", "ASSIGNED", Some(assignee))
            .await
            .expect("assign");
        assert_eq!(record.assignee_name.as_deref(), Some("刘师傅"));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let store = store();
        let err = store
            .update_status("REPAIR_NOPE", "ASSIGNED", None)
            .await
            .expect_err("missing");
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn evaluation_requires_completed_order() {
        let store = store();
        let err = store
            .evaluate("REPAIR_001", 4, "ok".to_string())
            .await
            .expect_err("pending order");
        assert!(matches!(err, DomainError::State { .. }));

        store
            .update_status("REPAIR_001", "COMPLETED", None)
            .await
            .expect("complete");
        let record = store
            .evaluate("REPAIR_001", 4, "修得很好".to_string())
            .await
            .expect("evaluate");
        assert_eq!(record.evaluation.map(|e| e.score), Some(4));
    }

    #[tokio::test]
    async fn evaluation_score_is_bounded() {
        let store = store();
        let err = store
            .evaluate("REPAIR_002", 6, String::new())
            .await
            .expect_err("score");
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn filters_combine() {
        let store = store();
        let filter = RepairFilter {
            owner_phone: Some("13800138000".to_string()),
            status: Some("PENDING".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 10)).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].repair_id, "REPAIR_001");
    }
}
