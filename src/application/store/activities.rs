use rand::{Rng, rngs::StdRng};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::generators::{
    format_timestamp, generate_time_range, generate_unique_id, now, pick, random_name,
};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::ActivityRecord;
use crate::domain::error::DomainError;
use crate::domain::types::ActivityStatus;

use super::{Collection, DEFAULT_COMMUNITY_ID, InsertAt, Record};

const FILLER_COUNT: usize = 20;
const ID_PREFIX: &str = "ACT";

const TITLES: &[&str] = &[
    "社区亲子运动会",
    "周末跳蚤市场",
    "垃圾分类宣传日",
    "中秋游园会",
    "业主羽毛球赛",
    "消防安全演练",
    "义诊进社区",
    "书画展览",
    "广场舞大赛",
    "老年人智能手机课堂",
];

const TYPES: &[&str] = &["10001", "10002", "10003"];

impl Record for ActivityRecord {
    const ENTITY: &'static str = "activity";

    fn id(&self) -> &str {
        &self.activities_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub community_id: Option<String>,
    pub activities_id: Option<String>,
    pub status: Option<String>,
    pub type_cd: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub context: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub type_cd: Option<String>,
    pub header_img: Option<String>,
    pub user_name: Option<String>,
    pub community_id: Option<String>,
    pub status: Option<ActivityStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub context: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub type_cd: Option<String>,
    pub header_img: Option<String>,
    pub status: Option<ActivityStatus>,
}

/// Engagement counters mutated by dedicated endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    View,
    Like,
    Collect,
}

struct ActivityTable {
    rows: Collection<ActivityRecord>,
    rng: StdRng,
}

pub struct ActivityStore {
    inner: Mutex<ActivityTable>,
}

impl ActivityStore {
    /// One literal fixture followed by generated filler, all in the default community.
    pub fn seeded(mut rng: StdRng) -> Self {
        let mut rows = Collection::new();
        let created = now() - time::Duration::days(1);
        let literal = ActivityRecord {
            activities_id: "ACT_001".to_string(),
            title: "阳光花园邻里节".to_string(),
            type_cd: "10001".to_string(),
            header_img: "/static/images/activities/neighbor-day.jpg".to_string(),
            context: "邀请全体业主参加邻里节，现场有美食、游戏和亲子互动。".to_string(),
            start_time: format_timestamp(created + time::Duration::days(3)),
            end_time: Some(format_timestamp(created + time::Duration::days(4))),
            user_name: "物业服务中心".to_string(),
            community_id: DEFAULT_COMMUNITY_ID.to_string(),
            status: ActivityStatus::Upcoming,
            view_count: 128,
            like_count: 36,
            collect_count: 12,
            create_time: created,
            update_time: created,
        };
        rows.seed(literal);

        for index in 0..FILLER_COUNT {
            let create_time = generate_time_range(-60, -2, &mut rng);
            let start = generate_time_range(-30, 30, &mut rng);
            let status = if start > now() {
                ActivityStatus::Upcoming
            } else if rng.gen_bool(0.5) {
                ActivityStatus::Ongoing
            } else {
                ActivityStatus::Ended
            };
            let record = ActivityRecord {
                activities_id: format!("ACT_{:03}", index + 2),
                title: pick(&mut rng, TITLES).to_string(),
                type_cd: pick(&mut rng, TYPES).to_string(),
                header_img: format!("/static/images/activities/{}.jpg", index % 5 + 1),
                context: format!("第{}期社区活动，欢迎业主报名参加。", index + 1),
                start_time: format_timestamp(start),
                end_time: Some(format_timestamp(start + time::Duration::hours(3))),
                user_name: random_name(&mut rng),
                community_id: DEFAULT_COMMUNITY_ID.to_string(),
                status,
                view_count: rng.gen_range(0..500),
                like_count: rng.gen_range(0..100),
                collect_count: rng.gen_range(0..50),
                create_time,
                update_time: create_time,
            };
            if !rows.seed(record) {
                break;
            }
        }

        Self {
            inner: Mutex::new(ActivityTable { rows, rng }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    /// Newest first.
    pub async fn list(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> PageSlice<ActivityRecord> {
        let table = self.inner.lock().await;
        table
            .rows
            .query()
            .eq(filter.community_id.as_deref(), |a| a.community_id.as_str())
            .eq(filter.activities_id.as_deref(), |a| a.activities_id.as_str())
            .eq(filter.status.as_deref(), |a| a.status.as_str())
            .eq(filter.type_cd.as_deref(), |a| a.type_cd.as_str())
            .keyword(filter.keyword.as_deref(), |a| [a.title.as_str(), a.context.as_str()])
            .sort_desc_by(|a| a.create_time)
            .paginate(page)
    }

    pub async fn get(&self, id: &str) -> Option<ActivityRecord> {
        self.inner.lock().await.rows.get(id).cloned()
    }

    pub async fn create(&self, input: NewActivity) -> Result<ActivityRecord, DomainError> {
        let mut table = self.inner.lock().await;
        let ActivityTable { rows, rng } = &mut *table;

        let activities_id = generate_unique_id(ID_PREFIX, rng, |id| rows.contains(id))?;
        let timestamp = now();
        let record = ActivityRecord {
            activities_id,
            title: input.title,
            type_cd: input.type_cd.unwrap_or_else(|| "10001".to_string()),
            header_img: input.header_img.unwrap_or_default(),
            context: input.context,
            start_time: input.start_time,
            end_time: input.end_time,
            user_name: input.user_name.unwrap_or_else(|| "物业服务中心".to_string()),
            community_id: input
                .community_id
                .unwrap_or_else(|| DEFAULT_COMMUNITY_ID.to_string()),
            status: input.status.unwrap_or(ActivityStatus::Upcoming),
            view_count: 0,
            like_count: 0,
            collect_count: 0,
            create_time: timestamp,
            update_time: timestamp,
        };

        rows.insert(record.clone(), InsertAt::Head)?;
        debug!(
            target = "property_mock::store",
            activities_id = %record.activities_id,
            "activity created"
        );
        Ok(record)
    }

    pub async fn update(&self, id: &str, patch: ActivityPatch) -> bool {
        let mut table = self.inner.lock().await;
        let Some(record) = table.rows.get_mut(id) else {
            return false;
        };

        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(context) = patch.context {
            record.context = context;
        }
        if let Some(start_time) = patch.start_time {
            record.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            record.end_time = Some(end_time);
        }
        if let Some(type_cd) = patch.type_cd {
            record.type_cd = type_cd;
        }
        if let Some(header_img) = patch.header_img {
            record.header_img = header_img;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        record.update_time = now();
        debug!(target = "property_mock::store", activities_id = id, "activity updated");
        true
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.inner.lock().await.rows.remove(id).is_some();
        if removed {
            debug!(target = "property_mock::store", activities_id = id, "activity deleted");
        }
        removed
    }

    /// Bump a counter, returning its new value.
    pub async fn increment(&self, id: &str, counter: Counter) -> Option<u64> {
        let mut table = self.inner.lock().await;
        let record = table.rows.get_mut(id)?;
        let slot = match counter {
            Counter::View => &mut record.view_count,
            Counter::Like => &mut record.like_count,
            Counter::Collect => &mut record.collect_count,
        };
        *slot += 1;
        Some(*slot)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn store() -> ActivityStore {
        ActivityStore::seeded(StdRng::seed_from_u64(17))
    }

    fn new_activity(title: &str) -> NewActivity {
        NewActivity {
            title: title.to_string(),
            context: "内容".to_string(),
            start_time: "2026-11-01T09:00:00Z".to_string(),
            end_time: None,
            type_cd: None,
            header_img: None,
            user_name: None,
            community_id: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn seeded_fixture_pages_by_community() {
        let store = store();
        let filter = ActivityFilter {
            community_id: Some(DEFAULT_COMMUNITY_ID.to_string()),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 10)).await;
        assert_eq!(page.list.len(), 10);
        assert_eq!(page.total, 21);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn list_is_sorted_newest_first() {
        let store = store();
        let page = store
            .list(&ActivityFilter::default(), PageRequest::new(1, 100))
            .await;
        assert!(
            page.list
                .windows(2)
                .all(|pair| pair[0].create_time >= pair[1].create_time)
        );
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = store();
        let created = store.create(new_activity("新活动")).await.expect("create");
        assert!(created.activities_id.starts_with("ACT_"));
        assert_eq!(created.view_count, 0);
        assert_eq!(store.get(&created.activities_id).await, Some(created.clone()));
        assert_eq!(store.len().await, 22);

        let page = store
            .list(&ActivityFilter::default(), PageRequest::new(1, 1))
            .await;
        assert_eq!(page.list[0].activities_id, created.activities_id);
    }

    #[tokio::test]
    async fn keyword_matches_title_or_context() {
        let store = store();
        let filter = ActivityFilter {
            keyword: Some("邻里节".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 10)).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].activities_id, "ACT_001");
    }

    #[tokio::test]
    async fn missing_activity_is_none() {
        let store = store();
        assert!(store.get("ACT_DOES_NOT_EXIST").await.is_none());
        assert!(!store.update("ACT_DOES_NOT_EXIST", ActivityPatch::default()).await);
        assert!(!store.delete("ACT_DOES_NOT_EXIST").await);
        assert!(store.increment("ACT_DOES_NOT_EXIST", Counter::Like).await.is_none());
    }

    #[tokio::test]
    async fn counters_increment_independently() {
        let store = store();
        let before = store.get("ACT_001").await.expect("fixture");
        assert_eq!(store.increment("ACT_001", Counter::View).await, Some(before.view_count + 1));
        assert_eq!(store.increment("ACT_001", Counter::Like).await, Some(before.like_count + 1));
        let after = store.get("ACT_001").await.expect("fixture");
        assert_eq!(after.collect_count, before.collect_count);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = store();
        let before = store.get("ACT_001").await.expect("fixture");
        let patch = ActivityPatch {
            title: Some("改名后的活动".to_string()),
            ..Default::default()
        };
        assert!(store.update("ACT_001", patch).await);
        let after = store.get("ACT_001").await.expect("fixture");
        assert_eq!(after.title, "改名后的活动");
        assert_eq!(after.context, before.context);
        assert!(after.update_time >= before.update_time);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = store();
        assert!(store.delete("ACT_001").await);
        assert!(store.get("ACT_001").await.is_none());
        assert_eq!(store.len().await, 20);
    }
}
