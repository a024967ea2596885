use std::sync::Arc;

use serde::Serialize;

use crate::application::error::AppError;
use crate::application::pagination::PageRequest;
use crate::application::store::MockDatabase;
use crate::application::store::activities::{ActivityFilter, ActivityPatch, Counter, NewActivity};
use crate::domain::entities::ActivityRecord;
use crate::domain::types::ActivityStatus;
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{COUNTER_DELAY, FEED_ROW, GET_POST, LIST_DELAY, POST, WRITE_DELAY};

const ACTIVITY_NOT_FOUND: &str = "活动不存在";
const ID_REQUIRED: &str = "活动ID不能为空";

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new("/app/activities.listActivitiess", GET_POST, LIST_DELAY, list),
        MockEndpoint::new("/app/activities.saveActivities", POST, WRITE_DELAY, save),
        MockEndpoint::new("/app/activities.updateActivities", POST, WRITE_DELAY, update),
        MockEndpoint::new("/app/activities.deleteActivities", POST, WRITE_DELAY, delete),
        MockEndpoint::new("/app/activities.increaseView", POST, COUNTER_DELAY, increase_view),
        MockEndpoint::new("/app/activities.likeActivities", POST, COUNTER_DELAY, like),
        MockEndpoint::new("/app/activities.collectActivities", POST, COUNTER_DELAY, collect),
    ]
}

#[derive(Serialize)]
struct ActivityPage {
    activitiess: Vec<ActivityRecord>,
    total: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityRef {
    activities_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CounterValue {
    activities_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    like_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collect_count: Option<u64>,
}

struct ListActivitiesRequest {
    filter: ActivityFilter,
    page: PageRequest,
}

impl From<&ParamBag> for ListActivitiesRequest {
    fn from(params: &ParamBag) -> Self {
        Self {
            filter: ActivityFilter {
                community_id: params.text("communityId"),
                activities_id: params.text("activitiesId"),
                status: params.text("status"),
                type_cd: params.text("typeCd"),
                keyword: params.text("keyword"),
            },
            page: params.page_request(FEED_ROW),
        }
    }
}

fn parse_status(params: &ParamBag) -> Result<Option<ActivityStatus>, AppError> {
    params
        .text("status")
        .map(|raw| {
            ActivityStatus::try_from(raw.as_str())
                .map_err(|_| AppError::validation(format!("无效的活动状态: {raw}")))
        })
        .transpose()
}

impl TryFrom<&ParamBag> for NewActivity {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        Ok(Self {
            title: params.require("title", "活动标题不能为空")?,
            start_time: params.require("startTime", "活动开始时间不能为空")?,
            context: params.require("context", "活动内容不能为空")?,
            end_time: params.text("endTime"),
            type_cd: params.text("typeCd"),
            header_img: params.text("headerImg"),
            user_name: params.text("userName"),
            community_id: params.text("communityId"),
            status: parse_status(params)?,
        })
    }
}

impl TryFrom<&ParamBag> for ActivityPatch {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        Ok(Self {
            title: params.text("title"),
            context: params.text("context"),
            start_time: params.text("startTime"),
            end_time: params.text("endTime"),
            type_cd: params.text("typeCd"),
            header_img: params.text("headerImg"),
            status: parse_status(params)?,
        })
    }
}

async fn list(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = ListActivitiesRequest::from(&params);

    if let Some(id) = request.filter.activities_id.as_deref() {
        let record = db
            .activities
            .get(id)
            .await
            .ok_or_else(|| AppError::not_found(ACTIVITY_NOT_FOUND))?;
        return Reply::new(ActivityPage {
            activitiess: vec![record],
            total: 1,
            page: 1,
            row: request.page.row(),
        });
    }

    let slice = db.activities.list(&request.filter, request.page).await;
    Reply::new(ActivityPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        activitiess: slice.list,
    })
}

async fn save(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let input = NewActivity::try_from(&params)?;
    let record = db.activities.create(input).await?;
    Ok(Reply::new(record)?.with_message("活动发布成功"))
}

async fn update(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let id = params.require("activitiesId", ID_REQUIRED)?;
    let patch = ActivityPatch::try_from(&params)?;
    if !db.activities.update(&id, patch).await {
        return Err(AppError::not_found(ACTIVITY_NOT_FOUND));
    }
    let record = db
        .activities
        .get(&id)
        .await
        .ok_or_else(|| AppError::not_found(ACTIVITY_NOT_FOUND))?;
    Ok(Reply::new(record)?.with_message("活动更新成功"))
}

async fn delete(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let id = params.require("activitiesId", ID_REQUIRED)?;
    if !db.activities.delete(&id).await {
        return Err(AppError::not_found(ACTIVITY_NOT_FOUND));
    }
    Ok(Reply::new(ActivityRef { activities_id: id })?.with_message("活动删除成功"))
}

async fn bump(db: Arc<MockDatabase>, params: ParamBag, counter: Counter) -> HandlerResult {
    let id = params.require("activitiesId", ID_REQUIRED)?;
    let value = db
        .activities
        .increment(&id, counter)
        .await
        .ok_or_else(|| AppError::not_found(ACTIVITY_NOT_FOUND))?;

    let mut payload = CounterValue {
        activities_id: id,
        view_count: None,
        like_count: None,
        collect_count: None,
    };
    match counter {
        Counter::View => payload.view_count = Some(value),
        Counter::Like => payload.like_count = Some(value),
        Counter::Collect => payload.collect_count = Some(value),
    }
    Reply::new(payload)
}

async fn increase_view(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    bump(db, params, Counter::View).await
}

async fn like(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    bump(db, params, Counter::Like).await
}

async fn collect(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    bump(db, params, Counter::Collect).await
}
