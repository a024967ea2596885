use std::sync::Arc;

use serde::Serialize;

use crate::application::error::AppError;
use crate::application::pagination::PageRequest;
use crate::application::store::MockDatabase;
use crate::application::store::apply_room::{
    ApplyRoomFilter, ApplyRoomPatch, NewApplyRecord, NewApplyRoom,
};
use crate::domain::entities::{ApplyRecordDetail, ApplyRecordEntry, ApplyRoomRecord};
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{FEED_ROW, GET_POST, LIST_DELAY, POST, WRITE_DELAY, missing};

const APPLICATION_NOT_FOUND: &str = "申请记录不存在";
const RECORD_NOT_FOUND: &str = "跟踪记录不存在";
const ARD_REQUIRED: &str = "申请ID不能为空";
const ARDR_REQUIRED: &str = "跟踪记录ID不能为空";

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new(
            "/app/applyRoomDiscount/queryApplyRoomDiscount",
            GET_POST,
            LIST_DELAY,
            query,
        ),
        MockEndpoint::new("/app/applyRoomDiscount/saveApplyRoomDiscount", POST, WRITE_DELAY, save),
        MockEndpoint::new(
            "/app/applyRoomDiscount/updateApplyRoomDiscount",
            POST,
            WRITE_DELAY,
            update,
        ),
        MockEndpoint::new(
            "/app/applyRoomDiscount/deleteApplyRoomDiscount",
            POST,
            WRITE_DELAY,
            delete,
        ),
        MockEndpoint::new(
            "/app/applyRoomDiscountRecord/queryApplyRoomDiscountRecord",
            GET_POST,
            LIST_DELAY,
            query_records,
        ),
        MockEndpoint::new(
            "/app/applyRoomDiscountRecord/addApplyRoomDiscountRecord",
            POST,
            WRITE_DELAY,
            add_record,
        ),
        MockEndpoint::new(
            "/app/applyRoomDiscountRecord/cutApplyRoomDiscountRecord",
            POST,
            WRITE_DELAY,
            cut_record,
        ),
        MockEndpoint::new(
            "/app/applyRoomDiscountRecordDetail/queryApplyRoomDiscountRecordDetail",
            GET_POST,
            LIST_DELAY,
            query_details,
        ),
    ]
}

/// `records` is the page count, `total` the row count.
#[derive(Serialize)]
struct ApplicationPage {
    data: Vec<ApplyRoomRecord>,
    total: usize,
    records: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
struct RecordPage {
    data: Vec<ApplyRecordEntry>,
    total: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
struct DetailList {
    data: Vec<ApplyRecordDetail>,
    total: usize,
}

#[derive(Serialize)]
struct RecordWithDetails {
    #[serde(flatten)]
    record: ApplyRecordEntry,
    details: Vec<ApplyRecordDetail>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedApplication {
    ard_id: String,
    records: usize,
    details: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CutRecord {
    ardr_id: String,
    details: usize,
}

struct QueryApplicationsRequest {
    filter: ApplyRoomFilter,
    page: PageRequest,
}

impl From<&ParamBag> for QueryApplicationsRequest {
    fn from(params: &ParamBag) -> Self {
        Self {
            filter: ApplyRoomFilter {
                community_id: params.text("communityId"),
                ard_id: params.text("ardId"),
                room_id: params.text("roomId"),
                state: params.text("state"),
                apply_type: params.text("applyType"),
                keyword: params.text("keyword"),
            },
            page: params.page_request(FEED_ROW),
        }
    }
}

impl TryFrom<&ParamBag> for NewApplyRoom {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        Ok(Self {
            room_id: params.require("roomId", "房屋ID不能为空")?,
            room_name: params.require("roomName", "房屋名称不能为空")?,
            apply_type: params.require("applyType", "申请类型不能为空")?,
            start_time: params.require("startTime", "开始时间不能为空")?,
            end_time: params.require("endTime", "结束时间不能为空")?,
            create_user_name: params.require("createUserName", "申请人不能为空")?,
            create_user_tel: params.require("createUserTel", "申请人电话不能为空")?,
            discount_type: params.text("discountType"),
            create_remark: params.text("createRemark"),
            fee_id: params.text("feeId"),
            community_id: params.text("communityId"),
        })
    }
}

impl From<&ParamBag> for ApplyRoomPatch {
    fn from(params: &ParamBag) -> Self {
        Self {
            state: params.text("state"),
            start_time: params.text("startTime"),
            end_time: params.text("endTime"),
            discount_type: params.text("discountType"),
            create_remark: params.text("createRemark"),
            check_remark: params.text("checkRemark"),
            review_remark: params.text("reviewRemark"),
            fee_id: params.text("feeId"),
        }
    }
}

impl TryFrom<&ParamBag> for NewApplyRecord {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        Ok(Self {
            ard_id: params.require("ardId", ARD_REQUIRED)?,
            state: params.require("state", "状态不能为空")?,
            remark: params.text("remark"),
            create_user_name: params.text("createUserName"),
            photos: params.list("photos"),
            videos: params.list("videos"),
        })
    }
}

async fn query(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = QueryApplicationsRequest::from(&params);

    if let Some(id) = request.filter.ard_id.as_deref() {
        let record = db
            .apply_rooms
            .get(id)
            .await
            .ok_or_else(|| AppError::not_found(APPLICATION_NOT_FOUND))?;
        return Reply::new(ApplicationPage {
            data: vec![record],
            total: 1,
            records: 1,
            page: 1,
            row: request.page.row(),
        });
    }

    let slice = db.apply_rooms.list(&request.filter, request.page).await;
    Reply::new(ApplicationPage {
        total: slice.total,
        records: slice.page_count(),
        page: slice.page,
        row: slice.page_size,
        data: slice.list,
    })
}

async fn save(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let input = NewApplyRoom::try_from(&params)?;
    let record = db.apply_rooms.create(input).await?;
    Ok(Reply::new(record)?.with_message("申请提交成功"))
}

async fn update(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let ard_id = params.require("ardId", ARD_REQUIRED)?;
    let record = db
        .apply_rooms
        .update(&ard_id, ApplyRoomPatch::from(&params))
        .await
        .map_err(missing(APPLICATION_NOT_FOUND))?;
    Ok(Reply::new(record)?.with_message("更新成功"))
}

async fn delete(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let ard_id = params.require("ardId", ARD_REQUIRED)?;
    let removed = db
        .apply_rooms
        .delete(&ard_id)
        .await
        .ok_or_else(|| AppError::not_found(APPLICATION_NOT_FOUND))?;
    Ok(Reply::new(DeletedApplication {
        ard_id,
        records: removed.records,
        details: removed.details,
    })?
    .with_message("删除成功"))
}

async fn query_records(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let ard_id = params.require("ardId", ARD_REQUIRED)?;
    if db.apply_rooms.get(&ard_id).await.is_none() {
        return Err(AppError::not_found(APPLICATION_NOT_FOUND));
    }
    let slice = db
        .apply_rooms
        .list_records(&ard_id, params.page_request(FEED_ROW))
        .await;
    Reply::new(RecordPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        data: slice.list,
    })
}

async fn add_record(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let input = NewApplyRecord::try_from(&params)?;
    let (record, details) = db
        .apply_rooms
        .add_record(input)
        .await
        .map_err(missing(APPLICATION_NOT_FOUND))?;
    Ok(Reply::new(RecordWithDetails { record, details })?.with_message("跟踪记录添加成功"))
}

async fn cut_record(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let ardr_id = params.require("ardrId", ARDR_REQUIRED)?;
    let details = db
        .apply_rooms
        .cut_record(&ardr_id)
        .await
        .ok_or_else(|| AppError::not_found(RECORD_NOT_FOUND))?;
    Ok(Reply::new(CutRecord { ardr_id, details })?.with_message("删除成功"))
}

async fn query_details(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let ardr_id = params.require("ardrId", ARDR_REQUIRED)?;
    let data = db.apply_rooms.list_details(&ardr_id).await;
    Reply::new(DetailList {
        total: data.len(),
        data,
    })
}
