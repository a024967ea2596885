use std::sync::Arc;

use serde::Serialize;

use crate::application::error::AppError;
use crate::application::pagination::PageRequest;
use crate::application::store::MockDatabase;
use crate::application::store::repairs::{Assignee, NewRepair, RepairFilter};
use crate::domain::entities::RepairRecord;
use crate::domain::types::RepairPriority;
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{FEED_ROW, GET_POST, LIST_DELAY, POST, POST_DELETE, WRITE_DELAY, missing};

const REPAIR_NOT_FOUND: &str = "报修单不存在";
const ID_REQUIRED: &str = "报修单ID不能为空";
const SCORE_RANGE: &str = "评分必须在1到5之间";

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new("/app/ownerRepair.listOwnerRepairs", GET_POST, LIST_DELAY, list),
        MockEndpoint::new("/app/ownerRepair.saveOwnerRepair", POST, WRITE_DELAY, save),
        MockEndpoint::new("/app/ownerRepair.updateRepairStatus", POST, WRITE_DELAY, update_status),
        MockEndpoint::new("/app/ownerRepair.evaluateRepair", POST, WRITE_DELAY, evaluate),
        MockEndpoint::new("/app/ownerRepair.deleteOwnerRepair", POST_DELETE, WRITE_DELAY, delete),
    ]
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairPage {
    owner_repairs: Vec<RepairRecord>,
    total: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairEnvelope {
    owner_repair: RepairRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RepairRef {
    repair_id: String,
}

struct ListRepairsRequest {
    filter: RepairFilter,
    page: PageRequest,
}

impl From<&ParamBag> for ListRepairsRequest {
    fn from(params: &ParamBag) -> Self {
        Self {
            filter: RepairFilter {
                community_id: params.text("communityId"),
                repair_id: params.text("repairId"),
                status: params.text("status"),
                repair_type: params.text("repairType"),
                owner_phone: params.text("ownerPhone"),
                keyword: params.text("keyword"),
            },
            page: params.page_request(FEED_ROW),
        }
    }
}

impl TryFrom<&ParamBag> for NewRepair {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        let priority = params
            .text("priority")
            .map(|raw| {
                RepairPriority::try_from(raw.as_str())
                    .map_err(|_| AppError::validation(format!("无效的优先级: {raw}")))
            })
            .transpose()?;

        Ok(Self {
            title: params.require("title", "报修标题不能为空")?,
            description: params.require("description", "问题描述不能为空")?,
            owner_name: params.require("ownerName", "报修人姓名不能为空")?,
            owner_phone: params.require("ownerPhone", "联系电话不能为空")?,
            address: params.require("address", "报修地址不能为空")?,
            repair_type: params.text("repairType"),
            community_id: params.text("communityId"),
            priority,
            appointment_time: params.text("appointmentTime"),
            images: params.list("images"),
        })
    }
}

struct StatusChangeRequest {
    repair_id: String,
    status: String,
    assignee: Option<Assignee>,
}

impl TryFrom<&ParamBag> for StatusChangeRequest {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        Ok(Self {
            repair_id: params.require("repairId", ID_REQUIRED)?,
            status: params.require("status", "报修状态不能为空")?,
            assignee: params.text("assigneeName").map(|name| Assignee {
                name,
                phone: params.text("assigneePhone"),
            }),
        })
    }
}

struct EvaluateRequest {
    repair_id: String,
    score: u8,
    content: String,
}

impl TryFrom<&ParamBag> for EvaluateRequest {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        let repair_id = params.require("repairId", ID_REQUIRED)?;
        let score = params
            .number::<u8>("score", SCORE_RANGE)?
            .ok_or_else(|| AppError::validation("评分不能为空"))?;
        Ok(Self {
            repair_id,
            score,
            content: params.text("content").unwrap_or_default(),
        })
    }
}

async fn list(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = ListRepairsRequest::from(&params);

    if let Some(id) = request.filter.repair_id.as_deref() {
        let record = db
            .repairs
            .get(id)
            .await
            .ok_or_else(|| AppError::not_found(REPAIR_NOT_FOUND))?;
        return Reply::new(RepairPage {
            owner_repairs: vec![record],
            total: 1,
            page: 1,
            row: request.page.row(),
        });
    }

    let slice = db.repairs.list(&request.filter, request.page).await;
    Reply::new(RepairPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        owner_repairs: slice.list,
    })
}

async fn save(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let input = NewRepair::try_from(&params)?;
    let owner_repair = db.repairs.create(input).await?;
    Ok(Reply::new(RepairEnvelope { owner_repair })?.with_message("报修提交成功"))
}

async fn update_status(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = StatusChangeRequest::try_from(&params)?;
    let owner_repair = db
        .repairs
        .update_status(&request.repair_id, &request.status, request.assignee)
        .await
        .map_err(missing(REPAIR_NOT_FOUND))?;
    Ok(Reply::new(RepairEnvelope { owner_repair })?.with_message("状态更新成功"))
}

async fn evaluate(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = EvaluateRequest::try_from(&params)?;
    let owner_repair = db
        .repairs
        .evaluate(&request.repair_id, request.score, request.content)
        .await
        .map_err(missing(REPAIR_NOT_FOUND))?;
    Ok(Reply::new(RepairEnvelope { owner_repair })?.with_message("评价成功"))
}

async fn delete(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let repair_id = params.require("repairId", ID_REQUIRED)?;
    if !db.repairs.delete(&repair_id).await {
        return Err(AppError::not_found(REPAIR_NOT_FOUND));
    }
    Ok(Reply::new(RepairRef { repair_id })?.with_message("删除成功"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::types::RepairStatus;

    fn db() -> Arc<MockDatabase> {
        Arc::new(MockDatabase::seeded(2))
    }

    fn bag(value: serde_json::Value) -> ParamBag {
        ParamBag::from_json(value).expect("object")
    }

    #[tokio::test]
    async fn save_without_phone_is_rejected_without_insert() {
        let db = db();
        let before = db.repairs.len().await;
        let err = save(
            db.clone(),
            bag(json!({
                "title": "水管漏水",
                "description": "厨房水管接口漏水",
                "ownerName": "张伟",
                "address": "1栋1单元101"
            })),
        )
        .await
        .expect_err("missing phone");
        assert_eq!(err.code(), 400);
        assert_eq!(err.public_message(), "联系电话不能为空");
        assert_eq!(db.repairs.len().await, before);
    }

    #[tokio::test]
    async fn save_returns_wrapped_order() {
        let db = db();
        let reply = save(
            db.clone(),
            bag(json!({
                "title": "水管漏水",
                "description": "厨房水管接口漏水",
                "ownerName": "张伟",
                "ownerPhone": "13800138000",
                "address": "1栋1单元101",
                "images": ["/tmp/1.jpg"]
            })),
        )
        .await
        .expect("save");
        assert_eq!(reply.data["ownerRepair"]["status"], json!("PENDING"));
        assert_eq!(reply.data["ownerRepair"]["images"], json!(["/tmp/1.jpg"]));
    }

    #[tokio::test]
    async fn illegal_status_leaves_order_untouched() {
        let db = db();
        let err = update_status(
            db.clone(),
            bag(json!({"repairId": "REPAIR_001", "status": "NOT_A_REAL_STATUS"})),
        )
        .await
        .expect_err("illegal");
        assert_eq!(err.code(), 400);
        let record = db.repairs.get("REPAIR_001").await.expect("fixture");
        assert_eq!(record.status, RepairStatus::Pending);
    }

    #[tokio::test]
    async fn assignment_carries_assignee() {
        let reply = update_status(
            db(),
            bag(json!({
                "repairId": "REPAIR_001",
                "status": "ASSIGNED",
                "assigneeName": "赵师傅",
                "assigneePhone": "13912345678"
            })),
        )
        .await
        .expect("assign");
        assert_eq!(reply.data["ownerRepair"]["statusName"], json!("已派单"));
        assert_eq!(reply.data["ownerRepair"]["assigneeName"], json!("赵师傅"));
    }

    #[tokio::test]
    async fn evaluation_score_is_validated() {
        let db = db();
        let err = evaluate(db.clone(), bag(json!({"repairId": "REPAIR_002", "score": "abc"})))
            .await
            .expect_err("bad score");
        assert_eq!(err.public_message(), SCORE_RANGE);

        let err = evaluate(db.clone(), bag(json!({"repairId": "REPAIR_001", "score": 5})))
            .await
            .expect_err("not completed");
        assert_eq!(err.code(), 400);

        let err = evaluate(db.clone(), bag(json!({"repairId": "REPAIR_404", "score": 5})))
            .await
            .expect_err("missing");
        assert_eq!(err.public_message(), REPAIR_NOT_FOUND);
    }
}
