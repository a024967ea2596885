use std::sync::Arc;

use serde::Serialize;

use crate::application::error::AppError;
use crate::application::pagination::PageRequest;
use crate::application::store::MockDatabase;
use crate::application::store::complaints::{ComplaintFilter, NewComplaint};
use crate::domain::entities::ComplaintRecord;
use crate::domain::types::ComplaintType;
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{FEED_ROW, GET_POST, LIST_DELAY, POST, POST_DELETE, WRITE_DELAY, missing};

const COMPLAINT_NOT_FOUND: &str = "投诉不存在";
const ID_REQUIRED: &str = "投诉ID不能为空";

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new("/app/complaint.listComplaints", GET_POST, LIST_DELAY, list),
        MockEndpoint::new("/app/complaint.saveComplaint", POST, WRITE_DELAY, save),
        MockEndpoint::new("/app/complaint.updateComplaintState", POST, WRITE_DELAY, update_state),
        MockEndpoint::new("/app/complaint.deleteComplaint", POST_DELETE, WRITE_DELAY, delete),
    ]
}

#[derive(Serialize)]
struct ComplaintPage {
    complaints: Vec<ComplaintRecord>,
    total: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
struct ComplaintEnvelope {
    complaint: ComplaintRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComplaintRef {
    complaint_id: String,
}

struct ListComplaintsRequest {
    filter: ComplaintFilter,
    page: PageRequest,
}

impl From<&ParamBag> for ListComplaintsRequest {
    fn from(params: &ParamBag) -> Self {
        Self {
            filter: ComplaintFilter {
                community_id: params.text("communityId"),
                complaint_id: params.text("complaintId"),
                state: params.text("state"),
                type_cd: params.text("typeCd"),
                tel: params.text("tel"),
                keyword: params.text("keyword"),
            },
            page: params.page_request(FEED_ROW),
        }
    }
}

impl TryFrom<&ParamBag> for NewComplaint {
    type Error = AppError;

    fn try_from(params: &ParamBag) -> Result<Self, Self::Error> {
        let raw_type = params.require("typeCd", "投诉类型不能为空")?;
        let type_cd = ComplaintType::try_from(raw_type.as_str())
            .map_err(|_| AppError::validation(format!("无效的投诉类型: {raw_type}")))?;

        Ok(Self {
            type_cd,
            complaint_name: params.require("complaintName", "投诉标题不能为空")?,
            tel: params.require("tel", "联系电话不能为空")?,
            context: params.require("context", "投诉内容不能为空")?,
            room_id: params.text("roomId"),
            room_name: params.text("roomName"),
            community_id: params.text("communityId"),
        })
    }
}

async fn list(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let request = ListComplaintsRequest::from(&params);

    if let Some(id) = request.filter.complaint_id.as_deref() {
        let record = db
            .complaints
            .get(id)
            .await
            .ok_or_else(|| AppError::not_found(COMPLAINT_NOT_FOUND))?;
        return Reply::new(ComplaintPage {
            complaints: vec![record],
            total: 1,
            page: 1,
            row: request.page.row(),
        });
    }

    let slice = db.complaints.list(&request.filter, request.page).await;
    Reply::new(ComplaintPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        complaints: slice.list,
    })
}

async fn save(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let input = NewComplaint::try_from(&params)?;
    let complaint = db.complaints.create(input).await?;
    Ok(Reply::new(ComplaintEnvelope { complaint })?.with_message("提交成功"))
}

async fn update_state(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let complaint_id = params.require("complaintId", ID_REQUIRED)?;
    let state = params.require("state", "投诉状态不能为空")?;
    let complaint = db
        .complaints
        .update_state(&complaint_id, &state, params.text("reply"))
        .await
        .map_err(missing(COMPLAINT_NOT_FOUND))?;
    Ok(Reply::new(ComplaintEnvelope { complaint })?.with_message("状态更新成功"))
}

async fn delete(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let complaint_id = params.require("complaintId", ID_REQUIRED)?;
    if !db.complaints.delete(&complaint_id).await {
        return Err(AppError::not_found(COMPLAINT_NOT_FOUND));
    }
    Ok(Reply::new(ComplaintRef { complaint_id })?.with_message("删除成功"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn db() -> Arc<MockDatabase> {
        Arc::new(MockDatabase::seeded(3))
    }

    fn bag(value: serde_json::Value) -> ParamBag {
        ParamBag::from_json(value).expect("object")
    }

    #[tokio::test]
    async fn save_validates_type_code() {
        let err = save(
            db(),
            bag(json!({
                "typeCd": "1",
                "complaintName": "噪音",
                "tel": "13800000000",
                "context": "太吵"
            })),
        )
        .await
        .expect_err("bad type");
        assert_eq!(err.code(), 400);

        let reply = save(
            db(),
            bag(json!({
                "typeCd": "809002",
                "complaintName": "建议",
                "tel": "13800000000",
                "context": "加装路灯"
            })),
        )
        .await
        .expect("save");
        assert_eq!(reply.data["complaint"]["typeName"], json!("建议"));
        assert_eq!(reply.data["complaint"]["state"], json!("W"));
    }

    #[tokio::test]
    async fn state_update_maps_missing_and_illegal() {
        let db = db();
        let err = update_state(db.clone(), bag(json!({"complaintId": "CMP_404", "state": "C"})))
            .await
            .expect_err("missing");
        assert_eq!(err.public_message(), COMPLAINT_NOT_FOUND);

        let err = update_state(db.clone(), bag(json!({"complaintId": "CMP_001", "state": "Z"})))
            .await
            .expect_err("illegal");
        assert_eq!(err.code(), 400);

        let reply = update_state(db, bag(json!({"complaintId": "CMP_001", "state": "D"})))
            .await
            .expect("handling");
        assert_eq!(reply.data["complaint"]["stateName"], json!("处理中"));
    }
}
