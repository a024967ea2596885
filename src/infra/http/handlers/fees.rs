use std::sync::Arc;

use serde::Serialize;

use crate::application::store::MockDatabase;
use crate::application::store::fees::FeeFilter;
use crate::domain::entities::FeeDetailRecord;
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{GET_POST, LIST_DELAY, TABLE_ROW};

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![MockEndpoint::new(
        "/app/fee.queryFeeDetail",
        GET_POST,
        LIST_DELAY,
        query_detail,
    )]
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeeDetailPage {
    fee_details: Vec<FeeDetailRecord>,
    total: usize,
    records: usize,
    page: u32,
    row: u32,
}

impl From<&ParamBag> for FeeFilter {
    fn from(params: &ParamBag) -> Self {
        Self {
            community_id: params.text("communityId"),
            fee_id: params.text("feeId"),
            room_id: params.text("roomId"),
        }
    }
}

async fn query_detail(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let slice = db
        .fees
        .list(&FeeFilter::from(&params), params.page_request(TABLE_ROW));
    Reply::new(FeeDetailPage {
        total: slice.total,
        records: slice.page_count(),
        page: slice.page,
        row: slice.page_size,
        fee_details: slice.list,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::store::fees::fee_id_for_room;

    fn bag(value: serde_json::Value) -> ParamBag {
        ParamBag::from_json(value).expect("object")
    }

    #[tokio::test]
    async fn default_page_holds_fifty_rows() {
        let reply = query_detail(Arc::new(MockDatabase::seeded(6)), bag(json!({})))
            .await
            .expect("query");
        assert_eq!(reply.data["total"], json!(100));
        assert_eq!(reply.data["records"], json!(2));
        assert_eq!(reply.data["row"], json!(50));
        assert_eq!(reply.data["feeDetails"].as_array().map(Vec::len), Some(50));
    }

    #[tokio::test]
    async fn filters_by_fee_id() {
        let db = Arc::new(MockDatabase::seeded(6));
        let fee_id = fee_id_for_room("ROOM_1_1_101");
        let reply = query_detail(db, bag(json!({"feeId": fee_id, "row": 100})))
            .await
            .expect("query");
        let rows = reply.data["feeDetails"].as_array().expect("rows");
        assert!(rows.len() >= 3);
        assert!(rows.iter().all(|row| row["feeId"] == json!(fee_id)));
    }
}
