use std::sync::Arc;

use serde::Serialize;

use crate::application::store::MockDatabase;
use crate::application::store::locations::{FloorFilter, RoomFilter};
use crate::domain::entities::{FloorRecord, RoomRecord};
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{GET_POST, SELECTOR_DELAY, TABLE_ROW};

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new("/app/floor.queryFloors", GET_POST, SELECTOR_DELAY, floors),
        MockEndpoint::new("/app/unit.queryUnits", GET_POST, SELECTOR_DELAY, units),
        MockEndpoint::new("/app/room.queryRooms", GET_POST, SELECTOR_DELAY, rooms),
    ]
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FloorList {
    api_floor_data_vo_list: Vec<FloorRecord>,
    total: usize,
}

#[derive(Serialize)]
struct RoomPage {
    rooms: Vec<RoomRecord>,
    total: usize,
    page: u32,
    row: u32,
}

impl From<&ParamBag> for RoomFilter {
    fn from(params: &ParamBag) -> Self {
        Self {
            community_id: params.text("communityId"),
            floor_id: params.text("floorId"),
            unit_id: params.text("unitId"),
            room_num: params.text("roomNum"),
            state: params.text("state"),
        }
    }
}

async fn floors(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let filter = FloorFilter {
        community_id: params.text("communityId"),
        floor_num: params.text("floorNum"),
    };
    let slice = db
        .locations
        .list_floors(&filter, params.page_request(TABLE_ROW));
    Reply::new(FloorList {
        total: slice.total,
        api_floor_data_vo_list: slice.list,
    })
}

async fn units(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let floor_id = params.require("floorId", "楼栋ID不能为空")?;
    let community_id = params.text("communityId");
    Reply::new(db.locations.list_units(&floor_id, community_id.as_deref()))
}

async fn rooms(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let slice = db
        .locations
        .list_rooms(&RoomFilter::from(&params), params.page_request(TABLE_ROW));
    Reply::new(RoomPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        rooms: slice.list,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn db() -> Arc<MockDatabase> {
        Arc::new(MockDatabase::seeded(12))
    }

    fn bag(value: serde_json::Value) -> ParamBag {
        ParamBag::from_json(value).expect("object")
    }

    #[tokio::test]
    async fn floors_use_selector_shape() {
        let reply = floors(db(), bag(json!({"communityId": "COMM_001"})))
            .await
            .expect("floors");
        assert_eq!(reply.data["total"], json!(3));
        assert_eq!(reply.data["apiFloorDataVoList"][0]["floorName"], json!("1栋"));
    }

    #[tokio::test]
    async fn units_require_floor() {
        let err = units(db(), bag(json!({}))).await.expect_err("floorId");
        assert_eq!(err.code(), 400);
        assert_eq!(err.public_message(), "楼栋ID不能为空");

        let reply = units(db(), bag(json!({"floorId": "FLOOR_002"})))
            .await
            .expect("units");
        let units = reply.data.as_array().expect("array");
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| u["floorId"] == json!("FLOOR_002")));
    }

    #[tokio::test]
    async fn rooms_filter_by_unit() {
        let reply = rooms(db(), bag(json!({"unitId": "UNIT_1_2", "roomNum": "10"})))
            .await
            .expect("rooms");
        let rooms = reply.data["rooms"].as_array().expect("rooms");
        assert_eq!(rooms.len(), 2);
        assert!(rooms.iter().all(|r| r["unitId"] == json!("UNIT_1_2")));
    }
}
