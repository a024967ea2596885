//! Records held by the in-memory stores, serialized with the field names the
//! mini-program reads.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{
    ActivityStatus, ApplyState, ComplaintState, ComplaintType, FeeDetailState, MediaType,
    RepairPriority, RepairStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub activities_id: String,
    pub title: String,
    pub type_cd: String,
    pub header_img: String,
    pub context: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub user_name: String,
    pub community_id: String,
    pub status: ActivityStatus,
    pub view_count: u64,
    pub like_count: u64,
    pub collect_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEvaluation {
    pub score: u8,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub evaluate_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRecord {
    pub repair_id: String,
    pub title: String,
    pub description: String,
    pub repair_type: String,
    pub repair_type_name: String,
    pub owner_name: String,
    pub owner_phone: String,
    pub address: String,
    pub community_id: String,
    pub status: RepairStatus,
    pub status_name: String,
    pub priority: RepairPriority,
    pub appointment_time: Option<String>,
    pub images: Vec<String>,
    pub assignee_name: Option<String>,
    pub assignee_phone: Option<String>,
    pub evaluation: Option<RepairEvaluation>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    pub complaint_id: String,
    pub type_cd: ComplaintType,
    pub type_name: String,
    pub complaint_name: String,
    pub context: String,
    pub tel: String,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub community_id: String,
    pub state: ComplaintState,
    pub state_name: String,
    pub reply: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

/// A property application ("apply room discount").
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRoomRecord {
    pub ard_id: String,
    pub room_id: String,
    pub room_name: String,
    pub community_id: String,
    pub discount_type: String,
    pub apply_type: String,
    pub apply_type_name: String,
    pub create_user_name: String,
    pub create_user_tel: String,
    pub start_time: String,
    pub end_time: String,
    pub create_remark: Option<String>,
    pub check_remark: Option<String>,
    pub review_remark: Option<String>,
    pub state: ApplyState,
    pub state_name: String,
    pub fee_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

/// Tracking entry owned by an application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRecordEntry {
    pub ardr_id: String,
    pub ard_id: String,
    pub state: ApplyState,
    pub state_name: String,
    pub remark: String,
    pub create_user_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
}

/// Media row owned by a tracking entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRecordDetail {
    pub ardrd_id: String,
    pub ardr_id: String,
    pub rel_type_cd: MediaType,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDetailRecord {
    pub detail_id: String,
    pub fee_id: String,
    pub room_id: String,
    pub community_id: String,
    pub cycles: u32,
    pub receivable_amount: f64,
    pub received_amount: f64,
    pub prime_rate: String,
    pub start_time: String,
    pub end_time: String,
    pub state: FeeDetailState,
    pub state_name: String,
    pub remark: String,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub staff_id: String,
    pub name: String,
    pub tel: String,
    pub email: String,
    pub org_name: String,
    pub rel_cd: String,
    pub rel_cd_name: String,
    pub avatar: String,
    pub store_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub contact_id: String,
    pub name: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorRecord {
    pub floor_id: String,
    pub floor_num: String,
    pub floor_name: String,
    pub community_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub unit_id: String,
    pub floor_id: String,
    pub unit_num: String,
    pub layer_count: u32,
    pub community_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub room_id: String,
    pub unit_id: String,
    pub floor_id: String,
    pub room_num: String,
    pub layer: u32,
    pub room_name: String,
    pub built_up_area: f64,
    pub state: String,
    pub community_id: String,
}
