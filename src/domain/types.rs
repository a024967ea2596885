//! Status vocabularies shared by the mock stores.
//!
//! Every enum keeps the exact wire string the mini-program sends and expects,
//! plus the human-readable label shown next to it (`statusName`, `stateName`).

use serde::{Deserialize, Serialize};

/// Lifecycle of a repair order.
///
/// `Pending → Assigned → InProgress → Completed`, with `Cancelled` reachable
/// from the three non-terminal states. Only membership in this set is checked
/// when a transition is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl RepairStatus {
    pub const ALL: [RepairStatus; 5] = [
        RepairStatus::Pending,
        RepairStatus::Assigned,
        RepairStatus::InProgress,
        RepairStatus::Completed,
        RepairStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Pending => "PENDING",
            RepairStatus::Assigned => "ASSIGNED",
            RepairStatus::InProgress => "IN_PROGRESS",
            RepairStatus::Completed => "COMPLETED",
            RepairStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepairStatus::Pending => "待派单",
            RepairStatus::Assigned => "已派单",
            RepairStatus::InProgress => "维修中",
            RepairStatus::Completed => "已完成",
            RepairStatus::Cancelled => "已取消",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RepairStatus::Completed | RepairStatus::Cancelled)
    }
}

impl TryFrom<&str> for RepairStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RepairStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl RepairPriority {
    pub const ALL: [RepairPriority; 4] = [
        RepairPriority::Low,
        RepairPriority::Normal,
        RepairPriority::High,
        RepairPriority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepairPriority::Low => "LOW",
            RepairPriority::Normal => "NORMAL",
            RepairPriority::High => "HIGH",
            RepairPriority::Urgent => "URGENT",
        }
    }
}

impl TryFrom<&str> for RepairPriority {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RepairPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == value)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 3] = [
        ActivityStatus::Upcoming,
        ActivityStatus::Ongoing,
        ActivityStatus::Ended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Upcoming => "UPCOMING",
            ActivityStatus::Ongoing => "ONGOING",
            ActivityStatus::Ended => "ENDED",
        }
    }
}

impl TryFrom<&str> for ActivityStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ActivityStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(())
    }
}

/// Complaint workflow: `W` waiting, `D` being handled, `C` closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintState {
    #[serde(rename = "W")]
    Waiting,
    #[serde(rename = "D")]
    Handling,
    #[serde(rename = "C")]
    Closed,
}

impl ComplaintState {
    pub const ALL: [ComplaintState; 3] = [
        ComplaintState::Waiting,
        ComplaintState::Handling,
        ComplaintState::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintState::Waiting => "W",
            ComplaintState::Handling => "D",
            ComplaintState::Closed => "C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplaintState::Waiting => "待处理",
            ComplaintState::Handling => "处理中",
            ComplaintState::Closed => "已完成",
        }
    }
}

impl TryFrom<&str> for ComplaintState {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ComplaintState::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintType {
    #[serde(rename = "809001")]
    Complaint,
    #[serde(rename = "809002")]
    Suggestion,
}

impl ComplaintType {
    pub const ALL: [ComplaintType; 2] = [ComplaintType::Complaint, ComplaintType::Suggestion];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintType::Complaint => "809001",
            ComplaintType::Suggestion => "809002",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplaintType::Complaint => "投诉",
            ComplaintType::Suggestion => "建议",
        }
    }
}

impl TryFrom<&str> for ComplaintType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ComplaintType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or(())
    }
}

/// Property application (room discount) state, carried on the wire as `'0'..'6'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyState {
    #[serde(rename = "0")]
    Draft,
    #[serde(rename = "1")]
    InspectionRequested,
    #[serde(rename = "2")]
    InspectionPassed,
    #[serde(rename = "3")]
    InspectionFailed,
    #[serde(rename = "4")]
    Approved,
    #[serde(rename = "5")]
    Rejected,
    #[serde(rename = "6")]
    Finished,
}

impl ApplyState {
    pub const ALL: [ApplyState; 7] = [
        ApplyState::Draft,
        ApplyState::InspectionRequested,
        ApplyState::InspectionPassed,
        ApplyState::InspectionFailed,
        ApplyState::Approved,
        ApplyState::Rejected,
        ApplyState::Finished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplyState::Draft => "0",
            ApplyState::InspectionRequested => "1",
            ApplyState::InspectionPassed => "2",
            ApplyState::InspectionFailed => "3",
            ApplyState::Approved => "4",
            ApplyState::Rejected => "5",
            ApplyState::Finished => "6",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplyState::Draft => "待提交",
            ApplyState::InspectionRequested => "申请验房",
            ApplyState::InspectionPassed => "验房通过",
            ApplyState::InspectionFailed => "验房不通过",
            ApplyState::Approved => "审批通过",
            ApplyState::Rejected => "审批不通过",
            ApplyState::Finished => "已完成",
        }
    }
}

impl TryFrom<&str> for ApplyState {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ApplyState::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or(())
    }
}

/// Media attached to an application tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "19000")]
    Image,
    #[serde(rename = "21000")]
    Video,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "19000",
            MediaType::Video => "21000",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeDetailState {
    #[serde(rename = "1400")]
    Paid,
    #[serde(rename = "1300")]
    Refunded,
}

impl FeeDetailState {
    pub fn as_str(self) -> &'static str {
        match self {
            FeeDetailState::Paid => "1400",
            FeeDetailState::Refunded => "1300",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeeDetailState::Paid => "已缴费",
            FeeDetailState::Refunded => "已退费",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_status_parses_only_known_strings() {
        for status in RepairStatus::ALL {
            assert_eq!(RepairStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(RepairStatus::try_from("NOT_A_REAL_STATUS").is_err());
        assert!(RepairStatus::try_from("pending").is_err());
    }

    #[test]
    fn repair_status_serializes_as_wire_string() {
        let json = serde_json::to_string(&RepairStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        assert!(RepairStatus::Cancelled.is_terminal());
        assert!(!RepairStatus::Assigned.is_terminal());
    }

    #[test]
    fn apply_state_covers_zero_through_six() {
        let wire: Vec<&str> = ApplyState::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(wire, ["0", "1", "2", "3", "4", "5", "6"]);
        assert_eq!(ApplyState::try_from("4"), Ok(ApplyState::Approved));
        assert!(ApplyState::try_from("7").is_err());
        let json = serde_json::to_string(&ApplyState::Finished).expect("serialize");
        assert_eq!(json, "\"6\"");
    }

    #[test]
    fn complaint_vocabularies_round_trip_wire_codes() {
        assert_eq!(ComplaintState::try_from("D"), Ok(ComplaintState::Handling));
        assert_eq!(ComplaintType::try_from("809002"), Ok(ComplaintType::Suggestion));
        assert!(ComplaintType::try_from("809003").is_err());
    }
}
