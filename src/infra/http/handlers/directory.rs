use std::sync::Arc;

use serde::Serialize;

use crate::application::store::MockDatabase;
use crate::application::store::directory::{ContactFilter, StaffFilter};
use crate::domain::entities::{ContactRecord, StaffRecord};
use crate::infra::http::params::ParamBag;
use crate::infra::http::registry::{HandlerResult, MockEndpoint, Reply};

use super::{GET_POST, LIST_DELAY, SELECTOR_DELAY, TABLE_ROW};

pub(super) fn endpoints() -> Vec<MockEndpoint> {
    vec![
        MockEndpoint::new("/app/query.staff.infos", GET_POST, LIST_DELAY, list_staff),
        MockEndpoint::new(
            "/app/staff.groupByInitial",
            GET_POST,
            SELECTOR_DELAY,
            group_by_initial,
        ),
        MockEndpoint::new("/app/contact.listContacts", GET_POST, LIST_DELAY, list_contacts),
    ]
}

#[derive(Serialize)]
struct StaffPage {
    staffs: Vec<StaffRecord>,
    total: usize,
    page: u32,
    row: u32,
}

#[derive(Serialize)]
struct ContactPage {
    contacts: Vec<ContactRecord>,
    total: usize,
    page: u32,
    row: u32,
}

impl From<&ParamBag> for StaffFilter {
    fn from(params: &ParamBag) -> Self {
        Self {
            org_name: params.text("orgName"),
            keyword: params.text("keyword").or_else(|| params.text("name")),
        }
    }
}

impl From<&ParamBag> for ContactFilter {
    fn from(params: &ParamBag) -> Self {
        Self {
            department: params.text("department"),
            keyword: params.text("keyword"),
        }
    }
}

async fn list_staff(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let slice = db
        .directory
        .list_staff(&StaffFilter::from(&params), params.page_request(TABLE_ROW));
    Reply::new(StaffPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        staffs: slice.list,
    })
}

async fn group_by_initial(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    Reply::new(db.directory.group_by_initial(&StaffFilter::from(&params)))
}

async fn list_contacts(db: Arc<MockDatabase>, params: ParamBag) -> HandlerResult {
    let slice = db
        .directory
        .list_contacts(&ContactFilter::from(&params), params.page_request(TABLE_ROW));
    Reply::new(ContactPage {
        total: slice.total,
        page: slice.page,
        row: slice.page_size,
        contacts: slice.list,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn db() -> Arc<MockDatabase> {
        Arc::new(MockDatabase::seeded(9))
    }

    fn bag(value: serde_json::Value) -> ParamBag {
        ParamBag::from_json(value).expect("object")
    }

    #[tokio::test]
    async fn staff_keyword_matches_phone() {
        let reply = list_staff(db(), bag(json!({"keyword": "13800000003"})))
            .await
            .expect("staff");
        assert_eq!(reply.data["total"], json!(1));
        assert_eq!(reply.data["staffs"][0]["name"], json!("王强"));
    }

    #[tokio::test]
    async fn groups_are_sorted_and_cover_every_staff() {
        let reply = group_by_initial(db(), bag(json!({})))
            .await
            .expect("groups");
        let groups = reply.data.as_array().expect("array");
        let initials: Vec<&str> = groups
            .iter()
            .filter_map(|group| group["initial"].as_str())
            .collect();
        let mut sorted = initials.clone();
        sorted.sort_unstable_by(|a, b| match (*a, *b) {
            ("#", "#") => std::cmp::Ordering::Equal,
            ("#", _) => std::cmp::Ordering::Greater,
            (_, "#") => std::cmp::Ordering::Less,
            (a, b) => a.cmp(b),
        });
        assert_eq!(initials, sorted);

        let members: usize = groups
            .iter()
            .filter_map(|group| group["staffs"].as_array().map(Vec::len))
            .sum();
        assert_eq!(members, 40);
    }

    #[tokio::test]
    async fn contacts_filter_by_department() {
        let reply = list_contacts(db(), bag(json!({"department": "工程部"})))
            .await
            .expect("contacts");
        let contacts = reply.data["contacts"].as_array().expect("contacts");
        assert!(!contacts.is_empty());
        assert!(contacts.iter().all(|c| c["department"] == json!("工程部")));
    }
}
