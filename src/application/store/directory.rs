//! Staff and contact directories. Read-only after seeding.

use rand::rngs::StdRng;
use serde::Serialize;

use crate::application::generators::{pick, random_name, random_phone};
use crate::application::pagination::{PageRequest, PageSlice};
use crate::domain::entities::{ContactRecord, StaffRecord};
use crate::domain::initials::group_by_initial;

use super::{Collection, Record};

const STAFF_TARGET: usize = 40;
const CONTACT_TARGET: usize = 20;
const STORE_ID: &str = "STORE_001";

const ORGS: &[&str] = &["客服部", "工程部", "保安部", "保洁部", "财务部"];

const POSITIONS: &[(&str, &str)] = &[
    ("1000", "经理"),
    ("1001", "主管"),
    ("1002", "管家"),
    ("1003", "维修工"),
    ("1004", "保安员"),
    ("1005", "保洁员"),
];

impl Record for StaffRecord {
    const ENTITY: &'static str = "staff";

    fn id(&self) -> &str {
        &self.staff_id
    }
}

impl Record for ContactRecord {
    const ENTITY: &'static str = "contact";

    fn id(&self) -> &str {
        &self.contact_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub org_name: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub department: Option<String>,
    pub keyword: Option<String>,
}

/// One index letter and the staff filed under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialGroup {
    pub initial: String,
    pub staffs: Vec<StaffRecord>,
}

pub struct DirectoryStore {
    staff: Collection<StaffRecord>,
    contacts: Collection<ContactRecord>,
}

fn staff(index: usize, name: &str, tel: &str, org: &str, position: (&str, &str)) -> StaffRecord {
    StaffRecord {
        staff_id: format!("STAFF_{index:03}"),
        name: name.to_string(),
        tel: tel.to_string(),
        email: format!("staff{index:03}@property.example.com"),
        org_name: org.to_string(),
        rel_cd: position.0.to_string(),
        rel_cd_name: position.1.to_string(),
        avatar: format!("/static/images/avatar/{}.png", index % 8 + 1),
        store_id: STORE_ID.to_string(),
    }
}

fn contact(
    index: usize,
    name: &str,
    phone: &str,
    department: &str,
    position: &str,
) -> ContactRecord {
    ContactRecord {
        contact_id: format!("CONTACT_{index:03}"),
        name: name.to_string(),
        phone: phone.to_string(),
        department: department.to_string(),
        position: position.to_string(),
        avatar: format!("/static/images/avatar/{}.png", index % 8 + 1),
    }
}

impl DirectoryStore {
    pub fn seeded(rng: &mut StdRng) -> Self {
        let mut staff_rows = Collection::new();
        let literal_staff = [
            ("张伟", "13800000001", "客服部", POSITIONS[0]),
            ("李娜", "13800000002", "客服部", POSITIONS[2]),
            ("王强", "13800000003", "工程部", POSITIONS[1]),
            ("赵磊", "13800000004", "工程部", POSITIONS[3]),
            ("陈静", "13800000005", "财务部", POSITIONS[1]),
            ("Alice", "13800000006", "客服部", POSITIONS[2]),
        ];
        for (offset, (name, tel, org, position)) in literal_staff.into_iter().enumerate() {
            staff_rows.seed(staff(offset + 1, name, tel, org, position));
        }
        while staff_rows.len() < STAFF_TARGET {
            let index = staff_rows.len() + 1;
            let name = random_name(rng);
            let tel = random_phone(rng);
            let org = *pick(rng, ORGS);
            let position = *pick(rng, POSITIONS);
            if !staff_rows.seed(staff(index, &name, &tel, org, position)) {
                break;
            }
        }

        let mut contacts = Collection::new();
        let literal_contacts = [
            ("物业服务中心", "0571-88880000", "客服部", "24小时值班"),
            ("工程维修热线", "0571-88881111", "工程部", "报修受理"),
            ("门岗值班室", "0571-88882222", "保安部", "值班"),
            ("周敏", "13900000001", "财务部", "收费员"),
        ];
        for (offset, (name, phone, department, position)) in
            literal_contacts.into_iter().enumerate()
        {
            contacts.seed(contact(offset + 1, name, phone, department, position));
        }
        while contacts.len() < CONTACT_TARGET {
            let index = contacts.len() + 1;
            let name = random_name(rng);
            let phone = random_phone(rng);
            let department = *pick(rng, ORGS);
            let (_, position) = *pick(rng, POSITIONS);
            if !contacts.seed(contact(index, &name, &phone, department, position)) {
                break;
            }
        }

        Self {
            staff: staff_rows,
            contacts,
        }
    }

    pub fn staff_len(&self) -> usize {
        self.staff.len()
    }

    pub fn contact_len(&self) -> usize {
        self.contacts.len()
    }

    pub fn list_staff(&self, filter: &StaffFilter, page: PageRequest) -> PageSlice<StaffRecord> {
        self.staff_query(filter).paginate(page)
    }

    /// Staff matching `filter`, bucketed by the initial of their name.
    pub fn group_by_initial(&self, filter: &StaffFilter) -> Vec<InitialGroup> {
        let matched = self.staff_query(filter).collect();
        group_by_initial(matched, |s: &StaffRecord| s.name.as_str())
            .into_iter()
            .map(|(initial, staffs)| InitialGroup {
                initial: initial.to_string(),
                staffs,
            })
            .collect()
    }

    pub fn list_contacts(
        &self,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> PageSlice<ContactRecord> {
        self.contacts
            .query()
            .eq(filter.department.as_deref(), |c| c.department.as_str())
            .keyword(filter.keyword.as_deref(), |c| {
                [c.name.as_str(), c.department.as_str()]
            })
            .paginate(page)
    }

    fn staff_query(&self, filter: &StaffFilter) -> super::Query<'_, StaffRecord> {
        self.staff
            .query()
            .eq(filter.org_name.as_deref(), |s| s.org_name.as_str())
            .keyword(filter.keyword.as_deref(), |s| [s.name.as_str(), s.tel.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn store() -> DirectoryStore {
        DirectoryStore::seeded(&mut StdRng::seed_from_u64(13))
    }

    #[test]
    fn pads_to_targets() {
        let store = store();
        assert_eq!(store.staff_len(), STAFF_TARGET);
        assert_eq!(store.contact_len(), CONTACT_TARGET);
    }

    #[test]
    fn staff_keyword_matches_name_or_tel() {
        let store = store();
        let by_tel = store.list_staff(
            &StaffFilter {
                keyword: Some("13800000003".to_string()),
                ..Default::default()
            },
            PageRequest::new(1, 50),
        );
        assert_eq!(by_tel.total, 1);
        assert_eq!(by_tel.list[0].name, "王强");

        let by_org = store.list_staff(
            &StaffFilter {
                org_name: Some("工程部".to_string()),
                keyword: Some("赵".to_string()),
            },
            PageRequest::new(1, 50),
        );
        assert!(by_org.list.iter().any(|s| s.staff_id == "STAFF_004"));
        assert!(by_org.list.iter().all(|s| s.org_name == "工程部"));
    }

    #[test]
    fn groups_are_ordered_and_complete() {
        let store = store();
        let groups = store.group_by_initial(&StaffFilter::default());
        let initials: Vec<&str> = groups.iter().map(|g| g.initial.as_str()).collect();
        let mut sorted = initials.clone();
        sorted.sort_unstable();
        assert_eq!(initials, sorted);
        assert_eq!(groups.iter().map(|g| g.staffs.len()).sum::<usize>(), STAFF_TARGET);

        let z = groups.iter().find(|g| g.initial == "Z").expect("Z group");
        assert_eq!(z.staffs[0].name, "张伟");
        let a = groups.iter().find(|g| g.initial == "A").expect("A group");
        assert!(a.staffs.iter().any(|s| s.name == "Alice"));
    }

    #[test]
    fn contacts_filter_by_department() {
        let store = store();
        let page = store.list_contacts(
            &ContactFilter {
                department: Some("工程部".to_string()),
                keyword: Some("热线".to_string()),
            },
            PageRequest::new(1, 50),
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].contact_id, "CONTACT_002");
    }
}
