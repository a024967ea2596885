//! In-memory entity databases backing the mock endpoints.
//!
//! Each domain owns an ordered [`Collection`] seeded once at construction.
//! Mutable domains keep their collection and random source behind a
//! `tokio::sync::Mutex` held for the whole read-validate-mutate sequence of an
//! operation; read-only domains are plain immutable vectors.

pub mod activities;
pub mod apply_room;
pub mod complaints;
pub mod directory;
pub mod fees;
pub mod locations;
pub mod repairs;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use crate::application::pagination::{PageRequest, PageSlice, create_pagination_response};
use crate::domain::error::DomainError;

pub use activities::ActivityStore;
pub use apply_room::ApplyRoomStore;
pub use complaints::ComplaintStore;
pub use directory::DirectoryStore;
pub use fees::FeeStore;
pub use locations::LocationStore;
pub use repairs::RepairStore;

/// Community every seeded fixture belongs to.
pub const DEFAULT_COMMUNITY_ID: &str = "COMM_001";

/// A row addressable by a primary key unique within its collection.
pub trait Record: Clone {
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}

/// Where [`Collection::insert`] places a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Head,
    Tail,
}

/// Insertion-ordered table with unique primary keys.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    rows: Vec<T>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.iter().any(|row| row.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    /// Insert a row, rejecting a primary key that is already present.
    pub fn insert(&mut self, row: T, at: InsertAt) -> Result<(), DomainError> {
        if self.contains(row.id()) {
            return Err(DomainError::invariant(format!(
                "duplicate {} id `{}`",
                T::ENTITY,
                row.id()
            )));
        }
        match at {
            InsertAt::Head => self.rows.insert(0, row),
            InsertAt::Tail => self.rows.push(row),
        }
        Ok(())
    }

    /// Append a fixture row. A rejected row is logged and reported as
    /// `false` so padding loops can stop instead of spinning.
    pub fn seed(&mut self, row: T) -> bool {
        match self.insert(row, InsertAt::Tail) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    target = "property_mock::store",
                    entity = T::ENTITY,
                    error = %err,
                    "fixture rejected while seeding"
                );
                false
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.rows.iter().position(|row| row.id() == id)?;
        Some(self.rows.remove(index))
    }

    /// Remove every row matching `predicate`, returning how many were dropped.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate(row));
        before - self.rows.len()
    }

    pub fn query(&self) -> Query<'_, T> {
        Query {
            rows: self.rows.iter().collect(),
        }
    }
}

/// Filter chain over a collection snapshot. Absent filter values impose no
/// constraint.
pub struct Query<'a, T> {
    rows: Vec<&'a T>,
}

impl<'a, T: Clone> Query<'a, T> {
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool) -> Self {
        self.rows.retain(|row| predicate(row));
        self
    }

    /// Exact match on a text field when `expected` is present.
    pub fn eq<F>(self, expected: Option<&str>, field: F) -> Self
    where
        F: Fn(&T) -> &str,
    {
        match expected {
            Some(expected) => self.filter(|row| field(row) == expected),
            None => self,
        }
    }

    /// Case-insensitive substring match, OR-combined across `fields`.
    pub fn keyword<F, const N: usize>(self, keyword: Option<&str>, fields: F) -> Self
    where
        F: Fn(&T) -> [&str; N],
    {
        let Some(keyword) = keyword.map(str::to_lowercase) else {
            return self;
        };
        self.filter(|row| {
            fields(row)
                .iter()
                .any(|value| value.to_lowercase().contains(&keyword))
        })
    }

    /// Stable descending sort.
    pub fn sort_desc_by<K: Ord>(mut self, key: impl Fn(&T) -> K) -> Self {
        self.rows.sort_by(|a, b| key(b).cmp(&key(a)));
        self
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn paginate(self, page: PageRequest) -> PageSlice<T> {
        create_pagination_response(&self.rows, page.page(), page.row()).map(|row| row.clone())
    }

    pub fn collect(self) -> Vec<T> {
        self.rows.into_iter().cloned().collect()
    }
}

/// All entity databases of one mock instance.
pub struct MockDatabase {
    pub activities: ActivityStore,
    pub repairs: RepairStore,
    pub complaints: ComplaintStore,
    pub apply_rooms: ApplyRoomStore,
    pub fees: FeeStore,
    pub directory: DirectoryStore,
    pub locations: LocationStore,
}

impl MockDatabase {
    /// Seed every store; `None` draws the master seed from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let mut master = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut child = move || StdRng::seed_from_u64(master.r#gen());

        let locations = LocationStore::seeded(&mut child());
        let rooms = locations.room_refs();

        let database = Self {
            activities: ActivityStore::seeded(child()),
            repairs: RepairStore::seeded(child()),
            complaints: ComplaintStore::seeded(child(), &rooms),
            apply_rooms: ApplyRoomStore::seeded(child(), &rooms),
            fees: FeeStore::seeded(&mut child(), &rooms),
            directory: DirectoryStore::seeded(&mut child()),
            locations,
        };

        info!(
            target = "property_mock::store",
            seed = ?seed,
            fee_details = database.fees.len(),
            staff = database.directory.staff_len(),
            contacts = database.directory.contact_len(),
            rooms = rooms.len(),
            "mock database seeded"
        );

        database
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }
}
