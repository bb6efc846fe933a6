//! The ledger store: accounts, journals, exercises and entries, plus the
//! secondary indices the posting engine and the reports scan.
//!
//! Indices are derived data. They are not serialised and are rebuilt with
//! [`LedgerStore::rebuild_indices`] after loading a store from disk.
//!
//! The store also tracks its posted volume, the sum of every validated debit
//! and credit. Posting refuses to push it past `Decimal::MAX`, which bounds
//! every total a report or the closing workflow can compute.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use grandlivre_shared::EntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryStatus, JournalEntry};
use crate::chart::ChartOfAccounts;
use crate::closing::PeriodClosing;
use crate::error::LedgerError;
use crate::fiscal::{DateRange, FiscalCalendar, PeriodKey};
use crate::journal::JournalRegistry;

/// `(account_code, date, entry_id)`, the general ledger sort key.
type AccountKey = (String, NaiveDate, EntryId);

fn first_entry_id() -> EntryId {
    EntryId::FIRST
}

/// Transactional key-indexed store backing one ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStore {
    pub(crate) chart: ChartOfAccounts,
    pub(crate) journals: JournalRegistry,
    pub(crate) calendar: FiscalCalendar,
    pub(crate) entries: BTreeMap<EntryId, JournalEntry>,
    #[serde(default = "first_entry_id")]
    pub(crate) next_entry_id: EntryId,
    #[serde(default)]
    pub(crate) closings: Vec<PeriodClosing>,

    #[serde(skip)]
    by_account: BTreeSet<AccountKey>,
    #[serde(skip)]
    by_period: BTreeMap<PeriodKey, BTreeSet<EntryId>>,
    #[serde(skip)]
    reversed_by: BTreeMap<EntryId, EntryId>,
    #[serde(skip)]
    pub(crate) posted_volume: Decimal,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self {
            chart: ChartOfAccounts::default(),
            journals: JournalRegistry::default(),
            calendar: FiscalCalendar::default(),
            entries: BTreeMap::new(),
            next_entry_id: EntryId::FIRST,
            closings: Vec::new(),
            by_account: BTreeSet::new(),
            by_period: BTreeMap::new(),
            reversed_by: BTreeMap::new(),
            posted_volume: Decimal::ZERO,
        }
    }
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The chart of accounts.
    #[must_use]
    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    /// The journal registry.
    #[must_use]
    pub fn journals(&self) -> &JournalRegistry {
        &self.journals
    }

    /// The fiscal calendar.
    #[must_use]
    pub fn calendar(&self) -> &FiscalCalendar {
        &self.calendar
    }

    /// Closing history, oldest first.
    #[must_use]
    pub fn closings(&self) -> &[PeriodClosing] {
        &self.closings
    }

    /// Looks up an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the id is unknown.
    pub fn entry(&self, id: EntryId) -> Result<&JournalEntry, LedgerError> {
        self.entries.get(&id).ok_or(LedgerError::EntryNotFound(id))
    }

    /// All entries in id order, whatever their status.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.values()
    }

    /// Number of entries, whatever their status.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries of every status in `(account_code, date, entry_id)` order.
    pub fn entries_by_account(&self) -> impl Iterator<Item = &JournalEntry> {
        self.by_account
            .iter()
            .filter_map(|(_, _, id)| self.entries.get(id))
    }

    /// Entries of one account in `(date, entry_id)` order, optionally limited to a range.
    pub fn account_entries<'a>(
        &'a self,
        code: &str,
        range: Option<DateRange>,
    ) -> impl Iterator<Item = &'a JournalEntry> + use<'a> {
        let (start, end) = range.map_or((NaiveDate::MIN, NaiveDate::MAX), |r| (r.start, r.end));
        let lower = (code.to_string(), start, EntryId(0));
        let upper = (code.to_string(), end, EntryId(u64::MAX));
        self.by_account
            .range(lower..=upper)
            .filter_map(|(_, _, id)| self.entries.get(id))
    }

    /// Entries whose period key is `period`, in id order.
    pub fn period_entries(&self, period: PeriodKey) -> impl Iterator<Item = &JournalEntry> {
        self.by_period
            .get(&period)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id))
    }

    /// The entry reversing `id`, if any.
    #[must_use]
    pub fn reversal_of(&self, id: EntryId) -> Option<EntryId> {
        self.reversed_by.get(&id).copied()
    }

    /// Signed balance of an account under its normal-balance convention.
    ///
    /// Without `as_of` this reads the running totals; with `as_of` it sums the
    /// validated entries dated on or before that day.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the code is unknown.
    pub fn account_balance(
        &self,
        code: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerError> {
        let account = self.chart.resolve(code)?;
        let Some(as_of) = as_of else {
            return Ok(account.balance());
        };

        let convention = account.account_type.normal_balance();
        let range = DateRange {
            start: NaiveDate::MIN,
            end: as_of,
        };
        Ok(self
            .account_entries(code, Some(range))
            .filter(|e| e.is_validated())
            .map(|e| e.normal_amount(convention))
            .sum())
    }

    /// Rebuilds every secondary index from the entry table.
    pub fn rebuild_indices(&mut self) {
        self.by_account.clear();
        self.by_period.clear();
        self.reversed_by.clear();
        self.posted_volume = Decimal::ZERO;

        let entries = std::mem::take(&mut self.entries);
        for entry in entries.values() {
            self.index(entry);
            if entry.status == EntryStatus::Validated {
                let line = entry.debit.get().saturating_add(entry.credit.get());
                self.posted_volume = self.posted_volume.saturating_add(line);
            }
        }
        self.entries = entries;

        if let Some(last) = self.entries.keys().next_back() {
            self.next_entry_id = self.next_entry_id.max(last.next());
        }
    }

    /// Sum of every validated debit and credit.
    #[must_use]
    pub fn posted_volume(&self) -> Decimal {
        self.posted_volume
    }

    /// Allocates the next entry id.
    pub(crate) fn allocate_entry_id(&mut self) -> EntryId {
        let id = self.next_entry_id;
        self.next_entry_id = id.next();
        id
    }

    /// Stores a new entry and registers it in every index.
    pub(crate) fn insert_entry(&mut self, entry: JournalEntry) -> &JournalEntry {
        self.index(&entry);
        let id = entry.id;
        self.entries.entry(id).or_insert(entry)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Result<&mut JournalEntry, LedgerError> {
        self.entries
            .get_mut(&id)
            .ok_or(LedgerError::EntryNotFound(id))
    }

    fn index(&mut self, entry: &JournalEntry) {
        self.by_account
            .insert((entry.account_code.clone(), entry.date, entry.id));
        self.by_period.entry(entry.period).or_default().insert(entry.id);
        if let Some(original) = entry.reverses {
            self.reversed_by.insert(original, entry.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountType, NewAccount};
    use crate::journal::JournalType;
    use crate::ledger::NewEntry;
    use grandlivre_shared::ActorId;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> LedgerStore {
        let mut store = LedgerStore::new();
        store
            .chart
            .create_account(NewAccount::new("512", "Bank", AccountType::Asset))
            .unwrap();
        store
            .chart
            .create_account(NewAccount::new("701", "Sales", AccountType::Revenue))
            .unwrap();
        store
            .journals
            .create_journal("VT", "Sales", JournalType::Sales)
            .unwrap();
        store
            .calendar
            .create_exercise("2024", date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        store
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = seeded();
        assert_eq!(store.allocate_entry_id(), EntryId(1));
        assert_eq!(store.allocate_entry_id(), EntryId(2));
    }

    #[test]
    fn test_account_entries_sorted_by_date_then_id() {
        let mut store = seeded();
        let late = store
            .create_entry(NewEntry::debit(date(2024, 3, 1), "P2", "512", "VT", "Late", dec!(5)))
            .unwrap()
            .id;
        let early = store
            .create_entry(NewEntry::debit(date(2024, 1, 1), "P1", "512", "VT", "Early", dec!(5)))
            .unwrap()
            .id;

        let ids: Vec<EntryId> = store.account_entries("512", None).map(|e| e.id).collect();
        assert_eq!(ids, vec![early, late]);

        let january = DateRange::month(PeriodKey::new(2024, 1).unwrap());
        let ids: Vec<EntryId> = store
            .account_entries("512", Some(january))
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![early]);
    }

    #[test]
    fn test_account_balance_as_of_ignores_drafts_and_later_entries() {
        let mut store = seeded();
        let actor = ActorId::new();
        let jan = store
            .create_entry(NewEntry::credit(date(2024, 1, 10), "F1", "701", "VT", "Sale", dec!(300)))
            .unwrap()
            .id;
        let feb = store
            .create_entry(NewEntry::credit(date(2024, 2, 10), "F2", "701", "VT", "Sale", dec!(200)))
            .unwrap()
            .id;
        store
            .create_entry(NewEntry::credit(date(2024, 1, 11), "F3", "701", "VT", "", dec!(999)))
            .unwrap();
        store.validate_entry(jan, actor).unwrap();
        store.validate_entry(feb, actor).unwrap();

        assert_eq!(store.account_balance("701", None).unwrap(), dec!(500));
        assert_eq!(
            store.account_balance("701", Some(date(2024, 1, 31))).unwrap(),
            dec!(300)
        );
        assert_eq!(
            store.account_balance("701", Some(date(2023, 12, 31))).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_serde_round_trip_rebuilds_indices() {
        let mut store = seeded();
        let id = store
            .create_entry(NewEntry::debit(date(2024, 1, 5), "P1", "512", "VT", "Cash", dec!(10)))
            .unwrap()
            .id;

        let json = serde_json::to_string(&store).unwrap();
        let mut loaded: LedgerStore = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.account_entries("512", None).count(), 0);

        loaded.rebuild_indices();
        assert_eq!(loaded.account_entries("512", None).count(), 1);
        assert_eq!(loaded.entry(id).unwrap().piece_no, "P1");
        assert_eq!(loaded.allocate_entry_id(), id.next());
    }

    #[test]
    fn test_posted_volume_survives_reload() {
        let mut store = seeded();
        let actor = ActorId::new();
        let sale = store
            .create_entry(NewEntry::credit(date(2024, 1, 10), "F1", "701", "VT", "Sale", dec!(300)))
            .unwrap()
            .id;
        store.validate_entry(sale, actor).unwrap();
        store
            .create_entry(NewEntry::debit(date(2024, 1, 11), "F1", "512", "VT", "Draft", dec!(300)))
            .unwrap();
        assert_eq!(store.posted_volume(), dec!(300));

        let json = serde_json::to_string(&store).unwrap();
        let mut loaded: LedgerStore = serde_json::from_str(&json).unwrap();
        loaded.rebuild_indices();
        assert_eq!(loaded.posted_volume(), dec!(300));
    }

    #[test]
    fn test_entry_not_found() {
        let store = seeded();
        assert_eq!(
            store.entry(EntryId(42)).unwrap_err(),
            LedgerError::EntryNotFound(EntryId(42))
        );
    }
}
