use serde::Serialize;
use std::collections::BTreeMap;

use crate::extract::{AgeBand, DispositionOutcome, SentenceKind};
use crate::model::{CountMode, Gender, OffenseCategory, ReportPeriod};

/// Rows that did not qualify for the period, by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    pub unparseable_date: usize,
    pub missing_date: usize,
    pub out_of_period: usize,
}

impl Exclusions {
    pub fn total(&self) -> usize {
        self.unparseable_date + self.missing_date + self.out_of_period
    }
}

/// Counts of one offense row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffenseCount {
    pub category: OffenseCategory,
    pub label: String,
    /// Distinct cases, counted once at the row of their first qualifying charge.
    pub cases: u64,
    /// Every qualifying row.
    pub persons: u64,
}

/// Everything a run counted, before it is written to the return.
///
/// Keys are report rows. Building a tally is a commutative fold, apart from
/// which row of a case is kept for the case-level count.
#[derive(Debug, Clone, Serialize)]
pub struct Tally {
    pub mode: CountMode,
    pub period: ReportPeriod,
    pub rows_read: usize,
    pub qualifying: usize,
    pub exclusions: Exclusions,
    pub offenses: BTreeMap<u32, OffenseCount>,
    pub dispositions: BTreeMap<u32, BTreeMap<DispositionOutcome, u64>>,
    pub sentences: BTreeMap<u32, BTreeMap<SentenceKind, u64>>,
    pub demographics: BTreeMap<AgeBand, BTreeMap<Gender, u64>>,
    /// Juvenile convictions by offense row (before the juvenile row offset).
    pub juvenile: BTreeMap<u32, u64>,
    /// Convictions by statutory row.
    pub statutory: BTreeMap<u32, u64>,
}

impl Tally {
    pub fn new(mode: CountMode, period: ReportPeriod) -> Self {
        Self {
            mode,
            period,
            rows_read: 0,
            qualifying: 0,
            exclusions: Exclusions::default(),
            offenses: BTreeMap::new(),
            dispositions: BTreeMap::new(),
            sentences: BTreeMap::new(),
            demographics: BTreeMap::new(),
            juvenile: BTreeMap::new(),
            statutory: BTreeMap::new(),
        }
    }

    /// Case and person totals per category, in return order.
    pub fn category_totals(&self) -> Vec<(OffenseCategory, u64, u64)> {
        OffenseCategory::ALL
            .iter()
            .map(|category| {
                let (cases, persons) = self
                    .offenses
                    .values()
                    .filter(|c| c.category == *category)
                    .fold((0, 0), |(cases, persons), c| (cases + c.cases, persons + c.persons));
                (*category, cases, persons)
            })
            .collect()
    }

    pub fn total_cases(&self) -> u64 {
        self.offenses.values().map(|c| c.cases).sum()
    }

    pub fn total_persons(&self) -> u64 {
        self.offenses.values().map(|c| c.persons).sum()
    }

    pub fn convictions(&self) -> u64 {
        self.dispositions
            .values()
            .filter_map(|by_outcome| by_outcome.get(&DispositionOutcome::Convicted))
            .sum()
    }
}

pub(crate) fn bump<K: Ord>(map: &mut BTreeMap<K, u64>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}
