pub mod tally;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, RunWarning};
use crate::classify::{classify, classify_statutory, Classification};
use crate::extract::{age_band, disposition_of, sentence_of, DispositionOutcome};
use crate::model::{CaseDate, CaseRecord, CountMode, ReportPeriod};
use crate::report::grid::{column_letters, CellWrite, ReportGrid};
use crate::report::layout::{col, ReportLayout};
use crate::taxonomy::schema::TaxonomyDef;

pub use tally::{Exclusions, OffenseCount, Tally};
use tally::bump;

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregationRun {
    pub grid: ReportGrid,
    pub audit: Vec<AuditEntry>,
    pub warnings: Vec<RunWarning>,
    pub tally: Tally,
}

/// Counts case rows into a return, under one taxonomy and layout.
pub struct Aggregator<'a> {
    taxonomy: &'a TaxonomyDef,
    layout: &'a ReportLayout,
}

/// One additive write derived from the tally.
struct CellTarget<'a> {
    sheet: &'a str,
    row: i64,
    col: u32,
    count: u64,
    what: String,
}

impl<'a> Aggregator<'a> {
    pub fn new(taxonomy: &'a TaxonomyDef, layout: &'a ReportLayout) -> Self {
        Self { taxonomy, layout }
    }

    /// Count `records` for `period` and `mode`, then add the counts to `grid`.
    ///
    /// Writes are additive: running twice over the same template doubles the
    /// counts. Writes that cannot land become warnings; the run never fails
    /// because of a single cell.
    pub fn run(
        &self,
        records: &[CaseRecord],
        period: ReportPeriod,
        mode: CountMode,
        mut grid: ReportGrid,
    ) -> AggregationRun {
        let (tally, audit) = self.tally(records, period, mode);
        let mut warnings = Vec::new();
        let mut dropped = 0u64;

        if tally.exclusions.unparseable_date > 0 {
            warnings.push(RunWarning::info(format!(
                "{} row(s) with an unparseable {} date were excluded",
                tally.exclusions.unparseable_date,
                match mode {
                    CountMode::New => "arraignment",
                    CountMode::Disposed => "disposal",
                }
            )));
        }

        for target in self.targets(&tally) {
            let write = grid.add(target.sheet, target.row, target.col, target.count as f64);
            let cell = format!("{}{}", column_letters(target.col), target.row);
            if write.is_dropped() {
                dropped += target.count;
            }
            match write {
                CellWrite::Written { .. } => {}
                CellWrite::ReplacedNonNumeric { previous, .. } => {
                    warnings.push(
                        RunWarning::info(format!(
                            "text '{previous}' was read as 0 and replaced by the {} count",
                            target.what
                        ))
                        .at(target.sheet, cell),
                    );
                }
                CellWrite::AddressNotFound { reason } => {
                    warn!(sheet = target.sheet, %cell, count = target.count, %reason, "dropped cell write");
                    warnings.push(
                        RunWarning::warning(format!(
                            "{} count(s) for {} dropped: {reason}",
                            target.count, target.what
                        ))
                        .at(target.sheet, cell),
                    );
                }
                CellWrite::Locked { formula } => {
                    warn!(sheet = target.sheet, %cell, count = target.count, "dropped write to formula cell");
                    warnings.push(
                        RunWarning::warning(format!(
                            "{} count(s) for {} dropped: cell holds formula ={formula}",
                            target.count, target.what
                        ))
                        .at(target.sheet, cell),
                    );
                }
            }
        }

        info!(
            %mode,
            %period,
            rows = tally.rows_read,
            qualifying = tally.qualifying,
            cases = tally.total_cases(),
            dropped,
            warnings = warnings.len(),
            "aggregation finished"
        );

        AggregationRun {
            grid,
            audit,
            warnings,
            tally,
        }
    }

    /// Filter, classify and count, without touching any report.
    pub fn tally(
        &self,
        records: &[CaseRecord],
        period: ReportPeriod,
        mode: CountMode,
    ) -> (Tally, Vec<AuditEntry>) {
        let mut tally = Tally::new(mode, period);
        let mut audit = Vec::new();
        let mut seen_cases: HashSet<&str> = HashSet::new();
        tally.rows_read = records.len();

        for record in records {
            let date = match mode.date_of(record) {
                CaseDate::Valid(date) => *date,
                CaseDate::Unparseable(_) => {
                    tally.exclusions.unparseable_date += 1;
                    continue;
                }
                CaseDate::Absent => {
                    tally.exclusions.missing_date += 1;
                    continue;
                }
            };
            if !period.contains(date) {
                tally.exclusions.out_of_period += 1;
                continue;
            }
            tally.qualifying += 1;

            let class = classify(self.taxonomy, &record.charge, &record.complainant);
            // Blank ids cannot be told apart, so each one is its own case.
            let first_of_case = record.case_id.is_empty() || seen_cases.insert(record.case_id.as_str());
            self.count_offense(&mut tally, &class, first_of_case);

            let outcome = match mode {
                CountMode::New => None,
                CountMode::Disposed => {
                    let outcome = disposition_of(&record.remark, &record.status);
                    self.count_disposal(&mut tally, record, &class, outcome);
                    Some(outcome)
                }
            };

            audit.push(AuditEntry {
                source: record.source.clone(),
                kind: mode,
                case_id: record.case_id.clone(),
                category: class.category,
                row: class.row,
                row_label: class.label,
                charge: record.charge.clone(),
                date,
                status: record.status.clone(),
                disposition: outcome,
            });
        }

        debug!(
            unparseable = tally.exclusions.unparseable_date,
            missing = tally.exclusions.missing_date,
            out_of_period = tally.exclusions.out_of_period,
            "excluded rows"
        );
        (tally, audit)
    }

    fn count_offense(&self, tally: &mut Tally, class: &Classification, first_of_case: bool) {
        let entry = tally.offenses.entry(class.row).or_insert_with(|| OffenseCount {
            category: class.category,
            label: class.label.clone(),
            cases: 0,
            persons: 0,
        });
        entry.persons += 1;
        if first_of_case {
            entry.cases += 1;
        }
    }

    /// Dispositions for every disposed row; the breakdowns only for convictions.
    fn count_disposal(
        &self,
        tally: &mut Tally,
        record: &CaseRecord,
        class: &Classification,
        outcome: DispositionOutcome,
    ) {
        bump(tally.dispositions.entry(class.row).or_default(), outcome);
        if outcome != DispositionOutcome::Convicted {
            return;
        }

        let sentence = sentence_of(&record.sentence, &record.remark);
        bump(tally.sentences.entry(class.row).or_default(), sentence);

        let band = age_band(record.age);
        bump(tally.demographics.entry(band).or_default(), record.gender);
        if band.is_juvenile() {
            bump(&mut tally.juvenile, class.row);
        }

        let statutory = classify_statutory(self.taxonomy, &record.charge);
        bump(&mut tally.statutory, statutory.row);
    }

    /// Turn the tally into one additive write per target cell.
    fn targets(&self, tally: &Tally) -> Vec<CellTarget<'a>> {
        let layout = self.layout;
        let mode = tally.mode;
        let mut targets = Vec::new();

        let o = &layout.offenses;
        for (row, count) in &tally.offenses {
            if count.cases > 0 {
                targets.push(CellTarget {
                    sheet: &o.sheet,
                    row: i64::from(*row),
                    col: o.cases_column(mode),
                    count: count.cases,
                    what: format!("{mode} cases of '{}'", count.label),
                });
            }
            targets.push(CellTarget {
                sheet: &o.sheet,
                row: i64::from(*row),
                col: o.persons_column(mode),
                count: count.persons,
                what: format!("{mode} persons of '{}'", count.label),
            });
        }

        let d = &layout.dispositions;
        for (row, by_outcome) in &tally.dispositions {
            for (outcome, count) in by_outcome {
                targets.push(CellTarget {
                    sheet: &d.sheet,
                    row: i64::from(*row),
                    col: d.columns.get(outcome).map(|l| col(l)).unwrap_or(0),
                    count: *count,
                    what: format!("{outcome} at row {row}"),
                });
            }
        }

        let s = &layout.sentences;
        for (row, by_kind) in &tally.sentences {
            for (kind, count) in by_kind {
                targets.push(CellTarget {
                    sheet: &s.sheet,
                    row: i64::from(*row),
                    col: s.columns.get(kind).map(|l| col(l)).unwrap_or(0),
                    count: *count,
                    what: format!("{kind} sentences at row {row}"),
                });
            }
        }

        let dm = &layout.demographics;
        for (band, by_gender) in &tally.demographics {
            let row = dm.rows.get(band).map(|r| i64::from(*r)).unwrap_or(0);
            for (gender, count) in by_gender {
                targets.push(CellTarget {
                    sheet: &dm.sheet,
                    row,
                    col: dm.columns.get(gender).map(|l| col(l)).unwrap_or(0),
                    count: *count,
                    what: format!("convicted {gender} aged {band}"),
                });
            }
        }

        let j = &layout.juvenile;
        for (row, count) in &tally.juvenile {
            let category = match self.taxonomy.row(*row) {
                Some(def) => def.category,
                None => continue,
            };
            targets.push(CellTarget {
                sheet: &j.sheet,
                row: j.row_for(category, *row),
                col: col(&j.column),
                count: *count,
                what: format!("juvenile convictions for offense row {row}"),
            });
        }

        let st = &layout.statutory;
        for (row, count) in &tally.statutory {
            targets.push(CellTarget {
                sheet: &st.sheet,
                row: i64::from(*row),
                col: col(&st.column),
                count: *count,
                what: format!("statutory convictions at row {row}"),
            });
        }

        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;
    use crate::report::grid::{CellRef, CellValue};
    use crate::report::layout::{load_layout_preset, DEFAULT_LAYOUT};
    use crate::report::scaffold;
    use crate::taxonomy::builtin::{load_preset, DEFAULT_PRESET};
    use chrono::NaiveDate;

    fn record(case_id: &str, charge: &str, arraigned: &str, disposed: &str) -> CaseRecord {
        CaseRecord {
            source: "test.csv".into(),
            case_id: case_id.into(),
            charge: charge.into(),
            arraignment_date: crate::extract::parse_date(arraigned),
            disposal_date: crate::extract::parse_date(disposed),
            ..Default::default()
        }
    }

    fn number(grid: &ReportGrid, sheet: &str, a1: &str) -> f64 {
        match grid.read(sheet, CellRef::parse(a1).unwrap()) {
            Some(CellValue::Number(n)) => *n,
            None => 0.0,
            Some(other) => panic!("{sheet}!{a1} holds {other:?}"),
        }
    }

    #[test]
    fn test_case_level_dedup_and_person_level_raw() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let records = vec![
            record("CB-100", "Theft", "2025-03-04", ""),
            record("CB-100", "Burglary", "2025-03-04", ""),
        ];
        let run = Aggregator::new(&tx, &layout).run(
            &records,
            ReportPeriod::month(2025, 3).unwrap(),
            CountMode::New,
            scaffold(&tx, &layout),
        );
        assert_eq!(run.tally.total_cases(), 1);
        assert_eq!(run.tally.total_persons(), 2);
        // The case is counted at its first charge; each person at their own.
        assert_eq!(number(&run.grid, "Criminal Return", "C37"), 1.0);
        assert_eq!(number(&run.grid, "Criminal Return", "C35"), 0.0);
        assert_eq!(number(&run.grid, "Criminal Return", "D37"), 1.0);
        assert_eq!(number(&run.grid, "Criminal Return", "D35"), 1.0);
        assert_eq!(run.audit.len(), 2);
    }

    #[test]
    fn test_blank_case_ids_are_not_merged() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let records = vec![
            record("", "Theft", "2025-03-04", ""),
            record("", "Theft", "2025-03-05", ""),
        ];
        let (tally, _) = Aggregator::new(&tx, &layout).tally(
            &records,
            ReportPeriod::month(2025, 3).unwrap(),
            CountMode::New,
        );
        assert_eq!(tally.total_cases(), 2);
    }

    #[test]
    fn test_exclusions_are_counted() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let records = vec![
            record("A", "Theft", "not a date", ""),
            record("B", "Theft", "", ""),
            record("C", "Theft", "2025-02-28", ""),
            record("D", "Theft", "2025-03-01", ""),
        ];
        let run = Aggregator::new(&tx, &layout).run(
            &records,
            ReportPeriod::month(2025, 3).unwrap(),
            CountMode::New,
            scaffold(&tx, &layout),
        );
        assert_eq!(
            run.tally.exclusions,
            Exclusions { unparseable_date: 1, missing_date: 1, out_of_period: 1 }
        );
        assert_eq!(run.tally.qualifying, 1);
        assert_eq!(run.audit.len(), 1);
        assert_eq!(run.audit[0].case_id, "D");
        assert!(run.warnings.iter().any(|w| w.message.contains("unparseable")));
    }

    #[test]
    fn test_conviction_breakdowns_only_for_convicted_rows() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let mut convicted = record("D-1", "Possession of cannabis", "", "2025-04-10");
        convicted.remark = "Convicted".into();
        convicted.sentence = "Fined $500".into();
        convicted.age = Some(15);
        convicted.gender = Gender::Male;
        let mut dismissed = record("D-2", "Theft", "", "2025-04-11");
        dismissed.remark = "Dismissed for want of prosecution".into();
        dismissed.age = Some(30);
        dismissed.gender = Gender::Female;

        let run = Aggregator::new(&tx, &layout).run(
            &[convicted, dismissed],
            ReportPeriod::month(2025, 4).unwrap(),
            CountMode::Disposed,
            scaffold(&tx, &layout),
        );
        let grid = &run.grid;
        assert_eq!(number(grid, "Criminal Return", "E44"), 1.0);
        assert_eq!(number(grid, "Criminal Return", "G44"), 1.0);
        assert_eq!(number(grid, "Criminal Return", "H37"), 1.0);
        assert_eq!(number(grid, "Sentences", "C44"), 1.0);
        assert_eq!(number(grid, "Convicted Persons", "B6"), 1.0);
        assert_eq!(number(grid, "Convicted Persons", "C8"), 0.0);
        // Drug offences sit at row 44; OTHERS rows shift up by 7.
        assert_eq!(number(grid, "Juvenile", "C37"), 1.0);
        assert_eq!(number(grid, "Statutory Offences", "C6"), 1.0);
        assert_eq!(run.tally.convictions(), 1);
        assert_eq!(
            run.audit[1].disposition,
            Some(DispositionOutcome::Dismissed)
        );
    }

    #[test]
    fn test_dropped_writes_become_warnings() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let mut grid = ReportGrid::new();
        grid.add_sheet("Criminal Return");
        grid.set(
            "Criminal Return",
            CellRef::parse("D37").unwrap(),
            CellValue::Formula("SUM(D1:D2)".into()),
        );
        let records = vec![record("A", "Theft", "2025-03-04", "")];
        let run = Aggregator::new(&tx, &layout).run(
            &records,
            ReportPeriod::month(2025, 3).unwrap(),
            CountMode::New,
            grid,
        );
        assert_eq!(number(&run.grid, "Criminal Return", "C37"), 1.0);
        let dropped: Vec<_> = run.warnings.iter().filter(|w| w.cell.as_deref() == Some("D37")).collect();
        assert_eq!(dropped.len(), 1);
        assert!(dropped[0].message.contains("formula"));
    }

    #[test]
    fn test_missing_sheet_drops_breakdowns_but_keeps_main_counts() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let mut grid = ReportGrid::new();
        grid.add_sheet("Criminal Return");
        let mut r = record("A", "Theft", "", "2025-04-02");
        r.remark = "Guilty".into();
        let run = Aggregator::new(&tx, &layout).run(
            &[r],
            ReportPeriod::month(2025, 4).unwrap(),
            CountMode::Disposed,
            grid,
        );
        assert_eq!(number(&run.grid, "Criminal Return", "E37"), 1.0);
        assert!(run
            .warnings
            .iter()
            .any(|w| w.sheet.as_deref() == Some("Sentences")));
        assert!(run.grid.sheet("Sentences").is_none());
    }

    #[test]
    fn test_counts_do_not_depend_on_row_order() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let mut records = vec![
            record("1", "Theft", "2025-03-01", ""),
            record("2", "Murder", "2025-03-02", ""),
            record("3", "Drunk and disorderly", "2025-03-03", ""),
            record("4", "Robbery", "2025-03-04", ""),
        ];
        let agg = Aggregator::new(&tx, &layout);
        let period = ReportPeriod::month(2025, 3).unwrap();
        let (forward, _) = agg.tally(&records, period, CountMode::New);
        records.reverse();
        let (backward, _) = agg.tally(&records, period, CountMode::New);
        assert_eq!(forward.offenses, backward.offenses);
    }

    #[test]
    fn test_audit_dates_are_the_mode_date() {
        let tx = load_preset(DEFAULT_PRESET).unwrap();
        let layout = load_layout_preset(DEFAULT_LAYOUT).unwrap();
        let records = vec![record("A", "Theft", "2025-03-04", "2025-04-09")];
        let (_, audit) = Aggregator::new(&tx, &layout).tally(
            &records,
            ReportPeriod::month(2025, 4).unwrap(),
            CountMode::Disposed,
        );
        assert_eq!(audit[0].date, NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        assert_eq!(audit[0].kind, CountMode::Disposed);
    }
}
