use super::grid::{CellRef, CellValue, ReportGrid};
use super::layout::{col, ReportLayout};
use crate::model::Gender;
use crate::taxonomy::schema::TaxonomyDef;

/// Build an empty return with every layout sheet, its headings and row labels.
///
/// Used when no template is supplied. Count cells are left blank; additive
/// writes read them as zero.
pub fn scaffold(taxonomy: &TaxonomyDef, layout: &ReportLayout) -> ReportGrid {
    let mut grid = ReportGrid::new();
    for name in layout.sheet_names() {
        grid.add_sheet(name);
        text(&mut grid, name, 1, 1, &taxonomy.name);
    }

    let o = &layout.offenses;
    let heading = o.heading_row;
    text(&mut grid, &o.sheet, heading, col(&o.label_column), "Offence");
    text(&mut grid, &o.sheet, heading, col(&o.new_cases), "New Cases");
    text(&mut grid, &o.sheet, heading, col(&o.new_persons), "New Persons");
    text(&mut grid, &o.sheet, heading, col(&o.disposed_cases), "Disposed Cases");
    text(&mut grid, &o.sheet, heading, col(&o.disposed_persons), "Disposed Persons");
    offense_labels(&mut grid, taxonomy, &o.sheet, col(&o.label_column));

    let d = &layout.dispositions;
    let d_heading = d.heading_row(o);
    for (outcome, letters) in &d.columns {
        text(&mut grid, &d.sheet, d_heading, col(letters), &outcome.to_string());
    }
    if d.sheet != o.sheet {
        offense_labels(&mut grid, taxonomy, &d.sheet, col(&o.label_column));
    }

    let s = &layout.sentences;
    text(&mut grid, &s.sheet, s.heading_row, col(&s.label_column), "Offence");
    for (kind, letters) in &s.columns {
        text(&mut grid, &s.sheet, s.heading_row, col(letters), &kind.to_string());
    }
    offense_labels(&mut grid, taxonomy, &s.sheet, col(&s.label_column));

    let dm = &layout.demographics;
    text(&mut grid, &dm.sheet, dm.heading_row, col(&dm.label_column), "Age Group");
    for gender in Gender::ALL {
        if let Some(letters) = dm.columns.get(&gender) {
            text(&mut grid, &dm.sheet, dm.heading_row, col(letters), &gender.to_string());
        }
    }
    for (band, row) in &dm.rows {
        text(&mut grid, &dm.sheet, *row, col(&dm.label_column), band.label());
    }

    let j = &layout.juvenile;
    text(&mut grid, &j.sheet, j.heading_row, col(&j.label_column), "Offence");
    text(&mut grid, &j.sheet, j.heading_row, col(&j.column), "Juveniles Convicted");
    for row in &taxonomy.rows {
        if let Ok(target) = u32::try_from(j.row_for(row.category, row.row)) {
            text(&mut grid, &j.sheet, target, col(&j.label_column), &row.label);
        }
    }

    let st = &layout.statutory;
    text(&mut grid, &st.sheet, st.heading_row, col(&st.label_column), "Statutory Offence");
    text(&mut grid, &st.sheet, st.heading_row, col(&st.column), "Convicted");
    for row in &taxonomy.statutory.rows {
        text(&mut grid, &st.sheet, row.row, col(&st.label_column), &row.label);
    }

    grid
}

/// Category headings and offense labels, at the taxonomy row ids.
fn offense_labels(grid: &mut ReportGrid, taxonomy: &TaxonomyDef, sheet: &str, label_col: u32) {
    for category in &taxonomy.categories {
        text(grid, sheet, category.header_row, label_col, category.category.label());
    }
    for row in &taxonomy.rows {
        text(grid, sheet, row.row, label_col, &row.label);
    }
}

fn text(grid: &mut ReportGrid, sheet: &str, row: u32, col: u32, value: &str) {
    if let Some(cell) = CellRef::new(row, col) {
        grid.set(sheet, cell, CellValue::Text(value.to_string()));
    }
}
