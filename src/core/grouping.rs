use crate::config::toml_config::OutputConfig;
use crate::domain::model::{CareerGroup, InstitutionGroup, SourceRow, SourceTable};
use std::collections::BTreeMap;

/// Raw value, or `placeholder` when the cell was blank. Matching is exact and
/// case-sensitive.
fn group_key(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

fn partition_by<'a, F>(
    rows: impl IntoIterator<Item = &'a SourceRow>,
    key: F,
) -> BTreeMap<String, Vec<SourceRow>>
where
    F: Fn(&SourceRow) -> String,
{
    let mut groups: BTreeMap<String, Vec<SourceRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(row.clone());
    }
    groups
}

/// Splits the table into one group per institution, or per (region, institution) when
/// `by_region` is set and the table has a region column. Groups come out in ascending
/// key order; rows keep their input order.
pub fn group_institutions(
    table: &SourceTable,
    by_region: bool,
    output: &OutputConfig,
) -> Vec<InstitutionGroup> {
    let institution_key =
        |row: &SourceRow| group_key(Some(row.institution.as_str()), &output.missing_institution);

    if by_region && !table.columns.region {
        tracing::warn!(
            "Region grouping requested but the table has no region column; \
             grouping by institution only"
        );
    }

    if by_region && table.columns.region {
        let regions = partition_by(&table.rows, |row| {
            group_key(row.region.as_deref(), &output.missing_region)
        });

        regions
            .into_iter()
            .flat_map(|(region, rows)| {
                partition_by(&rows, institution_key)
                    .into_iter()
                    .map(move |(institution, rows)| InstitutionGroup {
                        institution,
                        region: Some(region.clone()),
                        rows,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    } else {
        partition_by(&table.rows, institution_key)
            .into_iter()
            .map(|(institution, rows)| InstitutionGroup {
                institution,
                region: None,
                rows,
            })
            .collect()
    }
}

/// Career groups of one institution, ascending by career name.
pub fn group_careers(group: &InstitutionGroup, missing_career: &str) -> Vec<CareerGroup> {
    partition_by(&group.rows, |row| group_key(row.career.as_deref(), missing_career))
        .into_iter()
        .map(|(career, rows)| CareerGroup { career, rows })
        .collect()
}
