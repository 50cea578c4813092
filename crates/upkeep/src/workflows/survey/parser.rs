use super::normalizer::normalize_defect_name;
use crate::workflows::maintenance::ElementId;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug)]
pub(crate) struct SurveyRecord {
    pub(crate) element_id: ElementId,
    pub(crate) category: String,
    pub(crate) defect: String,
}

/// Rows without an element id or defect name are skipped.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<SurveyRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<SurveyRow>() {
        let row = record?;
        let defect = normalize_defect_name(&row.defect);
        if row.element_id.is_empty() || defect.is_empty() {
            continue;
        }

        records.push(SurveyRecord {
            element_id: ElementId(row.element_id),
            category: row.category,
            defect,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(alias = "Element", alias = "element")]
    element_id: String,
    #[serde(alias = "Category", alias = "categorie")]
    category: String,
    #[serde(alias = "Defect", alias = "gebrek")]
    defect: String,
}
