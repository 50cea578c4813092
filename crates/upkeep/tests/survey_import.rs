use upkeep::workflows::maintenance::{Element, PlanState, SequentialIds, Severity};
use upkeep::workflows::survey::{SurveyImportError, SurveyImporter};

fn two_element_plan(ids: &SequentialIds) -> PlanState {
    // el-000001 and el-000003; the reports take the even numbers.
    PlanState::new()
        .with_element(Element::create("Roof covering", ids))
        .with_element(Element::create("Window frames", ids))
}

#[test]
fn sample_survey_registers_defects_and_placeholders() {
    let data = include_bytes!("../sample_survey.csv");
    let ids = SequentialIds::new();
    let state = two_element_plan(&ids);

    let import = SurveyImporter::from_reader(&data[..], &state, &ids).expect("survey imports");

    assert_eq!(import.applied, 4);
    assert_eq!(import.skipped, 0);

    let roof = import.state.element(&"el-000001".into()).expect("roof");
    assert_eq!(
        roof.defects.names(Severity::Severe).to_vec(),
        vec!["Lekkage".to_string(), "Dakpannen los".to_string()]
    );
    assert_eq!(roof.defects.names(Severity::Minor).to_vec(), vec!["Mosgroei".to_string()]);

    let frames = import.state.element(&"el-000003".into()).expect("frames");
    assert_eq!(
        frames.defects.names(Severity::Minor).to_vec(),
        vec!["Afbladderende verf".to_string()]
    );
    assert_eq!(frames.inspections[0].observations.len(), 2);
    assert!(import.state.verify().is_empty());
}

#[test]
fn reimporting_the_same_survey_changes_nothing() {
    let data = include_bytes!("../sample_survey.csv");
    let ids = SequentialIds::new();
    let state = two_element_plan(&ids);

    let first = SurveyImporter::from_reader(&data[..], &state, &ids).expect("first import");
    let second =
        SurveyImporter::from_reader(&data[..], &first.state, &ids).expect("second import");

    assert_eq!(second.applied, 0);
    assert_eq!(second.skipped, 4);
    assert_eq!(second.state, first.state);
}

#[test]
fn malformed_rows_surface_as_csv_errors() {
    let ids = SequentialIds::new();
    let state = two_element_plan(&ids);
    let csv = "element_id,category,defect\nel-000001,ernstig\n";

    let error = SurveyImporter::from_reader(csv.as_bytes(), &state, &ids)
        .expect_err("short row rejected");
    assert!(matches!(error, SurveyImportError::Csv(_)));
}
