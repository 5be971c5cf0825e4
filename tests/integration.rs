//! Integration tests for TROPHIC

use approx::assert_relative_eq;
use ndarray::Array2;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use trophic::aggregate::PredatorAggregator;
use trophic::analysis::ExportSystem;
use trophic::ecology::{LinearPredator, Prey, PreyLink};
use trophic::lengths::LengthGroupDivision;
use trophic::likelihood::{Component, Multinomial};
use trophic::registry::PreyHandle;
use trophic::stats::PopInfo;
use trophic::{Config, ConsumptionEngine, Diagnostics, Error, Objective, TimeStep};

const TIME: &str = r#"
time:
  first_year: 1995
  first_step: 1
  last_year: 1995
  last_step: 4
  steps_per_year: 4
  substeps: 1
  step_length: 1.0
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn load(dir: &TempDir, yaml: &str) -> Config {
    let path = dir.path().join("trophic.yaml");
    fs::write(&path, yaml).unwrap();
    Config::from_file(&path).unwrap()
}

fn catch_yaml(name: &str, datafile: &str) -> String {
    format!(
        r#"
  - type: catchstatistics
    name: {}
    datafile: "{}"
    function: length-no-variance
    areas: [{{label: a, members: [1]}}]
    ages: [{{label: g, members: [0]}}]
    fleets: [comm]
    stocks: [cod]
"#,
        name, datafile
    )
}

fn stomach_yaml(name: &str, function: &str, datafile: &str) -> String {
    format!(
        r#"
  - type: stomachcontent
    name: {}
    function: {}
    datafile: "{}"
    areas: [{{label: a, members: [1]}}]
    predators: [cod]
    predator_lengths:
      - {{label: small, min: 20.0, max: 40.0}}
      - {{label: large, min: 40.0, max: 60.0}}
    preys:
      - {{label: capelin, names: [capelin], min_length: 5.0, max_length: 15.0}}
      - {{label: herring, names: [herring], min_length: 10.0, max_length: 30.0}}
"#,
        name, function, datafile
    )
}

/// A fleet fishing 10% of a single-length-group stock with mean length 10
fn fishery(diag: &Diagnostics) -> ConsumptionEngine {
    let mut engine = ConsumptionEngine::new(diag.clone());
    let cod = engine.add_prey(
        Prey::new("cod", vec![1], LengthGroupDivision::new(vec![8.0, 12.0]).unwrap(), 0.95).unwrap(),
    );
    let comm = engine.add_fleet(
        LinearPredator::new(
            "comm",
            vec![1],
            LengthGroupDivision::new(vec![0.0, 1.0]).unwrap(),
            0.1,
            vec![PreyLink::new(cod, Array2::ones((1, 1)))],
            diag.clone(),
        )
        .unwrap(),
    )
    .unwrap();
    engine.set_prey_population(cod, 1, &[PopInfo::new(100.0, 1.0)]);
    engine.set_fleet_effort(comm, 1, &[PopInfo::new(1.0, 1.0)]);
    engine
}

/// Cod with two length groups eating capelin (mean length 10) and herring (mean length 20)
fn food_web(diag: &Diagnostics, cod_numbers: f64) -> (ConsumptionEngine, PreyHandle, PreyHandle) {
    let mut engine = ConsumptionEngine::new(diag.clone());
    let capelin = engine.add_prey(
        Prey::new("capelin", vec![1], LengthGroupDivision::new(vec![5.0, 15.0]).unwrap(), 0.95).unwrap(),
    );
    let herring = engine.add_prey(
        Prey::new("herring", vec![1], LengthGroupDivision::new(vec![10.0, 30.0]).unwrap(), 0.95).unwrap(),
    );
    let cod = engine.add_predator(
        LinearPredator::new(
            "cod",
            vec![1],
            LengthGroupDivision::new(vec![20.0, 40.0, 60.0]).unwrap(),
            0.01,
            vec![
                PreyLink::new(capelin, Array2::ones((2, 1))),
                PreyLink::new(herring, Array2::ones((2, 1))),
            ],
            diag.clone(),
        )
        .unwrap(),
    )
    .unwrap();
    engine.set_prey_population(capelin, 1, &[PopInfo::new(1000.0, 0.01)]);
    engine.set_prey_population(herring, 1, &[PopInfo::new(100.0, 0.2)]);
    engine.set_predator_population(cod, 1, &[PopInfo::new(cod_numbers, 1.0), PopInfo::new(cod_numbers, 1.0)]);
    (engine, capelin, herring)
}

#[test]
fn test_catch_statistics_end_to_end() {
    let dir = tempdir().unwrap();
    let matching = write(&dir, "catch_a.txt", "; year step area age number mean\n1995 1 a g 5 10.0\n");
    let shifted = write(&dir, "catch_b.txt", "1995 1 a g 5 12.0\n");
    let yaml = format!(
        "{}likelihood:{}{}",
        TIME,
        catch_yaml("catch_a", &matching),
        catch_yaml("catch_b", &shifted)
    );
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let mut engine = fishery(&diag);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    objective.bind(&engine.registry()).unwrap();

    engine.step(&config.time);
    let t = TimeStep::new(1995, 1);
    let step = objective
        .score_step(t, &mut PredatorAggregator::new(&engine))
        .unwrap();

    // 10 fish of mean length 10: a perfect fit and (12 - 10)^2 * 5
    let components = objective.components();
    assert_eq!(components[0].component.likelihood(), 0.0);
    assert_relative_eq!(components[1].component.likelihood(), 20.0, epsilon = 1e-9);
    assert_relative_eq!(step, 20.0, epsilon = 1e-9);

    let rows = objective.print_rows(t).unwrap();
    assert_eq!(rows.len(), 2);
    assert_relative_eq!(rows[0].modelled, 10.0, epsilon = 1e-9);
    assert_eq!(rows[1].observed, 12.0);
    assert_eq!(rows[0].sample_size, Some(5.0));

    // no observations on the next step
    engine.step(&config.time);
    let next = objective
        .score_step(TimeStep::new(1995, 2), &mut PredatorAggregator::new(&engine))
        .unwrap();
    assert_eq!(next, 0.0);
    assert_relative_eq!(objective.total(), 20.0, epsilon = 1e-9);
}

#[test]
fn test_unresolved_rows_are_dropped() {
    let dir = tempdir().unwrap();
    let data = write(
        &dir,
        "catch.txt",
        "1995 1 a g 5 10.0\n1995 1 nowhere g 5 10.0\n1995 2 a g 7 11.0\n1980 1 a g 3 9.0\n",
    );
    let yaml = format!("{}likelihood:{}", TIME, catch_yaml("catch", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();

    let Component::CatchStatistics(catch) = &objective.components()[0].component else {
        panic!("expected a catch statistics component");
    };
    let report = catch.load_report();
    assert_eq!(report.kept, 2);
    assert_eq!(report.dropped, 2);
    // a single aggregate warning for the whole file
    assert_eq!(diag.warnings_for("catch").len(), 1);

    // stored values come back exactly, unresolved keys are absent
    let (n, mean, _) = catch.observation(TimeStep::new(1995, 2), "a", "g").unwrap();
    assert_eq!((n, mean), (7.0, 11.0));
    assert!(catch.observation(TimeStep::new(1995, 1), "nowhere", "g").is_none());
    assert!(catch.observation(TimeStep::new(1995, 3), "a", "g").is_none());
    assert_eq!(catch.steps().len(), 2);
}

#[test]
fn test_empty_file_warns_but_loads() {
    let dir = tempdir().unwrap();
    let data = write(&dir, "catch.txt", "; nothing observed\n");
    let yaml = format!("{}likelihood:{}", TIME, catch_yaml("catch", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    assert_eq!(objective.len(), 1);
    assert_eq!(diag.warning_count(), 1);
}

#[test]
fn test_wrong_column_count_is_fatal() {
    let dir = tempdir().unwrap();
    let data = write(&dir, "catch.txt", "1995 1 a g 5\n");
    let yaml = format!("{}likelihood:{}", TIME, catch_yaml("catch", &data));
    let config = load(&dir, &yaml);

    let result = Objective::from_configs(&config.likelihood, &config.time, &Diagnostics::new());
    assert!(matches!(result, Err(Error::ColumnCount { expected: 6, found: 5, .. })));
}

#[test]
fn test_missing_fleet_is_fatal_at_bind() {
    let dir = tempdir().unwrap();
    let data = write(&dir, "catch.txt", "1995 1 a g 5 10.0\n");
    let yaml = format!("{}likelihood:{}", TIME, catch_yaml("catch", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let (engine, _, _) = food_web(&diag, 1.0);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    let result = objective.bind(&engine.registry());
    assert!(matches!(result, Err(Error::MissingEntity { kind: "fleet", .. })));
}

#[test]
fn test_stomach_numbers_end_to_end() {
    let dir = tempdir().unwrap();
    let data = write(
        &dir,
        "stomach.txt",
        "year step area pred prey count\n\
         1995 1 a small capelin 3\n\
         1995 1 a large capelin 3\n\
         1995 1 a small herring 2\n\
         1995 1 a large herring 0\n",
    );
    let yaml = format!("{}likelihood:{}", TIME, stomach_yaml("stomachs", "scnumbers", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let (mut engine, _, _) = food_web(&diag, 1.0);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    objective.bind(&engine.registry()).unwrap();

    engine.step(&config.time);
    let t = TimeStep::new(1995, 1);
    let lik = objective
        .score_step(t, &mut PredatorAggregator::new(&engine))
        .unwrap();

    // each cod group eats 10 capelin and 1 herring
    let Component::StomachContent(stomachs) = &objective.components()[0].component else {
        panic!("expected a stomach content component");
    };
    assert_relative_eq!(stomachs.modelled(t, "a", "small", "capelin").unwrap(), 10.0, epsilon = 1e-9);
    assert_relative_eq!(stomachs.modelled(t, "a", "large", "herring").unwrap(), 1.0, epsilon = 1e-9);

    let mut mn = Multinomial::default();
    let expected = mn.calc_log_likelihood(&[3.0, 3.0], &[10.0, 10.0]) + mn.calc_log_likelihood(&[2.0, 0.0], &[1.0, 1.0]);
    assert_relative_eq!(lik, expected, epsilon = 1e-9);
    assert_relative_eq!(lik, 12.8f64.ln(), epsilon = 1e-9);
}

#[test]
fn test_stomach_simple_uses_biomass_proportions() {
    let dir = tempdir().unwrap();
    let data = write(
        &dir,
        "stomach.txt",
        "1995 1 a small capelin 3\n\
         1995 1 a small herring 2\n\
         1995 1 a large capelin 3\n",
    );
    let yaml = format!("{}likelihood:{}", TIME, stomach_yaml("stomachs", "simple", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let (mut engine, _, _) = food_web(&diag, 1.0);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    objective.bind(&engine.registry()).unwrap();

    let t = TimeStep::new(1995, 1);
    let Component::StomachContent(stomachs) = &objective.components()[0].component else {
        panic!("expected a stomach content component");
    };
    // observed rows are proportions once bound
    assert_relative_eq!(stomachs.observation(t, "a", "small", "capelin").unwrap(), 0.6, epsilon = 1e-12);
    assert_relative_eq!(stomachs.observation(t, "a", "large", "capelin").unwrap(), 1.0, epsilon = 1e-12);

    engine.step(&config.time);
    let lik = objective
        .score_step(t, &mut PredatorAggregator::new(&engine))
        .unwrap();

    // 0.1 capelin and 0.2 herring biomass eaten by each cod group
    let (c, h) = (1.0 / 3.0, 2.0 / 3.0);
    let expected = (c - 0.6f64).powi(2) + (h - 0.4f64).powi(2) + (c - 1.0f64).powi(2) + h * h;
    assert_relative_eq!(lik, expected, epsilon = 1e-9);
}

#[test]
fn test_normalised_rows_are_unchanged() {
    let dir = tempdir().unwrap();
    let data = write(
        &dir,
        "stomach.txt",
        "1995 1 a small capelin 0.25\n1995 1 a small herring 0.75\n",
    );
    let yaml = format!("{}likelihood:{}", TIME, stomach_yaml("stomachs", "scsimple", &data));
    let config = load(&dir, &yaml);

    let diag = Diagnostics::new();
    let (engine, _, _) = food_web(&diag, 1.0);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    objective.bind(&engine.registry()).unwrap();

    let Component::StomachContent(stomachs) = &objective.components()[0].component else {
        panic!("expected a stomach content component");
    };
    let t = TimeStep::new(1995, 1);
    assert_eq!(stomachs.observation(t, "a", "small", "capelin"), Some(0.25));
    assert_eq!(stomachs.observation(t, "a", "small", "herring"), Some(0.75));
}

#[test]
fn test_zero_model_scores_finite() {
    let dir = tempdir().unwrap();
    let data = write(&dir, "stomach.txt", "1995 1 a small capelin 3\n1995 1 a small herring 1\n");
    let yaml = format!(
        "{}likelihood:{}{}",
        TIME,
        stomach_yaml("numbers", "scnumbers", &data),
        stomach_yaml("simple", "scsimple", &data)
    );
    let config = load(&dir, &yaml);

    // no cod, nothing eaten
    let diag = Diagnostics::new();
    let (mut engine, _, _) = food_web(&diag, 0.0);
    let mut objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
    objective.bind(&engine.registry()).unwrap();

    engine.step(&config.time);
    let total = objective
        .score_step(TimeStep::new(1995, 1), &mut PredatorAggregator::new(&engine))
        .unwrap();

    assert!(total.is_finite());
    assert_eq!(objective.components()[1].component.likelihood(), 0.0);
    assert!(objective.components()[0].component.likelihood() > 0.0);
}

#[test]
fn test_extinct_prey_is_not_eaten() {
    let diag = Diagnostics::new();
    let (mut engine, capelin, herring) = food_web(&diag, 1.0);
    engine.set_prey_population(capelin, 1, &[PopInfo::new(1e-25, 1.0)]);

    engine.step(&trophic::TimeWindow {
        first_year: 1995,
        first_step: 1,
        last_year: 1995,
        last_step: 4,
        steps_per_year: 4,
        substeps: 1,
        step_length: 1.0,
    });

    let cod = &engine.predators()[0];
    let eaten = cod.consumption_of(1, capelin).unwrap();
    assert!(eaten.iter().all(|&v| v == 0.0));
    assert!(cod.substep_consumption(1, 0).unwrap().iter().all(|&v| v == 0.0));
    assert!(cod.consumption_of(1, herring).unwrap().sum() > 0.0);
}

#[test]
fn test_shared_prey_correction_over_two_substeps() {
    let diag = Diagnostics::new();
    let mut engine = ConsumptionEngine::new(diag.clone());
    let prey = engine.add_prey(
        Prey::new("capelin", vec![1], LengthGroupDivision::new(vec![5.0, 15.0]).unwrap(), 0.95).unwrap(),
    );
    for name in ["cod", "saithe"] {
        let handle = engine.add_predator(
            LinearPredator::new(
                name,
                vec![1],
                LengthGroupDivision::new(vec![30.0, 60.0]).unwrap(),
                2.0,
                vec![PreyLink::new(prey, Array2::ones((1, 1)))],
                diag.clone(),
            )
            .unwrap(),
        )
        .unwrap();
        engine.set_predator_population(handle, 1, &[PopInfo::new(1.0, 1.0)]);
    }
    engine.set_prey_population(prey, 1, &[PopInfo::new(100.0, 1.0)]);

    engine.begin_step();
    engine.run_step(1.0, 2);

    // each predator asks for the whole biomass in both substeps
    let raw = 100.0 + 9.75;
    let removed = (100.0 - 45.125) + (9.75 - 4.399_687_5);
    for predator in engine.predators() {
        let total = predator.total_consumption(1).unwrap()[0];
        let over = predator.total_over_consumption(1);
        assert_relative_eq!(over, removed, epsilon = 1e-9);
        assert_relative_eq!(total, raw - removed, epsilon = 1e-9);
        assert_relative_eq!(total + over, raw, epsilon = 1e-9);
        assert!(over >= 0.0);
    }

    let capelin = engine.prey(prey);
    let eaten = capelin.consumption(1).unwrap()[0];
    let over = capelin.over_consumption(1).unwrap()[0];
    assert_relative_eq!(eaten, 2.0 * (raw - removed), epsilon = 1e-9);
    assert_relative_eq!(over, 2.0 * removed, epsilon = 1e-9);

    // never more than 0.95^2 of the biomass left in a substep
    let left = capelin.biomass(1);
    assert_relative_eq!(left, 100.0 * 0.0975 * 0.0975, epsilon = 1e-9);
    assert!(left >= 100.0 * (1.0 - 0.9025f64).powi(2) - 1e-9);
}

/// One predator eating a single-length-group prey of 100 biomass
fn single_link(diag: &Diagnostics, scaler: f64, max_ratio: f64) -> ConsumptionEngine {
    let mut engine = ConsumptionEngine::new(diag.clone());
    let prey = engine.add_prey(
        Prey::new("capelin", vec![1], LengthGroupDivision::new(vec![5.0, 15.0]).unwrap(), max_ratio).unwrap(),
    );
    let cod = engine
        .add_predator(
            LinearPredator::new(
                "cod",
                vec![1],
                LengthGroupDivision::new(vec![30.0, 60.0]).unwrap(),
                scaler,
                vec![PreyLink::new(prey, Array2::ones((1, 1)))],
                diag.clone(),
            )
            .unwrap(),
        )
        .unwrap();
    engine.set_prey_population(prey, 1, &[PopInfo::new(100.0, 1.0)]);
    engine.set_predator_population(cod, 1, &[PopInfo::new(1.0, 1.0)]);
    engine
}

#[test]
fn test_cap_holds_cell_by_cell_after_adjustment() {
    let diag = Diagnostics::new();
    let mut preys = vec![Prey::new(
        "capelin",
        vec![1],
        LengthGroupDivision::new(vec![5.0, 10.0, 15.0, 20.0]).unwrap(),
        0.9,
    )
    .unwrap()];
    preys[0].set_population(
        1,
        &[PopInfo::new(100.0, 1.0), PopInfo::new(50.0, 2.0), PopInfo::new(10.0, 5.0)],
    );

    let suitabilities = [
        vec![1.0, 0.5, 0.01, 0.8, 0.2, 0.01],
        vec![0.6, 0.3, 0.01, 0.4, 0.1, 0.01],
    ];
    let mut predators: Vec<LinearPredator> = suitabilities
        .iter()
        .zip(["cod", "saithe"])
        .map(|(suit, name)| {
            let mut predator = LinearPredator::new(
                name,
                vec![1],
                LengthGroupDivision::new(vec![30.0, 60.0, 90.0]).unwrap(),
                1.0,
                vec![PreyLink::new(PreyHandle(0), Array2::from_shape_vec((2, 3), suit.clone()).unwrap())],
                diag.clone(),
            )
            .unwrap();
            predator.set_population(1, &[PopInfo::new(1.0, 1.0), PopInfo::new(1.0, 1.0)]);
            predator
        })
        .collect();

    let substeps = 2;
    for predator in predators.iter_mut() {
        predator.reset_step();
        predator.compute_consumption(1, 1.0, substeps, &mut preys);
    }
    preys[0].check_consumption(1, substeps);
    for predator in predators.iter_mut() {
        predator.adjust_consumption(1, substeps, &preys);
    }

    let cap = 0.9f64.powi(substeps as i32);
    let mut ratios = Vec::new();
    for l in 0..3 {
        let eaten: f64 = predators
            .iter()
            .map(|p| p.substep_consumption(1, 0).unwrap().column(l).sum())
            .sum();
        let ratio = eaten / preys[0].biomass_at(1, l);
        assert!(ratio <= cap + 1e-12, "length group {} eats {} of its biomass", l, ratio);
        // what the predators keep is what the prey loses
        assert_relative_eq!(eaten, preys[0].consumption(1).unwrap()[l], epsilon = 1e-9);
        ratios.push(ratio);
    }

    // demand ratios were 1.4, 0.55 and 0.02: only the first group is cut back
    assert!(preys[0].too_much_consumption(1));
    assert_relative_eq!(ratios[0], cap, epsilon = 1e-12);
    assert_relative_eq!(ratios[1], 0.55, epsilon = 1e-12);
    assert_relative_eq!(ratios[2], 0.02, epsilon = 1e-12);
}

#[test]
fn test_prey_cap_governs_predator_intake() {
    // demand of twice the biomass against a cap of one half
    let diag = Diagnostics::new();
    let mut engine = single_link(&diag, 2.0, 0.5);
    engine.begin_step();
    engine.run_step(1.0, 1);

    let cod = &engine.predators()[0];
    let capelin = &engine.preys()[0];
    let ate = cod.consumption_biomass(0, 1);
    let lost = capelin.consumption(1).unwrap().sum();
    assert_relative_eq!(ate, 50.0, epsilon = 1e-9);
    assert_relative_eq!(ate, lost, epsilon = 1e-9);
    assert_relative_eq!(cod.total_consumption(1).unwrap()[0], 50.0, epsilon = 1e-9);
    assert_relative_eq!(cod.total_over_consumption(1), 150.0, epsilon = 1e-9);
    assert_relative_eq!(capelin.biomass(1), 50.0, epsilon = 1e-9);
}

#[test]
fn test_negative_scaler_still_computes() {
    let diag = Diagnostics::new();
    let mut engine = single_link(&diag, -0.1, 0.95);
    engine.begin_step();
    engine.run_step(1.0, 2);

    // each substep adds 5% of the current biomass back to the prey
    let cod = &engine.predators()[0];
    assert_relative_eq!(cod.substep_consumption(1, 0).unwrap()[[0, 0]], -5.25, epsilon = 1e-9);
    assert_relative_eq!(cod.consumption_biomass(0, 1), -10.25, epsilon = 1e-9);
    assert_relative_eq!(cod.total_consumption(1).unwrap()[0], -10.25, epsilon = 1e-9);
    assert_eq!(cod.total_over_consumption(1), 0.0);
    assert!(!engine.preys()[0].too_much_consumption(1));
    assert_relative_eq!(engine.preys()[0].biomass(1), 110.25, epsilon = 1e-9);

    // one warning per substep
    assert_eq!(diag.warnings_for("cod").len(), 2);
}

#[test]
fn test_mismatched_suitability_is_rejected() {
    let diag = Diagnostics::new();
    let mut engine = single_link(&diag, 1.0, 0.95);
    let wide = LinearPredator::new(
        "seal",
        vec![1],
        LengthGroupDivision::new(vec![100.0, 200.0]).unwrap(),
        1.0,
        vec![PreyLink::new(PreyHandle(0), Array2::ones((1, 3)))],
        diag.clone(),
    )
    .unwrap();
    assert!(matches!(engine.add_predator(wide), Err(Error::Config(_))));

    engine.begin_step();
    engine.run_step(1.0, 1);
    assert_eq!(engine.predators().len(), 1);
}

#[test]
fn test_repeated_runs_keep_events_bounded() {
    let diag = Diagnostics::new();
    let mut model = trophic::SyntheticModel::new(Config::default().time, 3, 0.95, diag.clone()).unwrap();

    model.run().unwrap();
    let after_first = diag.events().len();
    model.run().unwrap();
    model.run().unwrap();
    assert_eq!(diag.events().len(), after_first);
}

#[test]
fn test_synthetic_run_exports() {
    let dir = tempdir().unwrap();
    let config = Config::default();

    let diag = Diagnostics::new();
    let mut model = trophic::SyntheticModel::new(config.time.clone(), 11, 0.95, diag.clone()).unwrap();
    let (total, rows) = model.run_with_print().unwrap();
    assert!(total.is_finite());

    let manifest =
        ExportSystem::export_full_state(model.objective(), &rows, &diag.events(), dir.path().join("out")).unwrap();
    assert_eq!(manifest.total, total);
    assert!(Path::new(&manifest.summary_file).exists());

    let summary = fs::read_to_string(&manifest.summary_file).unwrap();
    // two components on two areas for every step of the window
    assert_eq!(summary.lines().count(), 1 + 2 * 2 * config.time.steps().len());
}
