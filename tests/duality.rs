use float_eq::assert_float_eq;
use lp_duality::builder::Outcome;
use lp_duality::experiments::{Banner, Experiment};
use lp_duality::plot::PlotScene;
use lp_duality::render::{self, Report, Symbol};
use lp_duality::*;

//

#[test]
fn test_report_json()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let report = analyze(&Parameters::default(), &Settings::default()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["scenario"], "strong_duality");
    assert_eq!(json["primal"]["status"], "optimal");
    assert_eq!(json["dual_problem"]["sense"], "minimize");
    assert_eq!(json["parameters"]["sense"], "maximize");
    assert_float_eq!(json["primal"]["objective"].as_f64().unwrap(), 10., abs <= 1e-9);
    assert_eq!(json["shadow_prices"].as_array().unwrap().len(), 2);
}

#[test]
fn test_dual_of_dual_solves_to_primal()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = Settings::default();
    let params = Parameters {
        sense: Sense::Minimize,
        c1: 2.5,
        c2: 1.2,
        a1: 0.7,
        b1: 3.1,
        d1: 5.0,
        a2: 2.2,
        b2: 0.4,
        d2: 8.3,
    };
    let primal = params.primal();
    let twice = primal.dual().dual();
    let a = primal.to_problem().solve(&settings).unwrap();
    let b = twice.to_problem().solve(&settings).unwrap();
    assert_float_eq!(a.objective().unwrap(), b.objective().unwrap(), abs <= 1e-12);
}

#[test]
fn test_experiments_end_to_end()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = Settings::default();
    for experiment in Experiment::all().iter() {
        let params = match experiment.parameters() {
            Some(params) => params,
            None => continue,
        };
        let report = analyze(&params, &settings).unwrap();
        let text = Report(&report).to_string();
        assert!(text.starts_with("Primal Problem"));

        let scene = PlotScene::build(&params, &report.primal, &settings);
        assert_eq!(scene.optimum.is_some(), report.primal.solution().is_some());
        match report.primal {
            Outcome::Optimal(_) => assert!(text.contains("Strong Duality achieved!")),
            _ => assert!(text.contains("Duality gap undefined")),
        }
    }
}

#[test]
fn test_settings_from_file()
{
    let path = std::env::temp_dir().join("lp_duality_settings_test.json");
    std::fs::write(&path, r#"{"grid_points": 11, "strong_duality_tol": 1e-3}"#).unwrap();
    let settings = Settings::from_json_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(settings.grid_points, 11);
    assert_eq!(settings.strong_duality_tol, 1e-3);
    assert_eq!(settings.line_samples, 100);

    let scene = PlotScene::build(&Parameters::default(), &Outcome::Infeasible, &settings);
    assert_eq!(scene.axis.len(), 11);
    assert_float_eq!(scene.axis[1], 0.8, abs <= 1e-12);
}

#[test]
fn test_bad_settings_file()
{
    let path = std::env::temp_dir().join("lp_duality_bad_settings_test.json");
    std::fs::write(&path, r#"{"binding_tol": -1.0}"#).unwrap();
    let result = Settings::from_json_file(&path);
    let _ = std::fs::remove_file(&path);

    match result {
        Err(Error::Settings(_)) => {},
        other => panic!("Expected settings error, got {:?}", other),
    }
}

#[test]
fn test_latex_pair()
{
    let params = Parameters::default();
    let primal = render::latex(&params.primal(), Symbol::X);
    let dual = render::latex(&params.dual(), Symbol::Lambda);
    assert!(primal.contains("\\text{maximize}"));
    assert!(dual.contains("\\text{minimize} & \\quad 4.0\\lambda_1 + 6.0\\lambda_2"));
    assert!(dual.contains("1.0\\lambda_1 + 2.0\\lambda_2 \\geq 3.0"));
}

#[test]
fn test_unbounded_preset_report_text()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let experiment = Experiment::UnboundedPrimal;
    let params = experiment.parameters().unwrap();
    let report = analyze(&params, &Settings::default()).unwrap();
    let text = format!("{}\n\n{}", Banner(experiment), Report(&report));

    assert!(text.starts_with("[warning] Unbounded Primal - Infeasible Dual"));
    assert!(text.contains("The primal can improve indefinitely, making the dual infeasible."));
    assert!(text.contains("Duality gap undefined: unbounded primal, infeasible dual"));
}
