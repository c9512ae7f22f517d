use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::duality::{Parameters, Sense};

/// Preset parameter sets that each show one duality scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Experiment {
    StandardLp,
    UnboundedPrimal,
    InfeasiblePrimal,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Warning,
    Error,
}

impl Tone {
    pub fn tag(&self) -> &'static str {
        match *self {
            Tone::Info => "[info]",
            Tone::Warning => "[warning]",
            Tone::Error => "[error]",
        }
    }
}

/// Header shown above the output of a selected experiment.
pub struct Banner(pub Experiment);

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (tone, message) = self.0.message();
        writeln!(f, "{} {}", tone.tag(), self.0.label())?;
        write!(f, "{:width$} {}", "", message, width = tone.tag().len())
    }
}

impl Experiment {
    pub fn all() -> [Experiment; 4] {
        [
            Experiment::StandardLp,
            Experiment::UnboundedPrimal,
            Experiment::InfeasiblePrimal,
            Experiment::Custom,
        ]
    }

    pub fn label(&self) -> &'static str {
        match *self {
            Experiment::StandardLp => "Standard LP - Strong Duality",
            Experiment::UnboundedPrimal => "Unbounded Primal - Infeasible Dual",
            Experiment::InfeasiblePrimal => "Infeasible Primal - Unbounded Dual",
            Experiment::Custom => "Custom Parameters",
        }
    }

    pub fn message(&self) -> (Tone, &'static str) {
        match *self {
            Experiment::StandardLp => (Tone::Info,
                "This shows the normal case where both problems have optimal \
                 solutions with equal objective values."),
            Experiment::UnboundedPrimal => (Tone::Warning,
                "The primal can improve indefinitely, making the dual infeasible. \
                 This demonstrates weak duality limits."),
            Experiment::InfeasiblePrimal => (Tone::Error,
                "Contradictory constraints make the primal infeasible, causing \
                 the dual to be unbounded."),
            Experiment::Custom => (Tone::Info,
                "Use the custom parameters to explore different scenarios."),
        }
    }

    /// `None` for [`Experiment::Custom`], which keeps whatever the user set.
    pub fn parameters(&self) -> Option<Parameters> {
        match *self {
            Experiment::StandardLp => Some(Parameters::default()),
            // minimize -x1 + 2x2: x1 can grow along both >= constraints
            Experiment::UnboundedPrimal => Some(Parameters {
                sense: Sense::Minimize,
                c1: -1.0,
                c2: 2.0,
                ..Parameters::default()
            }),
            // x1 + x2 <= 4 together with x1 + x2 >= 6
            Experiment::InfeasiblePrimal => Some(Parameters {
                a2: -1.0,
                b2: -1.0,
                d2: -6.0,
                ..Parameters::default()
            }),
            Experiment::Custom => None,
        }
    }
}

#[cfg(test)]
use crate::analysis::{analyze, Scenario};
#[cfg(test)]
use crate::settings::Settings;

#[test]
fn presets_show_their_scenario() {
    let expected = [
        (Experiment::StandardLp, Scenario::StrongDuality),
        (Experiment::UnboundedPrimal, Scenario::UnboundedPrimal),
        (Experiment::InfeasiblePrimal, Scenario::InfeasiblePrimal),
    ];
    for &(experiment, scenario) in expected.iter() {
        let params = experiment.parameters().expect("Preset has parameters");
        let report = analyze(&params, &Settings::default())
            .expect("Analysis should not fail");
        assert_eq!(report.scenario, scenario, "{}", experiment.label());
    }
    assert!(Experiment::Custom.parameters().is_none());
}

#[test]
fn messages_match_tone() {
    assert_eq!(Experiment::StandardLp.message().0, Tone::Info);
    assert_eq!(Experiment::UnboundedPrimal.message().0, Tone::Warning);
    assert_eq!(Experiment::InfeasiblePrimal.message().0, Tone::Error);
    assert_eq!(Experiment::all().len(), 4);
}

#[test]
fn banner_carries_tone_and_message() {
    let text = Banner(Experiment::UnboundedPrimal).to_string();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("[warning] Unbounded Primal - Infeasible Dual"));
    let message = lines.next().expect("Banner has a message line");
    assert!(message.starts_with("          The primal can improve indefinitely"));

    let text = Banner(Experiment::InfeasiblePrimal).to_string();
    assert!(text.starts_with("[error] Infeasible Primal"));
    assert!(text.contains("Contradictory constraints make the primal infeasible"));
}
