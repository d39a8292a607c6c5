//! Static catalog of application steps per program.

use std::collections::BTreeMap;

use serde::Serialize;

use super::model::NewApplication;

/// One step of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStep {
    pub id: String,
    pub label_key: String,
}

/// The steps a program's application walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramSteps {
    pub program_id: String,
    pub title_key: String,
    pub description_key: String,
    pub steps: Vec<ApplicationStep>,
}

impl ProgramSteps {
    /// Seed for starting an application of this program.
    pub fn new_application(&self) -> NewApplication {
        NewApplication {
            program_id: self.program_id.clone(),
            title_key: self.title_key.clone(),
            total_steps: self.steps.len() as u32,
        }
    }
}

/// (program id, translation slug, [(step id, step label slug)])
type Entry = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const BUNDLED: &[Entry] = &[
    (
        "1",
        "childcare",
        &[
            ("income", "income"),
            ("id", "idDocument"),
            ("childcare", "childcareContract"),
            ("digid", "digid"),
        ],
    ),
    (
        "2",
        "childBudget",
        &[
            ("family", "familyComposition"),
            ("income", "incomeDetails"),
            ("bank", "bankAccount"),
        ],
    ),
    (
        "3",
        "healthcare",
        &[
            ("insurance", "insuranceInfo"),
            ("income", "incomeDetails"),
            ("bank", "bankAccount"),
        ],
    ),
    (
        "4",
        "housing",
        &[
            ("rental", "rentalContract"),
            ("income", "incomeDetails"),
            ("household", "householdInfo"),
            ("bank", "bankAccount"),
        ],
    ),
    (
        "5",
        "municipal",
        &[
            ("situation", "currentSituation"),
            ("expenses", "expenses"),
            ("documents", "supportingDocs"),
        ],
    ),
];

/// Read-only lookup from program id to its steps.
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: BTreeMap<String, ProgramSteps>,
}

impl ProgramCatalog {
    /// The catalog shipped with the crate.
    pub fn bundled() -> Self {
        Self::from_programs(BUNDLED.iter().map(|(id, slug, steps)| ProgramSteps {
            program_id: id.to_string(),
            title_key: format!("programs.{slug}.title"),
            description_key: format!("programs.{slug}.description"),
            steps: steps
                .iter()
                .map(|(step_id, label)| ApplicationStep {
                    id: step_id.to_string(),
                    label_key: format!("application.steps.{label}"),
                })
                .collect(),
        }))
    }

    pub fn from_programs(programs: impl IntoIterator<Item = ProgramSteps>) -> Self {
        Self {
            programs: programs
                .into_iter()
                .map(|p| (p.program_id.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, program_id: &str) -> Option<&ProgramSteps> {
        self.programs.get(program_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramSteps> {
        self.programs.values()
    }
}
