//! Deterministic structural checking for authored catalogs.
//!
//! The engine tolerates unknown ids at runtime; this check exists so
//! authoring mistakes surface before a catalog ships, with stable failure
//! classes a build pipeline can assert on.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::stage::{Solution, Stage};

pub const CATALOG_CHECK_KIND: &str = "trellis.catalog.check.v1";

pub const FAILURE_CLASS_DUPLICATE_MODULE_ID: &str = "catalog.module_id.duplicate";
pub const FAILURE_CLASS_DUPLICATE_LESSON_ID: &str = "catalog.lesson_id.duplicate";
pub const FAILURE_CLASS_DUPLICATE_CHALLENGE_ID: &str = "catalog.challenge_id.duplicate";
pub const FAILURE_CLASS_DUPLICATE_STAGE_ID: &str = "catalog.stage_id.duplicate";
pub const FAILURE_CLASS_DEPENDS_ON_MISSING: &str = "catalog.depends_on.missing";
pub const FAILURE_CLASS_DEPENDS_ON_SELF: &str = "catalog.depends_on.self";
pub const FAILURE_CLASS_SOLUTION_PATTERN_INVALID: &str = "catalog.solution_pattern.invalid";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFinding {
    /// Dotted path to the offending entity, e.g. `m1.l2.challenge-3`.
    pub entity: String,
    pub class: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub module_count: usize,
    pub lesson_count: usize,
    pub challenge_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCheckReport {
    pub check_kind: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub errors: Vec<CatalogFinding>,
    pub summary: CatalogSummary,
}

impl CatalogCheckReport {
    pub fn accepted(&self) -> bool {
        self.result == "accepted"
    }
}

fn collect_classes(findings: &[CatalogFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_duplicates(
    scope: &str,
    class: &str,
    ids: impl Iterator<Item = String>,
    errors: &mut Vec<CatalogFinding>,
) {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            errors.push(CatalogFinding {
                entity: format!("{scope}.{id}"),
                class: class.to_string(),
                message: format!("id `{id}` appears more than once in {scope}"),
            });
        }
    }
}

pub fn check_catalog(catalog: &Catalog) -> CatalogCheckReport {
    let mut errors = Vec::new();
    let mut lesson_count = 0;
    let mut challenge_count = 0;

    check_duplicates(
        "catalog",
        FAILURE_CLASS_DUPLICATE_MODULE_ID,
        catalog.modules().iter().map(|m| m.id.clone()),
        &mut errors,
    );

    for module in catalog.modules() {
        if let Some(target) = &module.depends_on {
            if target == &module.id {
                errors.push(CatalogFinding {
                    entity: module.id.clone(),
                    class: FAILURE_CLASS_DEPENDS_ON_SELF.to_string(),
                    message: "module depends on itself".to_string(),
                });
            } else if catalog.module(target).is_none() {
                errors.push(CatalogFinding {
                    entity: module.id.clone(),
                    class: FAILURE_CLASS_DEPENDS_ON_MISSING.to_string(),
                    message: format!("depends_on references unknown module `{target}`"),
                });
            }
        }

        check_duplicates(
            &module.id,
            FAILURE_CLASS_DUPLICATE_LESSON_ID,
            module.lessons.iter().map(|l| l.id.clone()),
            &mut errors,
        );

        for lesson in &module.lessons {
            lesson_count += 1;
            challenge_count += lesson.challenges.len();
            let scope = format!("{}.{}", module.id, lesson.id);

            check_duplicates(
                &scope,
                FAILURE_CLASS_DUPLICATE_CHALLENGE_ID,
                lesson.challenges.iter().map(|c| c.id.clone()),
                &mut errors,
            );
            check_duplicates(
                &scope,
                FAILURE_CLASS_DUPLICATE_STAGE_ID,
                lesson.stages.iter().map(|s| s.id().to_string()),
                &mut errors,
            );

            for stage in &lesson.stages {
                if let Stage::Exercise {
                    solution: Solution::Pattern(pattern),
                    ..
                } = stage
                    && let Err(e) = Regex::new(pattern)
                {
                    errors.push(CatalogFinding {
                        entity: format!("{scope}.{}", stage.id()),
                        class: FAILURE_CLASS_SOLUTION_PATTERN_INVALID.to_string(),
                        message: format!("solution pattern does not compile: {e}"),
                    });
                }
            }
        }
    }

    let failure_classes = collect_classes(&errors);
    let result = if errors.is_empty() {
        "accepted".to_string()
    } else {
        "rejected".to_string()
    };
    let summary = CatalogSummary {
        module_count: catalog.len(),
        lesson_count,
        challenge_count,
        error_count: errors.len(),
    };

    CatalogCheckReport {
        check_kind: CATALOG_CHECK_KIND.to_string(),
        result,
        failure_classes,
        errors,
        summary,
    }
}
