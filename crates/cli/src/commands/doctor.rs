use dopgen_core::catalog::{load_catalog, CatalogSources};
use dopgen_core::config::{AppConfig, LoadOptions};
use dopgen_core::TemplateId;
use serde::Serialize;

use crate::commands::CommandResult;

const SKIPPED_DETAILS: &str = "skipped because configuration did not load";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_templates(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_load",
                status: CheckStatus::Skipped,
                details: SKIPPED_DETAILS.to_string(),
            });
            checks.push(DoctorCheck {
                name: "agreement_templates",
                status: CheckStatus::Skipped,
                details: SKIPPED_DETAILS.to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    let sources = CatalogSources::from_config(&config.catalog);
    match load_catalog(&sources) {
        Ok(catalog) => DoctorCheck {
            name: "catalog_load",
            status: CheckStatus::Pass,
            details: format!(
                "{} clients from {}, {} products, {} locations",
                catalog.clients.len(),
                sources.clients_origin(),
                catalog.products.len(),
                catalog.locations.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "catalog_load",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_templates(config: &AppConfig) -> DoctorCheck {
    let missing: Vec<String> = TemplateId::ALL
        .into_iter()
        .map(TemplateId::file_name)
        .filter(|file_name| !config.templates.dir.join(file_name).is_file())
        .collect();

    if missing.is_empty() {
        DoctorCheck {
            name: "agreement_templates",
            status: CheckStatus::Pass,
            details: format!(
                "{} templates found in `{}`",
                TemplateId::ALL.len(),
                config.templates.dir.display()
            ),
        }
    } else {
        DoctorCheck {
            name: "agreement_templates",
            status: CheckStatus::Fail,
            details: format!(
                "missing in `{}`: {}",
                config.templates.dir.display(),
                missing.join(", ")
            ),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
