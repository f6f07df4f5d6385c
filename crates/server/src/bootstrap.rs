use std::sync::Arc;

use dopgen_core::catalog::{load_catalog, CatalogSources};
use dopgen_core::config::AppConfig;
use dopgen_core::{ApplicationError, Catalog, DialogueEngine, InMemorySessionStore};
use dopgen_telegram::client::BotApiClient;
use dopgen_telegram::conversation::{conversation_dispatcher, ConversationService};
use dopgen_telegram::polling::{PollingRunner, ReconnectPolicy};
use tracing::{info, warn};

use crate::render::TeraDocumentRenderer;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub runner: PollingRunner,
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, ApplicationError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Arc::new(load_catalog(&CatalogSources::from_config(&config.catalog))?);

    let renderer = TeraDocumentRenderer::new(&config.templates.dir)
        .map_err(|error| ApplicationError::Integration(error.to_string()))?;
    let missing = renderer.missing_templates();
    if missing.is_empty() {
        info!(
            event_name = "system.bootstrap.templates_loaded",
            correlation_id = "bootstrap",
            templates_dir = %config.templates.dir.display(),
            "agreement templates loaded"
        );
    } else {
        warn!(
            event_name = "system.bootstrap.templates_missing",
            correlation_id = "bootstrap",
            templates_dir = %config.templates.dir.display(),
            missing = ?missing.iter().map(|template| template.file_name()).collect::<Vec<_>>(),
            "some agreement templates are missing; those documents will fail to render"
        );
    }

    let client = Arc::new(
        BotApiClient::new(&config.telegram)
            .map_err(|error| ApplicationError::Integration(error.to_string()))?,
    );
    let engine = Arc::new(DialogueEngine::with_system_clock(catalog.clone(), Arc::new(renderer)));
    let service = Arc::new(ConversationService::new(
        engine,
        Arc::new(InMemorySessionStore::default()),
        client.clone(),
    ));
    let runner =
        PollingRunner::new(client, conversation_dispatcher(service), ReconnectPolicy::default());

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        "application bootstrap complete"
    );

    Ok(Application { config, catalog, runner })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use dopgen_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use dopgen_core::ApplicationError;
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap_with_config, Application};

    fn bootstrap(options: LoadOptions) -> Result<Application, ApplicationError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    fn write_catalog(dir: &Path) {
        fs::write(dir.join("aliases.json"), r#"{"companies": {"сиб": "Сибирская компания"}}"#)
            .expect("aliases");
        fs::write(dir.join("products.json"), r#"{"дтл": "Дизельное топливо летнее"}"#)
            .expect("products");
        fs::write(dir.join("locations.json"), r#"{"омск": "Нефтебаза, г. Омск"}"#)
            .expect("locations");
        fs::write(
            dir.join("clients.json"),
            r#"{"sib": {"company_name": "Сибирская компания", "contract": "1",
                "director_position": "директора", "director_fio": "Иванова И.И.",
                "initials": "И.И. Иванов"}}"#,
        )
        .expect("clients");
    }

    fn options(dir: &Path, token: &str) -> LoadOptions {
        LoadOptions {
            config_path: Some(dir.join("absent.toml")),
            require_file: false,
            overrides: ConfigOverrides {
                bot_token: Some(token.to_owned()),
                data_dir: Some(dir.to_path_buf()),
                clients_file: Some(dir.join("clients.json")),
                templates_dir: Some(dir.join("templates")),
                ..ConfigOverrides::default()
            },
        }
    }

    #[test]
    fn bootstrap_fails_fast_on_malformed_bot_token() {
        let dir = TempDir::new().expect("tempdir");
        write_catalog(dir.path());

        let error = bootstrap(options(dir.path(), "not-a-token")).err().expect("error");
        assert!(matches!(error, ApplicationError::Config(_)));
        assert!(error.to_string().contains("telegram.bot_token"));
    }

    #[test]
    fn bootstrap_fails_fast_on_missing_catalog() {
        let dir = TempDir::new().expect("tempdir");

        let error = bootstrap(options(dir.path(), "123456:secret")).err().expect("error");
        assert!(matches!(error, ApplicationError::Catalog(_)));
    }

    #[test]
    fn bootstrap_loads_catalog_and_tolerates_missing_templates() {
        let dir = TempDir::new().expect("tempdir");
        write_catalog(dir.path());

        let app = bootstrap(options(dir.path(), "123456:secret")).expect("bootstrap");
        assert_eq!(app.catalog.clients.len(), 1);
        assert_eq!(app.catalog.products.len(), 1);
        assert_eq!(app.config.telegram.poll_timeout_secs, 30);
    }
}
