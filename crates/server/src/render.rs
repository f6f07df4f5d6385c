//! HTML agreement rendering with tera templates.
//!
//! Templates live under `templates/agreements/` as `<name>.html.tera`, one per
//! payment/delivery combination, sharing `layout.html.tera`.

use std::error::Error as _;
use std::io::Write;
use std::path::Path;

use dopgen_core::render::HTML_CONTENT_TYPE;
use dopgen_core::{DocumentFields, DocumentRenderer, RenderError, RenderedContent, TemplateId};
use tempfile::NamedTempFile;
use tera::{Context, Tera};
use tracing::debug;

const TEMPLATE_SUFFIX: &str = ".html.tera";

pub struct TeraDocumentRenderer {
    tera: Tera,
}

impl TeraDocumentRenderer {
    /// Loads every `*.html.tera` under `template_dir`.
    pub fn new(template_dir: &Path) -> Result<Self, RenderError> {
        let pattern = format!("{}/**/*{TEMPLATE_SUFFIX}", template_dir.display());
        let tera = Tera::new(&pattern).map_err(|error| RenderError::Template(error.to_string()))?;
        Ok(Self::with_tera(tera))
    }

    /// The repository templates, compiled in.
    #[cfg(test)]
    pub fn with_embedded_templates() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layout.html.tera", include_str!("../../../templates/agreements/layout.html.tera")),
            (
                "prepayment.html.tera",
                include_str!("../../../templates/agreements/prepayment.html.tera"),
            ),
            (
                "deferment_pay.html.tera",
                include_str!("../../../templates/agreements/deferment_pay.html.tera"),
            ),
            (
                "prepayment_delivery.html.tera",
                include_str!("../../../templates/agreements/prepayment_delivery.html.tera"),
            ),
            (
                "deferment_delivery.html.tera",
                include_str!("../../../templates/agreements/deferment_delivery.html.tera"),
            ),
        ])
        .map_err(|error| RenderError::Template(error.to_string()))?;
        Ok(Self::with_tera(tera))
    }

    fn with_tera(mut tera: Tera) -> Self {
        // Field values come from chat input.
        tera.autoescape_on(vec![TEMPLATE_SUFFIX, ".html"]);
        Self { tera }
    }

    pub fn has_template(&self, template: TemplateId) -> bool {
        let name = template.file_name();
        self.tera.get_template_names().any(|loaded| loaded == name)
    }

    pub fn missing_templates(&self) -> Vec<TemplateId> {
        TemplateId::ALL.into_iter().filter(|template| !self.has_template(*template)).collect()
    }
}

impl DocumentRenderer for TeraDocumentRenderer {
    fn render(
        &self,
        template: TemplateId,
        fields: &DocumentFields,
    ) -> Result<RenderedContent, RenderError> {
        if !self.has_template(template) {
            return Err(RenderError::TemplateNotFound(template.file_name()));
        }

        let context = Context::from_serialize(fields)
            .map_err(|error| RenderError::Template(error.to_string()))?;
        let html = self
            .tera
            .render(&template.file_name(), &context)
            .map_err(|error| RenderError::Template(render_chain(&error)))?;

        let mut staged = NamedTempFile::new().map_err(|error| RenderError::Io(error.to_string()))?;
        staged
            .write_all(html.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(|error| RenderError::Io(error.to_string()))?;
        let bytes =
            std::fs::read(staged.path()).map_err(|error| RenderError::Io(error.to_string()))?;

        debug!(
            event_name = "render.document_staged",
            template = template.name(),
            size = bytes.len(),
            "agreement document rendered"
        );

        Ok(RenderedContent { content_type: HTML_CONTENT_TYPE.to_owned(), bytes })
    }
}

/// Tera nests the useful detail in the error source chain.
fn render_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dopgen_core::{DocumentFields, DocumentRenderer, RenderError, TemplateId};
    use tempfile::TempDir;

    use super::TeraDocumentRenderer;

    fn fields(unload_address: Option<&str>) -> DocumentFields {
        DocumentFields {
            dop_num: "12".to_owned(),
            contract: "15-П".to_owned(),
            current_date: "5 марта 2024 г.".to_owned(),
            company_name: "ООО «Сибирская топливная компания»".to_owned(),
            director_position: "генерального директора".to_owned(),
            director_fio: "Иванова Ивана Ивановича".to_owned(),
            delivery_month_year: "15 июня 2024 года".to_owned(),
            product_name: "Дизельное топливо летнее".to_owned(),
            tons_full: "25 (двадцать пять)".to_owned(),
            price_full: "62 500 (шестьдесят две тысячи пятьсот)".to_owned(),
            basis_full: "франко-автотранспортное средство Покупателя на складе Поставщика."
                .to_owned(),
            location_full: "Нефтебаза № 1, г. Омск".to_owned(),
            pay_date: "05.03.2024".to_owned(),
            initials: "И.И. Иванов".to_owned(),
            unload_address: unload_address.map(str::to_owned),
        }
    }

    fn render_text(
        renderer: &TeraDocumentRenderer,
        template: TemplateId,
        fields: &DocumentFields,
    ) -> String {
        let content = renderer.render(template, fields).expect("render");
        assert_eq!(content.content_type, "text/html; charset=utf-8");
        String::from_utf8(content.bytes).expect("utf-8 html")
    }

    #[test]
    fn embedded_templates_cover_every_combination() {
        let renderer = TeraDocumentRenderer::with_embedded_templates().expect("templates");
        assert!(renderer.missing_templates().is_empty());
    }

    #[test]
    fn prepayment_document_contains_collected_fields() {
        let renderer = TeraDocumentRenderer::with_embedded_templates().expect("templates");
        let html = render_text(&renderer, TemplateId::Prepayment, &fields(None));

        assert!(html.contains("Дополнительное соглашение № 12"));
        assert!(html.contains("к договору поставки № 15-П"));
        assert!(html.contains("5 марта 2024 г."));
        assert!(html.contains("62 500 (шестьдесят две тысячи пятьсот)"));
        assert!(html.contains("100% предварительную оплату"));
        assert!(html.contains("не позднее 05.03.2024"));
        assert!(html.contains("И.И. Иванов"));
        assert!(!html.contains("Адрес разгрузки"));
    }

    #[test]
    fn delivery_templates_include_unload_address_escaped() {
        let renderer = TeraDocumentRenderer::with_embedded_templates().expect("templates");
        let html = render_text(
            &renderer,
            TemplateId::DefermentDelivery,
            &fields(Some("г. Омск, <склад> 3")),
        );

        assert!(html.contains("отсрочкой платежа"));
        assert!(html.contains("Адрес разгрузки: г. Омск, &lt;склад&gt; 3."));
    }

    #[test]
    fn directory_loading_reports_missing_templates() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join("layout.html.tera"),
            "<p>{% block place %}{% endblock place %}</p>",
        )
        .expect("layout");
        fs::write(
            dir.path().join("prepayment.html.tera"),
            "{% extends \"layout.html.tera\" %}{% block place %}{{ dop_num }}{% endblock place %}",
        )
        .expect("prepayment");

        let renderer = TeraDocumentRenderer::new(dir.path()).expect("renderer");
        assert_eq!(
            renderer.missing_templates(),
            vec![
                TemplateId::DefermentPay,
                TemplateId::PrepaymentDelivery,
                TemplateId::DefermentDelivery
            ]
        );

        let html = render_text(&renderer, TemplateId::Prepayment, &fields(None));
        assert_eq!(html, "<p>12</p>");

        let error = renderer
            .render(TemplateId::DefermentPay, &fields(None))
            .expect_err("template is absent");
        assert_eq!(error, RenderError::TemplateNotFound("deferment_pay.html.tera".to_owned()));
    }
}
