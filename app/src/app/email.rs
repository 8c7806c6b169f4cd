use super::UseSettings;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::settings::Settings;
use infra::infra::email::{EmailMessage, UseEmailSender};
use infra::infra::email_template::rdb::{EmailTemplateRepository, UseEmailTemplateRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use model::{EmailTemplate, EmailTemplateType};
use std::sync::Arc;

pub const DEFAULT_RESET_PASSWORD_SUBJECT: &str = "Reset your password";
pub const DEFAULT_INVITATION_SUBJECT: &str = "You have been invited";

const PASSWORD_RESET_TXT: &str = "\
You're receiving this email because you requested a password reset for your user account.

Please go to the following page and choose a new password:

{{ password_reset_link }}

Your username, in case you've forgotten: {{ user.username }}

Thanks for using our site!
";

const PASSWORD_RESET_HTML: &str = "\
<p>You're receiving this email because you requested a password reset for your user account.</p>
<p>Please go to the following page and choose a new password:</p>
<p><a href=\"{{ password_reset_link }}\">{{ password_reset_link }}</a></p>
<p>Your username, in case you've forgotten: {{ user.username }}</p>
<p>Thanks for using our site!</p>
";

const INVITATION_TXT: &str = "\
You have been invited to join {{ organization_name }}.

Please go to the following page to create your account:

{{ registration_link }}
";

const INVITATION_HTML: &str = "\
<p>You have been invited to join {{ organization_name }}.</p>
<p>Please go to the following page to create your account:</p>
<p><a href=\"{{ registration_link }}\">{{ registration_link }}</a></p>
";

/// (subject, text, html) used when no template is stored
fn builtin_template(r#type: EmailTemplateType) -> (&'static str, &'static str, &'static str) {
    match r#type {
        EmailTemplateType::ResetPassword => (
            DEFAULT_RESET_PASSWORD_SUBJECT,
            PASSWORD_RESET_TXT,
            PASSWORD_RESET_HTML,
        ),
        EmailTemplateType::Invitation => {
            (DEFAULT_INVITATION_SUBJECT, INVITATION_TXT, INVITATION_HTML)
        }
    }
}

/// render a liquid template with a json object context
pub fn render_template(template: &str, context: &serde_json::Value) -> Result<String> {
    let parser = liquid::ParserBuilder::with_stdlib()
        .build()
        .map_err(BifrostError::TemplateError)?;
    let template = parser.parse(template).map_err(BifrostError::TemplateError)?;
    let globals = liquid::to_object(context).map_err(BifrostError::TemplateError)?;
    template
        .render(&globals)
        .map_err(|e| BifrostError::TemplateError(e).into())
}

#[async_trait]
pub trait EmailApp: UseEmailTemplateRepository + UseEmailSender + UseSettings + Send + Sync {
    /// template of the organization, otherwise the one of DEFAULT_ORG
    async fn find_email_template(
        &self,
        organization_id: Option<i64>,
        r#type: EmailTemplateType,
    ) -> Result<Option<EmailTemplate>> {
        if let Some(org_id) = organization_id {
            if let Some(t) = self
                .email_template_repository()
                .find_by_organization(org_id, r#type)
                .await?
            {
                return Ok(Some(t));
            }
        }
        self.email_template_repository()
            .find_by_organization_name(&self.settings().default_org, r#type)
            .await
    }

    /// render the stored (or built-in) template and send it. returns the sent count
    async fn send_templated_email(
        &self,
        to: &str,
        organization_id: Option<i64>,
        r#type: EmailTemplateType,
        context: &serde_json::Value,
    ) -> Result<usize> {
        let message = match self.find_email_template(organization_id, r#type).await? {
            Some(tpl) if !tpl.data.template.is_empty() => EmailMessage {
                from: self.settings().default_from_email.clone(),
                to: vec![to.to_string()],
                subject: tpl.data.subject.clone(),
                body: render_template(&tpl.data.template, context)?,
                html_body: match tpl.data.template_html.as_deref() {
                    Some(html) if !html.is_empty() => Some(render_template(html, context)?),
                    _ => None,
                },
            },
            _ => {
                let (subject, text, html) = builtin_template(r#type);
                EmailMessage {
                    from: self.settings().default_from_email.clone(),
                    to: vec![to.to_string()],
                    subject: subject.to_string(),
                    body: render_template(text, context)?,
                    html_body: Some(render_template(html, context)?),
                }
            }
        };
        self.email_sender().send(&message).await?;
        tracing::debug!("sent {} email to {}", r#type, to);
        Ok(1)
    }
}

#[derive(Debug, Clone)]
pub struct EmailAppImpl {
    settings: Arc<Settings>,
    repositories: Arc<RdbRepositoryModule>,
}

impl EmailAppImpl {
    pub fn new(settings: Arc<Settings>, repositories: Arc<RdbRepositoryModule>) -> Self {
        Self {
            settings,
            repositories,
        }
    }
}

impl UseRdbRepositoryModule for EmailAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseSettings for EmailAppImpl {
    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl EmailApp for EmailAppImpl {}

pub trait UseEmailApp {
    fn email_app(&self) -> &EmailAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
    use infra_utils::infra::rdb::UseRdbPool;
    use infra_utils::infra::test::TEST_RUNTIME;
    use model::{EmailTemplateData, OrganizationData};
    use serde_json::json;

    #[test]
    fn test_render_template() -> Result<()> {
        let text = render_template(
            "{{ password_reset_link }} for {{ user.username }}",
            &json!({"password_reset_link": "http://x/1/t/", "user": {"username": "alice"}}),
        )?;
        assert_eq!(text, "http://x/1/t/ for alice");
        assert!(render_template("{% if %}", &json!({})).is_err());
        Ok(())
    }

    #[test]
    fn test_template_fallback() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let repositories = Arc::new(module);
            let app = EmailAppImpl::new(Arc::new(Settings::default()), repositories.clone());
            let db = repositories.db_pool();
            let mut tx = db.begin().await?;
            let default_org = repositories
                .organization_repository()
                .create(
                    &mut tx,
                    &OrganizationData {
                        name: "Default Organization".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            let org = repositories
                .organization_repository()
                .create(
                    &mut tx,
                    &OrganizationData {
                        name: "Other".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            tx.commit().await?;
            let context = json!({"password_reset_link": "http://front/reset/", "user": {"username": "bob"}});

            // built-in
            assert_eq!(
                app.send_templated_email("bob@example.com", Some(org.id), EmailTemplateType::ResetPassword, &context)
                    .await?,
                1
            );
            let sent = app.email_sender().outbox();
            assert_eq!(sent[0].subject, DEFAULT_RESET_PASSWORD_SUBJECT);
            assert!(sent[0].body.contains("http://front/reset/"));
            assert!(sent[0].html_body.as_ref().unwrap().contains("bob"));

            // default organization template
            app.email_template_repository()
                .create(
                    db,
                    &EmailTemplateData {
                        organization_id: default_org.id,
                        r#type: EmailTemplateType::ResetPassword,
                        subject: "Default subject".to_string(),
                        template: "default {{ password_reset_link }}".to_string(),
                        template_html: None,
                    },
                )
                .await?;
            app.send_templated_email("bob@example.com", Some(org.id), EmailTemplateType::ResetPassword, &context)
                .await?;
            let sent = app.email_sender().outbox();
            assert_eq!(sent[1].subject, "Default subject");
            assert_eq!(sent[1].body, "default http://front/reset/");
            assert_eq!(sent[1].html_body, None);

            // organization template wins
            app.email_template_repository()
                .create(
                    db,
                    &EmailTemplateData {
                        organization_id: org.id,
                        r#type: EmailTemplateType::ResetPassword,
                        subject: "Org subject".to_string(),
                        template: "org {{ user.username }}".to_string(),
                        template_html: Some("<b>{{ user.username }}</b>".to_string()),
                    },
                )
                .await?;
            app.send_templated_email("bob@example.com", Some(org.id), EmailTemplateType::ResetPassword, &context)
                .await?;
            let sent = app.email_sender().outbox();
            assert_eq!(sent[2].subject, "Org subject");
            assert_eq!(sent[2].body, "org bob");
            assert_eq!(sent[2].html_body.as_deref(), Some("<b>bob</b>"));
            Ok(())
        })
    }
}
