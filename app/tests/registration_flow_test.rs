use anyhow::Result;
use app::app::core_user::{CoreUserApp, CoreUserCreate};
use app::app::oauth::OAuthApp;
use app::app::workflow::level1::WorkflowLevel1App;
use app::app::workflow::level2::WorkflowLevel2App;
use app::app::workflow::team::WorkflowTeamApp;
use app::module::test::setup_test_app_module;
use bifrost_base::error::BifrostError;
use factories::{CoreUserFactory, Factory, OrganizationFactory, SubFactory};
use infra_utils::infra::test::TEST_RUNTIME;
use model::{CoreUserData, WorkflowLevel1Data, WorkflowLevel2Data, WorkflowTeamData};

#[test]
fn test_register_authenticate_and_build_workflow() -> Result<()> {
    TEST_RUNTIME.block_on(async {
        let (app_module, _rdb) = setup_test_app_module().await;

        // the first user of a new organization becomes its admin
        let founder = app_module
            .core_user_app
            .register(&CoreUserCreate {
                data: CoreUserData {
                    username: "founder".to_string(),
                    email: "founder@example.com".to_string(),
                    ..Default::default()
                },
                password: "Sup3r-secret-pass".to_string(),
                organization_name: "Humanitec".to_string(),
                core_groups: vec![],
                invitation_token: None,
            })
            .await?;
        assert!(founder.data.is_active);

        let issued = app_module.oauth_app.issue_token(founder.id, None, "read write").await?;
        let requester = app_module
            .oauth_app
            .authenticate(Some(&issued.access_token.data.token))
            .await?;
        assert_eq!(requester.organization_id(), founder.data.organization_id);

        let wl1 = app_module
            .workflow_level1_app
            .create_workflow_level1(
                &requester,
                &WorkflowLevel1Data {
                    name: "Program".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(wl1.data.organization_id, founder.data.organization_id);

        let wl2 = app_module
            .workflow_level2_app
            .create_workflow_level2(
                &requester,
                &WorkflowLevel2Data {
                    workflowlevel1_id: wl1.id,
                    name: "Project".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        assert_eq!(wl2.data.created_by_id, Some(founder.id));

        // a member of another organization is invisible to the team
        let outsider = CoreUserFactory {
            organization: SubFactory::Build(OrganizationFactory::named("Elsewhere")),
            ..CoreUserFactory::named("outsider")
        }
        .create(&app_module.repositories)
        .await?;
        let err = app_module
            .workflow_team_app
            .create_workflow_team(
                &requester,
                &WorkflowTeamData {
                    workflow_user_id: outsider.id,
                    workflowlevel1_id: wl1.id,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BifrostError>(),
            Some(BifrostError::ValidationError(_))
        ));

        let team = app_module
            .workflow_team_app
            .create_workflow_team(
                &requester,
                &WorkflowTeamData {
                    workflow_user_id: founder.id,
                    workflowlevel1_id: wl1.id,
                    ..Default::default()
                },
            )
            .await?;
        let listed = app_module
            .workflow_team_app
            .find_workflow_team_list(&requester, Some(wl1.id), None, None)
            .await?;
        assert_eq!(listed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![team.id]);

        let level2s = app_module
            .workflow_level2_app
            .find_workflow_level2_list(&requester, Some(wl1.id), None, None)
            .await?;
        assert_eq!(level2s.len(), 1);
        Ok(())
    })
}
