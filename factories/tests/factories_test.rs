use anyhow::Result;
use factories::organization::DEFAULT_ORGANIZATION_NAME;
use factories::workflow::{DEFAULT_WORKFLOW_LEVEL1_NAME, DEFAULT_WORKFLOW_LEVEL2_NAME};
use factories::{
    CoreGroupFactory, CoreUserFactory, Factory, InternationalizationFactory, OrganizationFactory,
    SubFactory, WorkflowLevel1Factory, WorkflowLevel2Factory, WorkflowLevel2SortFactory,
    WorkflowTeamFactory,
};
use infra::infra::module::test::setup_test_rdb_module;
use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
use infra_utils::infra::rdb::UseRdbPool;
use infra_utils::infra::test::TEST_RUNTIME;

#[test]
fn test_get_or_create() -> Result<()> {
    TEST_RUNTIME.block_on(async {
        let (module, _rdb) = setup_test_rdb_module().await;
        let org = OrganizationFactory::default().create(&module).await?;
        assert_eq!(org.data.name, DEFAULT_ORGANIZATION_NAME);
        let again = OrganizationFactory::default().create(&module).await?;
        assert_eq!(again.id, org.id);
        let other = OrganizationFactory::named("Other").create(&module).await?;
        assert_ne!(other.id, org.id);
        let repo = module.organization_repository();
        assert_eq!(repo.count_list_tx(repo.db_pool(), None).await?, 2);

        let user = CoreUserFactory::default().create(&module).await?;
        assert_eq!(user.data.organization_id, Some(org.id));
        let same = CoreUserFactory {
            organization: SubFactory::Existing(other.id),
            ..CoreUserFactory::default()
        }
        .create(&module)
        .await?;
        assert_eq!(same.id, user.id);
        assert_eq!(same.data.organization_id, Some(org.id));
        Ok(())
    })
}

#[test]
fn test_sub_factories() -> Result<()> {
    TEST_RUNTIME.block_on(async {
        let (module, _rdb) = setup_test_rdb_module().await;
        let group = CoreGroupFactory {
            is_org_level: true,
            permissions: 0b0100,
            ..Default::default()
        }
        .create(&module)
        .await?;
        assert!(group.data.organization_id.is_some());

        let wl2 = WorkflowLevel2Factory::default().create(&module).await?;
        assert_eq!(wl2.data.name, DEFAULT_WORKFLOW_LEVEL2_NAME);

        let team = WorkflowTeamFactory {
            workflow_user: SubFactory::Build(CoreUserFactory::named("paul")),
            workflowlevel1: SubFactory::Existing(wl2.data.workflowlevel1_id),
            role: SubFactory::Existing(group.id),
            ..Default::default()
        }
        .create(&module)
        .await?;
        assert_eq!(team.data.workflowlevel1_id, wl2.data.workflowlevel1_id);
        assert_eq!(team.data.role_id, Some(group.id));

        let no_role = WorkflowTeamFactory {
            role: SubFactory::Empty,
            ..Default::default()
        }
        .create(&module)
        .await?;
        assert!(no_role.data.role_id.is_none());

        let sort = WorkflowLevel2SortFactory {
            workflowlevel2_pk: wl2.id,
            sort_array: vec![serde_json::json!(1), serde_json::json!(2)],
            ..Default::default()
        }
        .create(&module)
        .await?;
        assert!(sort.data.workflowlevel1_id.is_some());
        assert!(sort.data.workflowlevel2_parent_id.is_some());

        let required = WorkflowLevel2Factory {
            workflowlevel1: SubFactory::Empty,
            ..Default::default()
        }
        .create(&module)
        .await;
        assert!(required.is_err());

        let wl1 = WorkflowLevel1Factory::default().create(&module).await?;
        assert_eq!(wl1.data.name, DEFAULT_WORKFLOW_LEVEL1_NAME);
        assert!(wl1.data.organization_id.is_none());

        let i18n = InternationalizationFactory::default().create(&module).await?;
        let parsed: serde_json::Value = serde_json::from_str(&i18n.data.language_file)?;
        assert_eq!(parsed["gender"], "Gênero");
        Ok(())
    })
}
