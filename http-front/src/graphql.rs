//! Read-only GraphQL schema served on `/graphql/`.
//!
//! Every query runs with the authenticated [`Requester`] in the request data,
//! so results follow the same organization scoping as the REST resources.

use crate::error::AppError;
use crate::handler::ApiResult;
use crate::server::auth::Auth;
use crate::server::AppState;
use app::app::auth::Requester;
use app::app::core_group::CoreGroupApp;
use app::app::core_user::CoreUserApp;
use app::app::organization::OrganizationApp;
use app::app::workflow::level1::WorkflowLevel1App;
use app::app::workflow::level2::WorkflowLevel2App;
use app::app::workflow::level_status::WorkflowLevelStatusApp;
use app::app::workflow::level_type::WorkflowLevelTypeApp;
use app::app::workflow::team::WorkflowTeamApp;
use app::module::AppModule;
use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use model::{
    CoreGroup, CoreUser, Organization, WorkflowLevel1, WorkflowLevel2, WorkflowLevelStatus,
    WorkflowLevelType, WorkflowTeam,
};
use std::sync::Arc;
use uuid::Uuid;

pub type BifrostSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(app_module: Arc<AppModule>) -> BifrostSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(app_module)
        .finish()
}

#[derive(SimpleObject, Debug, Clone)]
pub struct OrganizationObject {
    pub id: i64,
    pub organization_uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_url: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<Organization> for OrganizationObject {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            organization_uuid: o.organization_uuid,
            name: o.data.name,
            description: o.data.description,
            organization_url: o.data.organization_url,
            industry: o.data.industry,
            phone: o.data.phone,
            create_date: o.create_date,
            edit_date: o.edit_date,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct CoreUserObject {
    pub id: i64,
    pub core_user_uuid: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub organization_id: Option<i64>,
    pub core_groups: Vec<i64>,
}

impl From<CoreUser> for CoreUserObject {
    fn from(u: CoreUser) -> Self {
        Self {
            id: u.id,
            core_user_uuid: u.core_user_uuid,
            username: u.data.username,
            email: u.data.email,
            first_name: u.data.first_name,
            last_name: u.data.last_name,
            title: u.data.title,
            is_active: u.data.is_active,
            organization_id: u.data.organization_id,
            core_groups: u.core_groups,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct CoreGroupObject {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub is_global: bool,
    pub is_org_level: bool,
    pub permissions: i32,
    pub organization_id: Option<i64>,
}

impl From<CoreGroup> for CoreGroupObject {
    fn from(g: CoreGroup) -> Self {
        Self {
            id: g.id,
            uuid: g.uuid,
            name: g.data.name,
            is_global: g.data.is_global,
            is_org_level: g.data.is_org_level,
            permissions: g.data.permissions,
            organization_id: g.data.organization_id,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct WorkflowLevel1Object {
    pub id: i64,
    pub level1_uuid: Uuid,
    pub name: String,
    pub unique_id: Option<String>,
    pub organization_id: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: i32,
}

impl From<WorkflowLevel1> for WorkflowLevel1Object {
    fn from(w: WorkflowLevel1) -> Self {
        Self {
            id: w.id,
            level1_uuid: w.level1_uuid,
            name: w.data.name,
            unique_id: w.data.unique_id,
            organization_id: w.data.organization_id,
            description: w.data.description,
            start_date: w.data.start_date,
            end_date: w.data.end_date,
            sort: w.data.sort,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct WorkflowLevel2Object {
    pub id: i64,
    pub level2_uuid: Uuid,
    pub workflowlevel1_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub short_name: Option<String>,
    pub parent_workflowlevel2: i64,
    pub type_id: Option<i64>,
    pub status_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<WorkflowLevel2> for WorkflowLevel2Object {
    fn from(w: WorkflowLevel2) -> Self {
        Self {
            id: w.id,
            level2_uuid: w.level2_uuid,
            workflowlevel1_id: w.data.workflowlevel1_id,
            name: w.data.name,
            description: w.data.description,
            short_name: w.data.short_name,
            parent_workflowlevel2: w.data.parent_workflowlevel2,
            type_id: w.data.type_id,
            status_id: w.data.status_id,
            start_date: w.data.start_date,
            end_date: w.data.end_date,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct WorkflowTeamObject {
    pub id: i64,
    pub team_uuid: Uuid,
    pub workflow_user_id: i64,
    pub workflowlevel1_id: i64,
    pub role_id: Option<i64>,
    pub status: Option<String>,
}

impl From<WorkflowTeam> for WorkflowTeamObject {
    fn from(t: WorkflowTeam) -> Self {
        Self {
            id: t.id,
            team_uuid: t.team_uuid,
            workflow_user_id: t.data.workflow_user_id,
            workflowlevel1_id: t.data.workflowlevel1_id,
            role_id: t.data.role_id,
            status: t.data.status,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct WorkflowLevelTypeObject {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
}

impl From<WorkflowLevelType> for WorkflowLevelTypeObject {
    fn from(t: WorkflowLevelType) -> Self {
        Self {
            id: t.id,
            uuid: t.uuid,
            name: t.data.name,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct WorkflowLevelStatusObject {
    pub id: i64,
    pub uuid: Uuid,
    pub order: i32,
    pub name: String,
    pub short_name: String,
}

impl From<WorkflowLevelStatus> for WorkflowLevelStatusObject {
    fn from(s: WorkflowLevelStatus) -> Self {
        Self {
            id: s.id,
            uuid: s.uuid,
            order: s.data.order,
            name: s.data.name,
            short_name: s.data.short_name,
        }
    }
}

fn modules<'a>(ctx: &Context<'a>) -> async_graphql::Result<(&'a Arc<AppModule>, &'a Requester)> {
    Ok((ctx.data::<Arc<AppModule>>()?, ctx.data::<Requester>()?))
}

fn collect<M, O: From<M>>(models: Vec<M>) -> Vec<O> {
    models.into_iter().map(O::from).collect()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn organizations(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<OrganizationObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .organization_app
            .find_organization_list(req, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn organization(
        &self,
        ctx: &Context<'_>,
        uuid: Uuid,
    ) -> async_graphql::Result<Option<OrganizationObject>> {
        let (m, req) = modules(ctx)?;
        let org = m.organization_app.find_organization(req, &uuid).await?;
        Ok(org.map(OrganizationObject::from))
    }

    async fn core_users(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<CoreUserObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .core_user_app
            .find_core_user_list(req, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn core_groups(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<CoreGroupObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .core_group_app
            .find_core_group_list(req, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn workflow_level1s(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<WorkflowLevel1Object>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .workflow_level1_app
            .find_workflow_level1_list(req, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn workflow_level2s(
        &self,
        ctx: &Context<'_>,
        workflowlevel1_id: Option<i64>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<WorkflowLevel2Object>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .workflow_level2_app
            .find_workflow_level2_list(req, workflowlevel1_id, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn workflow_teams(
        &self,
        ctx: &Context<'_>,
        workflowlevel1_id: Option<i64>,
        limit: Option<i32>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<WorkflowTeamObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .workflow_team_app
            .find_workflow_team_list(req, workflowlevel1_id, limit.as_ref(), offset.as_ref())
            .await?;
        Ok(collect(list))
    }

    async fn workflow_level_types(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<WorkflowLevelTypeObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .workflow_level_type_app
            .find_workflow_level_type_list(req, None, None)
            .await?;
        Ok(collect(list))
    }

    async fn workflow_level_statuses(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<WorkflowLevelStatusObject>> {
        let (m, req) = modules(ctx)?;
        let list = m
            .workflow_level_status_app
            .find_workflow_level_status_list(req, None, None)
            .await?;
        Ok(collect(list))
    }
}

/// GET /graphql/
pub async fn graphiql(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    if !state.config.graphiql {
        return Err(AppError::not_found());
    }
    Ok(Html(GraphiQLSource::build().endpoint("/graphql/").finish()))
}

/// POST /graphql/
pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request.data(requester)).await)
}
