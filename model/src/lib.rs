//! Data model of the bifrost workflow backend.
//!
//! Each entity has a `*Data` payload (the writable part) and a full record
//! type carrying the generated id, public uuid and timestamps.

pub mod core_group;
pub mod core_user;
pub mod email_template;
pub mod hook;
pub mod internationalization;
pub mod oauth;
pub mod organization;
pub mod workflow;

pub use core_group::{CoreGroup, CoreGroupData};
pub use core_user::{CoreUser, CoreUserData};
pub use email_template::{EmailTemplate, EmailTemplateData, EmailTemplateType};
pub use hook::{Hook, HookData};
pub use internationalization::{Internationalization, InternationalizationData};
pub use oauth::{
    AccessToken, AccessTokenData, Application, ApplicationData, AuthorizationGrantType,
    ClientType, RefreshToken, RefreshTokenData,
};
pub use organization::{Organization, OrganizationData};
pub use workflow::{
    WorkflowLevel1, WorkflowLevel1Data, WorkflowLevel2, WorkflowLevel2Data, WorkflowLevel2Sort,
    WorkflowLevel2SortData, WorkflowLevelStatus, WorkflowLevelStatusData, WorkflowLevelType,
    WorkflowLevelTypeData, WorkflowTeam, WorkflowTeamData,
};
