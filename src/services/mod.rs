//! API services
//!
//! One file per endpoint family. Each exposes:
//!
//! - the resource records it returns
//! - options structs for its list, create and update calls
//! - a `*Service` trait describing the endpoints
//! - a struct implementing it, obtained from an accessor on [`Client`](crate::client::Client)
//!
//! Every method takes caller overrides as `&[RequestOption]` and returns the
//! decoded value together with the response metadata.

mod access_requests;
mod audit_events;
mod branches;
mod broadcast_messages;
mod deploy_keys;
mod deploy_tokens;
mod jobs;
mod markdown_uploads;
mod protected_branches;
mod system_hooks;
mod todos;

pub use access_requests::{
    AccessRequest, AccessRequests, AccessRequestsService, ApproveAccessRequestOptions,
    ListAccessRequestsOptions,
};
pub use audit_events::{
    AuditEvent, AuditEventDetails, AuditEvents, AuditEventsService, ListAuditEventsOptions,
};
pub use branches::{Branch, Branches, BranchesService, CreateBranchOptions, ListBranchesOptions};
pub use broadcast_messages::{
    BroadcastMessage, BroadcastMessages, BroadcastMessagesService, CreateBroadcastMessageOptions,
    ListBroadcastMessagesOptions, UpdateBroadcastMessageOptions,
};
pub use deploy_keys::{
    AddDeployKeyOptions, AddInstanceDeployKeyOptions, DeployKeyProject, DeployKeys,
    DeployKeysService, InstanceDeployKey, ListInstanceDeployKeysOptions,
    ListProjectDeployKeysOptions, ProjectDeployKey, UpdateDeployKeyOptions,
};
pub use deploy_tokens::{
    CreateDeployTokenOptions, DeployToken, DeployTokens, DeployTokensService,
    ListDeployTokensOptions,
};
pub use jobs::{
    Bridge, DownloadArtifactsFileOptions, GetJobTokensJobOptions, Job, JobArtifact,
    JobArtifactsFile, JobPipeline, JobRunner, JobScope, JobVariable, Jobs, JobsService,
    ListJobsOptions, PlayJobOptions,
};
pub use markdown_uploads::{
    ListMarkdownUploadsOptions, MarkdownUpload, MarkdownUploadedFile, MarkdownUploads,
    MarkdownUploadsService,
};
pub use protected_branches::{
    BranchAccessDescription, BranchPermissionOptions, ListProtectedBranchesOptions,
    ProtectBranchOptions, ProtectedBranch, ProtectedBranches, ProtectedBranchesService,
    UpdateProtectedBranchOptions,
};
pub use system_hooks::{
    AddHookOptions, Hook, HookEvent, ListHooksOptions, SystemHooks, SystemHooksService,
};
pub use todos::{ListTodosOptions, Todo, TodoTarget, Todos, TodosService};
