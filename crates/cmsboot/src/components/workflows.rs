//! Workflows: moderation roles plus the workflows that chain them.
//!
//! Reads two document sections. `roles` is optional and is upserted by
//! name; `workflows` is required. Steps are only attached to a workflow
//! when this run created it.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::entities::{NewRole, NewWorkflow, NewWorkflowStep, RoleId, WorkflowId};
use crate::pipeline::component::{decode, entries};
use crate::pipeline::{BootstrapError, Component, PipelineContext, Section, SectionKind};
use crate::store::Store;

const SECTION: &str = "workflows";
const ROLES: &str = "roles";

/// Output of the workflows section.
#[derive(Debug)]
pub struct ResolvedWorkflows {
    pub roles: Section<RoleId>,
    pub workflows: Section<WorkflowId>,
}

#[derive(Debug, Deserialize)]
struct RoleSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WorkflowSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    steps: Vec<StepSpec>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct StepSpec {
    role: String,
    #[serde(default = "default_required")]
    is_required: bool,
    #[serde(default)]
    order: Option<i64>,
}

fn default_required() -> bool {
    true
}

pub struct Workflows;

impl Component for Workflows {
    const KIND: SectionKind = SectionKind::Workflows;

    type Output = ResolvedWorkflows;

    fn parse(
        ctx: &PipelineContext<'_>,
        store: &dyn Store,
        raw: Value,
    ) -> Result<ResolvedWorkflows, BootstrapError> {
        let roles = parse_roles(ctx, store)?;

        let mut workflows = Section::new(SECTION);
        for (key, data) in entries(SECTION, raw)? {
            let spec: WorkflowSpec = decode(SECTION, &key, data)?;
            let name = spec.name.as_deref().unwrap_or(&key);

            let (workflow, created) = store.get_or_create_workflow(&NewWorkflow {
                name,
                is_default: spec.is_default,
                attributes: &spec.attributes,
            })?;
            debug!(workflow = %name, created, "workflow resolved");

            if created {
                for (idx, step) in spec.steps.iter().enumerate() {
                    store.add_workflow_step(
                        workflow,
                        &NewWorkflowStep {
                            role: roles.id(&step.role)?,
                            is_required: step.is_required,
                            order: step.order.unwrap_or(idx as i64 + 1),
                        },
                    )?;
                }
            }
            workflows.insert(key, workflow);
        }

        Ok(ResolvedWorkflows { roles, workflows })
    }

    fn bind(ctx: &mut PipelineContext<'_>, output: ResolvedWorkflows) -> usize {
        let len = output.roles.len() + output.workflows.len();
        ctx.workflows = Some(output);
        len
    }
}

fn parse_roles(
    ctx: &PipelineContext<'_>,
    store: &dyn Store,
) -> Result<Section<RoleId>, BootstrapError> {
    let mut roles = Section::new(ROLES);
    let Some(raw) = ctx.document().section(ROLES) else {
        return Ok(roles);
    };

    let users = ctx.users()?;
    let groups = ctx.groups()?;
    for (key, data) in entries(ROLES, raw.clone())? {
        let spec: RoleSpec = decode(ROLES, &key, data)?;
        let user = spec.user.as_deref().map(|u| users.id(u)).transpose()?;
        let group = spec.group.as_deref().map(|g| groups.id(g)).transpose()?;

        let role = store.upsert_role(&NewRole {
            name: spec.name.as_deref().unwrap_or(&key),
            user,
            group,
            attributes: &spec.attributes,
        })?;
        roles.insert(key, role);
    }
    Ok(roles)
}
