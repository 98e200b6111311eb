//! Frames the binary is made of.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;

use crate::command::{
    Cmd, Command, CommandEnv, CopyToClipboardCmd, TypedCommand, editor_command, poll_until,
};
use crate::confirm::ConfirmOverlay;
use crate::list::{ListAction, ListBrowser};
use crate::logs::{LogQuery, LogTail};
use crate::message::AppMessage;
use crate::repository::ResourceRepository;
use crate::resource::{Resource, ResourceStatus};
use crate::services::Services;
use crate::stack::NavFrame;

const RESTART_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RESTART_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
enum Operation {
    Remove,
    Restart,
}

/// Change one resource through the repository and report it.
struct ResourceOperation {
    repository: Arc<dyn ResourceRepository>,
    resource: Resource,
    operation: Operation,
}

#[async_trait]
impl Command for ResourceOperation {
    fn name(&self) -> String {
        match self.operation {
            Operation::Remove => format!("Removing {}", self.resource.name),
            Operation::Restart => format!("Restarting {}", self.resource.name),
        }
    }

    async fn execute(self: Box<Self>, env: CommandEnv) -> Result<()> {
        let text = match self.operation {
            Operation::Remove => {
                self.repository.remove_resource(&self.resource).await?;
                format!("Removed {}", self.resource.name)
            }
            Operation::Restart => {
                self.repository.restart_resource(&self.resource).await?;
                wait_until_running(&self.repository, &self.resource.id()).await?;
                format!("Restarted {}", self.resource.name)
            }
        };
        env.send(AppMessage::Done { text });
        Ok(())
    }
}

/// Poll the repository until the resource reports `Running`.
async fn wait_until_running(repository: &Arc<dyn ResourceRepository>, id: &str) -> Result<()> {
    poll_until(RESTART_POLL_INTERVAL, RESTART_TIMEOUT, move || async move {
        let resources = repository.list_resources().await?;
        Ok(resources
            .iter()
            .find(|r| r.id() == id)
            .filter(|r| r.status == ResourceStatus::Running)
            .map(|_| ()))
    })
    .await?;
    Ok(())
}

fn operation(
    services: &Arc<Services>,
    operation: Operation,
) -> impl Fn(&Resource) -> Cmd + Send + 'static {
    let repository = Arc::clone(&services.repository);
    move |resource| {
        Cmd::task(ResourceOperation {
            repository: Arc::clone(&repository),
            resource: resource.clone(),
            operation,
        })
    }
}

/// Every resource in the inventory.
pub fn resource_browser(services: &Arc<Services>) -> NavFrame {
    let keys = &services.resolver.keybindings;
    let repository = Arc::clone(&services.repository);
    let loader = move |token: &tokio_util::sync::CancellationToken| {
        TypedCommand::new(
            "Loading resources",
            token,
            |_, repository: Arc<dyn ResourceRepository>| async move {
                repository.list_resources().await
            },
            Arc::clone(&repository),
        )
    };

    let open_logs = {
        let services = Arc::clone(services);
        move |resource: &Resource| {
            Cmd::push(log_tail(&services, resource.clone(), LogQuery::default()))
        }
    };
    let inventory = services.inventory.clone();

    let browser = ListBrowser::new(
        "Resources",
        loader,
        Arc::clone(&services.resolver),
        &services.config.ui,
    )
    .sorted_by(Resource::canonical_order)
    .on_select(open_logs)
    .action(
        ListAction::new(
            keys.resources.remove.clone(),
            "Remove",
            operation(services, Operation::Remove),
        )
        .with_progress("Removing...")
        .confirm(|r: &Resource| format!("Remove {} from {}?", r.name, r.environment))
        .danger(),
    )
    .action(
        ListAction::new(
            keys.resources.restart.clone(),
            "Restart",
            operation(services, Operation::Restart),
        )
        .with_progress("Restarting...")
        .confirm(|r: &Resource| format!("Restart {}?", r.name)),
    )
    .action(
        ListAction::new(keys.browser.copy.clone(), "Copy name", |r: &Resource| {
            Cmd::task(CopyToClipboardCmd::new(r.name.clone(), "name"))
        })
        .without_reload(),
    )
    .action(
        // The list reloads once the editor hands the terminal back
        ListAction::new(keys.resources.edit.clone(), "Edit inventory", move |_: &Resource| {
            Cmd::exec(editor_command(&inventory))
        })
        .without_reload(),
    );

    NavFrame::new(ConfirmOverlay::new(browser, Arc::clone(&services.resolver)))
        .with_breadcrumb("Resources")
}

/// Logs of `resource`. Searching replaces this frame with a fresh one.
pub fn log_tail(services: &Arc<Services>, resource: Resource, query: LogQuery) -> NavFrame {
    let repository = Arc::clone(&services.repository);
    let loader_input = (resource.clone(), query.clone());
    let loader = move |token: &tokio_util::sync::CancellationToken| {
        TypedCommand::new(
            format!("Loading logs of {}", loader_input.0.name),
            token,
            move |token, (resource, query): (Resource, LogQuery)| async move {
                repository.fetch_logs(&resource, &query, token).await
            },
            loader_input,
        )
    };

    let on_search = {
        let services = Arc::clone(services);
        let resource = resource.clone();
        move |query: LogQuery| Cmd::replace(log_tail(&services, resource.clone(), query))
    };

    let tail = LogTail::new(
        resource.name.clone(),
        &query,
        loader,
        on_search,
        Arc::clone(&services.resolver),
        &services.config.ui,
    );
    NavFrame::new(tail).with_breadcrumb(format!("Logs: {}", resource.name))
}
