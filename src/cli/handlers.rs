use crate::application::bootstrap::bootstrap_workspace;
use crate::application::dashboard::{CalendarDashboard, DashboardCommand};
use crate::application::motivation_poller::MotivationPoller;
use crate::application::view::TaskActionKind;
use crate::cli::commands::{AddArgs, Cli, Commands, MonthArgs, TaskIdArgs};
use crate::cli::terminal_view::TerminalView;
use crate::domain::calendar_grid::MonthCursor;
use crate::domain::models::{NewTaskForm, TaskId};
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::config::{load_dashboard_config, DashboardConfig};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::ReqwestTaskStoreClient;
use std::io::{self, Stdout};
use std::sync::Arc;

type TerminalDashboard = CalendarDashboard<ReqwestTaskStoreClient, TerminalView<Stdout>>;

pub async fn run(cli: Cli) -> Result<(), InfraError> {
    let workspace_root = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let workspace = bootstrap_workspace(&workspace_root)?;
    let config = load_dashboard_config(&workspace.config_dir)?;
    log::debug!(
        "workspace={} api={}",
        workspace.workspace_root.display(),
        config.api_base_url
    );

    let client = Arc::new(ReqwestTaskStoreClient::from_config(&config)?);
    let command_log = Arc::new(CommandLog::new(&workspace.logs_dir));
    let view = match cli.command {
        Commands::Month(_) | Commands::Day(_) | Commands::Watch | Commands::Profile => {
            TerminalView::new(io::stdout())
        }
        Commands::Add(_) | Commands::Complete(_) | Commands::Delete(_) => {
            TerminalView::new(io::stdout()).without_grid()
        }
    };
    let mut dashboard = CalendarDashboard::new(Arc::clone(&client), view).with_command_log(command_log);

    match cli.command {
        Commands::Month(args) => cmd_month(&mut dashboard, args).await,
        Commands::Day(args) => {
            dashboard.set_month(MonthCursor::containing(args.date));
            dashboard.dispatch(DashboardCommand::Reload).await?;
            dashboard.dispatch(DashboardCommand::DaySelected(args.date)).await
        }
        Commands::Add(args) => cmd_add(&mut dashboard, args).await,
        Commands::Complete(args) => cmd_task_action(&mut dashboard, args, TaskActionKind::Complete).await,
        Commands::Delete(args) => cmd_task_action(&mut dashboard, args, TaskActionKind::Delete).await,
        Commands::Profile => dashboard.dispatch(DashboardCommand::RefreshProfile).await,
        Commands::Watch => cmd_watch(&mut dashboard, client, &config).await,
    }
}

async fn cmd_month(dashboard: &mut TerminalDashboard, args: MonthArgs) -> Result<(), InfraError> {
    if let (Some(year), Some(month)) = (args.year, args.month) {
        dashboard.set_month(MonthCursor::new(year, month).map_err(InfraError::InvalidDate)?);
    }
    dashboard.dispatch(DashboardCommand::Reload).await
}

async fn cmd_add(dashboard: &mut TerminalDashboard, args: AddArgs) -> Result<(), InfraError> {
    let form = NewTaskForm::new(args.title, args.description.unwrap_or_default(), args.due);
    dashboard.dispatch(DashboardCommand::Reload).await?;
    dashboard.dispatch(DashboardCommand::SubmitTask(form)).await
}

/// Loads the index first so the task's day can be redisplayed after the action.
async fn cmd_task_action(
    dashboard: &mut TerminalDashboard,
    args: TaskIdArgs,
    kind: TaskActionKind,
) -> Result<(), InfraError> {
    let task_id = TaskId::new(args.id.trim());
    dashboard.dispatch(DashboardCommand::Reload).await?;
    if let Some(due_date) = dashboard.index().find(&task_id).map(|task| task.due_date) {
        dashboard.dispatch(DashboardCommand::DaySelected(due_date)).await?;
    }
    dashboard
        .dispatch(DashboardCommand::TaskAction(task_id, kind))
        .await
}

async fn cmd_watch(
    dashboard: &mut TerminalDashboard,
    client: Arc<ReqwestTaskStoreClient>,
    config: &DashboardConfig,
) -> Result<(), InfraError> {
    let mut poller = MotivationPoller::new(client, config.motivation_refresh);
    let mut updates = poller.subscribe();
    if let Err(error) = poller.refresh_once().await {
        log::warn!("initial motivational message unavailable: {error}");
    }
    poller.start();
    log::info!("watching motivational messages every {:?}", poller.period());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let message = updates.borrow_and_update().clone();
                dashboard.show_motivation(&message);
            }
            signal = &mut shutdown => {
                signal?;
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}
