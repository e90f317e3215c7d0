//! Notification CLI commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use chainview_client::api::{BulkOperation, NotificationApi};
use chainview_core::config::AppConfig;
use chainview_core::error::AppError;
use chainview_core::types::id::NotificationId;
use chainview_core::types::pagination::PageRequest;
use chainview_entity::notification::{
    Notification, NotificationFilter, NotificationKind, NotificationStatus,
};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only this status (unread, read, archived)
    #[arg(long)]
    pub status: Option<String>,

    /// Only this notification type (e.g. order_confirmed)
    #[arg(long = "type")]
    pub kind: Option<String>,

    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Page size (defaults to api.page_size)
    #[arg(long)]
    pub limit: Option<u64>,

    /// Follow pagination to the last page
    #[arg(long)]
    pub all: bool,
}

impl ListArgs {
    /// Parse the filter flags.
    pub fn filter(&self) -> Result<NotificationFilter, AppError> {
        let mut filter = NotificationFilter::all();
        if let Some(status) = &self.status {
            let status = status
                .parse::<NotificationStatus>()
                .map_err(AppError::validation)?;
            filter = filter.with_status(status);
        }
        if let Some(kind) = &self.kind {
            let kind = kind
                .parse::<NotificationKind>()
                .map_err(AppError::validation)?;
            filter = filter.with_kind(kind);
        }
        Ok(filter)
    }
}

/// One or more notification ids
#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Notification ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

impl IdsArgs {
    fn ids(&self) -> Vec<NotificationId> {
        self.ids.iter().map(|raw| NotificationId::new(raw.as_str())).collect()
    }
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Notification ids
    #[command(flatten)]
    pub target: IdsArgs,

    /// Skip confirmation
    #[arg(long)]
    pub force: bool,
}

/// Confirmation flag
#[derive(Debug, Args)]
pub struct ConfirmArgs {
    /// Skip confirmation
    #[arg(long)]
    pub force: bool,
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// Notification ID
    id: String,
    /// Type
    kind: String,
    /// Priority
    priority: String,
    /// Status
    status: String,
    /// Title
    title: String,
    /// Created
    created: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind.to_string(),
            priority: n.priority.as_str().to_string(),
            status: n.status.to_string(),
            title: n.title.clone(),
            created: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// `list`
pub async fn list(
    api: &dyn NotificationApi,
    config: &AppConfig,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let filter = args.filter()?;
    let mut request = PageRequest::new(args.page, args.limit.unwrap_or(config.api.page_size));
    let mut rows = Vec::new();

    let info = loop {
        let page = api.list(&filter, request).await?;
        rows.extend(page.notifications.iter().map(NotificationRow::from));
        if !args.all || !page.pagination.has_next() {
            break page.pagination;
        }
        request = request.next();
    };

    output::print_list(&rows, format, "No notifications found.");
    if format == OutputFormat::Table {
        println!(
            "Page {} of {} ({} total)",
            info.page,
            info.pages.max(1),
            info.total
        );
    }
    Ok(())
}

/// `summary`
pub async fn summary(api: &dyn NotificationApi, format: OutputFormat) -> Result<(), AppError> {
    let summary = api.summary().await?;

    match format {
        OutputFormat::Json => output::print_json(&summary),
        OutputFormat::Table => {
            output::print_kv("Total", &summary.total_count.to_string());
            output::print_kv("Unread", &summary.unread_count.to_string());
            output::print_kv("High priority", &summary.high_priority_count.to_string());
            output::print_kv("Urgent", &summary.urgent_count.to_string());
            for (kind, count) in &summary.by_kind {
                output::print_kv(&format!("  {kind}"), &count.to_string());
            }
            output::print_kv(
                "Last updated",
                &summary.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
            );
        }
    }
    Ok(())
}

/// `read`
pub async fn read(api: &dyn NotificationApi, args: &IdsArgs) -> Result<(), AppError> {
    apply(api, BulkOperation::MarkRead, &args.ids()).await?;
    output::print_success(&format!("Marked {} read", plural(args.ids.len())));
    Ok(())
}

/// `unread`
pub async fn unread(api: &dyn NotificationApi, args: &IdsArgs) -> Result<(), AppError> {
    apply(api, BulkOperation::MarkUnread, &args.ids()).await?;
    output::print_success(&format!("Marked {} unread", plural(args.ids.len())));
    Ok(())
}

/// `archive`
pub async fn archive(api: &dyn NotificationApi, args: &IdsArgs) -> Result<(), AppError> {
    apply(api, BulkOperation::Archive, &args.ids()).await?;
    output::print_success(&format!("Archived {}", plural(args.ids.len())));
    Ok(())
}

/// `delete`
pub async fn delete(api: &dyn NotificationApi, args: &DeleteArgs) -> Result<(), AppError> {
    let count = args.target.ids.len();
    if !super::confirm(&format!("Delete {}?", plural(count)), args.force)? {
        println!("Cancelled.");
        return Ok(());
    }
    apply(api, BulkOperation::Delete, &args.target.ids()).await?;
    output::print_success(&format!("Deleted {}", plural(count)));
    Ok(())
}

/// `read-all`: collect every unread id first, then send one bulk request.
pub async fn read_all(
    api: &dyn NotificationApi,
    config: &AppConfig,
    args: &ConfirmArgs,
) -> Result<(), AppError> {
    let filter = NotificationFilter::all().with_status(NotificationStatus::Unread);
    let mut request = PageRequest::first(config.api.page_size);
    let mut ids = Vec::new();

    loop {
        let page = api.list(&filter, request).await?;
        ids.extend(
            page.notifications
                .iter()
                .filter(|n| n.is_unread())
                .map(|n| n.id.clone()),
        );
        if !page.pagination.has_next() {
            break;
        }
        request = request.next();
    }

    if ids.is_empty() {
        output::print_warning("No unread notifications");
        return Ok(());
    }
    if !super::confirm(&format!("Mark {} read?", plural(ids.len())), args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    api.bulk(BulkOperation::MarkRead, &ids).await?;
    output::print_success(&format!("Marked {} read", plural(ids.len())));
    Ok(())
}

/// One id goes to the per-id endpoint, several to the bulk endpoint.
async fn apply(
    api: &dyn NotificationApi,
    operation: BulkOperation,
    ids: &[NotificationId],
) -> Result<(), AppError> {
    match ids {
        [id] => match operation {
            BulkOperation::MarkRead => api.mark_read(id).await,
            BulkOperation::MarkUnread => api.mark_unread(id).await,
            BulkOperation::Archive => api.archive(id).await,
            BulkOperation::Delete => api.delete(id).await,
        },
        _ => api.bulk(operation, ids).await,
    }
}

fn plural(count: usize) -> String {
    if count == 1 {
        "1 notification".to_string()
    } else {
        format!("{count} notifications")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rejects_unknown_values() {
        let args = ListArgs {
            status: Some("pending".into()),
            kind: None,
            page: 1,
            limit: None,
            all: false,
        };
        assert!(args.filter().is_err());

        let args = ListArgs {
            status: None,
            kind: Some("carbon_report".into()),
            page: 1,
            limit: None,
            all: false,
        };
        assert!(args.filter().is_err());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "1 notification");
        assert_eq!(plural(3), "3 notifications");
    }
}
