use ezo_client::{EzoClient, LinkedInventory, NewWorkOrder, WorkLog};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::WorkOrderCommands;
use crate::commands::{emit_listing, read_payload};
use crate::output::output;

/// Handle `ezo work-orders`.
pub async fn handle(
    action: &WorkOrderCommands,
    client: &EzoClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        WorkOrderCommands::List { filter } => {
            emit_listing(client.get_work_orders(*filter).await, flags)
        }
        WorkOrderCommands::Show { id } => {
            output(&client.get_work_order_details(*id).await?, flags.format)
        }
        WorkOrderCommands::Types => emit_listing(client.get_work_order_types().await, flags),
        WorkOrderCommands::Checklists => emit_listing(client.get_checklists().await, flags),
        WorkOrderCommands::Create { file } => {
            let work_order: NewWorkOrder = read_payload(file)?;
            output(&client.create_work_order(&work_order).await?, flags.format)
        }
        WorkOrderCommands::Start { id } => {
            output(&client.start_work_order(*id).await?, flags.format)
        }
        WorkOrderCommands::End { id } => output(&client.end_work_order(*id).await?, flags.format),
        WorkOrderCommands::Log {
            id,
            hours,
            user,
            description,
        } => {
            let log = WorkLog {
                description: description.clone(),
                ..WorkLog::new(*hours, *user)
            };
            output(&client.add_work_log(*id, &log).await?, flags.format)
        }
        WorkOrderCommands::Link { id, file } => {
            let linked: LinkedInventory = read_payload(file)?;
            output(&client.add_linked_inventory(*id, &linked).await?, flags.format)
        }
    }
}
